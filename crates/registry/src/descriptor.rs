//! Block descriptors: the operator-facing metadata for one exposed function.
//!
//! A descriptor carries everything the executor needs to gate and validate a
//! call before the handler runs: the parameter schema, the permission tags,
//! and the default usage ceiling.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use blockflow_types::display_name;

/// Optional post-resolution argument check attached to a descriptor.
///
/// Runs after tags are resolved and arity has been checked; a rejection
/// settles the step as `INVALID_TYPE`.
pub trait ParameterValidator: Send + Sync {
    /// Returns a human-readable rejection message on failure.
    fn validate(&self, args: &serde_json::Map<String, Value>) -> Result<(), String>;
}

impl<F> ParameterValidator for F
where
    F: Fn(&serde_json::Map<String, Value>) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, args: &serde_json::Map<String, Value>) -> Result<(), String> {
        self(args)
    }
}

/// Metadata for one registered block.
#[derive(Clone)]
pub struct BlockDescriptor {
    /// Upper-cased block name without the category prefix.
    pub name: String,
    /// Optional upper-cased category the block is grouped under.
    pub category: Option<String>,
    /// Parameter names the engine fills from the run itself rather than the
    /// step's declared arguments. Callers can never set these.
    pub global_params: Vec<String>,
    /// Parameters every call must provide.
    pub required_params: Vec<String>,
    /// Parameters a call may provide.
    pub optional_params: Vec<String>,
    /// When set, unknown parameter names are passed through instead of
    /// rejected.
    pub variadic: bool,
    /// Default usage ceiling per job run. `None` means unlimited.
    pub max_uses: Option<u32>,
    /// Tags the calling job must hold to invoke this block.
    pub tags: Vec<String>,
    /// Optional argument validator.
    pub validator: Option<Arc<dyn ParameterValidator>>,
}

impl BlockDescriptor {
    /// Starts building a descriptor for a block named `name`.
    pub fn builder(name: impl Into<String>) -> BlockDescriptorBuilder {
        BlockDescriptorBuilder::new(name)
    }

    /// The full lookup key, e.g. `"MATH.SUM"` or `"ECHO"`.
    pub fn display_name(&self) -> String {
        display_name(self.category.as_deref(), &self.name)
    }

    /// Whether `param` is an engine-supplied parameter.
    pub fn is_global_param(&self, param: &str) -> bool {
        self.global_params.iter().any(|p| p == param)
    }

    /// Whether a caller may pass `param` explicitly.
    pub fn accepts_param(&self, param: &str) -> bool {
        if self.is_global_param(param) {
            return false;
        }
        self.variadic
            || self.required_params.iter().any(|p| p == param)
            || self.optional_params.iter().any(|p| p == param)
    }
}

impl fmt::Debug for BlockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("global_params", &self.global_params)
            .field("required_params", &self.required_params)
            .field("optional_params", &self.optional_params)
            .field("variadic", &self.variadic)
            .field("max_uses", &self.max_uses)
            .field("tags", &self.tags)
            .field("validator", &self.validator.as_ref().map(|_| "<validator>"))
            .finish()
    }
}

/// Errors raised while building or registering blocks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Block or category names may not contain the `.` separator.
    #[error("invalid block name '{0}': names may not contain '.'")]
    InvalidName(String),
    /// A block with the same display name is already registered.
    #[error("block '{0}' is already registered")]
    DuplicateBlock(String),
}

/// Fluent builder for [`BlockDescriptor`].
#[derive(Clone)]
pub struct BlockDescriptorBuilder {
    name: String,
    category: Option<String>,
    global_params: Vec<String>,
    required_params: Vec<String>,
    optional_params: Vec<String>,
    variadic: bool,
    max_uses: Option<u32>,
    tags: Vec<String>,
    validator: Option<Arc<dyn ParameterValidator>>,
}

impl BlockDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        BlockDescriptorBuilder {
            name: name.into(),
            category: None,
            global_params: Vec::new(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            variadic: false,
            max_uses: None,
            tags: Vec::new(),
            validator: None,
        }
    }

    /// Places the block under a category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Declares an engine-supplied parameter.
    pub fn global_param(mut self, name: impl Into<String>) -> Self {
        self.global_params.push(name.into());
        self
    }

    /// Declares a required caller parameter.
    pub fn required_param(mut self, name: impl Into<String>) -> Self {
        self.required_params.push(name.into());
        self
    }

    /// Declares an optional caller parameter.
    pub fn optional_param(mut self, name: impl Into<String>) -> Self {
        self.optional_params.push(name.into());
        self
    }

    /// Accept parameter names beyond the declared ones.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Caps how many times a job run may invoke this block.
    pub fn max_uses(mut self, limit: u32) -> Self {
        self.max_uses = Some(limit);
        self
    }

    /// Requires the calling job to hold `tag`.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Attaches a post-resolution argument validator.
    pub fn validator(mut self, validator: impl ParameterValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Finalizes the descriptor, upper-casing the name and category.
    pub fn build(self) -> Result<BlockDescriptor, RegistryError> {
        let name = self.name.trim().to_ascii_uppercase();
        if name.is_empty() || name.contains('.') {
            return Err(RegistryError::InvalidName(self.name));
        }
        let category = match self.category {
            Some(category) => {
                let category = category.trim().to_ascii_uppercase();
                if category.is_empty() || category.contains('.') {
                    return Err(RegistryError::InvalidName(category));
                }
                Some(category)
            }
            None => None,
        };
        Ok(BlockDescriptor {
            name,
            category,
            global_params: self.global_params,
            required_params: self.required_params,
            optional_params: self.optional_params,
            variadic: self.variadic,
            max_uses: self.max_uses,
            tags: self.tags,
            validator: self.validator,
        })
    }
}
