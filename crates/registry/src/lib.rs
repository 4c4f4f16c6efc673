//! Block registry: the operator's catalog of functions exposed to jobs.
//!
//! Operators register blocks here ahead of time; jobs can only ever name
//! blocks this catalog holds. Lookup is case-insensitive over the display
//! name (`CATEGORY.NAME` or bare `NAME`).

pub mod descriptor;
pub mod handler;

use std::sync::Arc;

use indexmap::IndexMap;

use blockflow_types::normalize_action;

pub use descriptor::{BlockDescriptor, BlockDescriptorBuilder, ParameterValidator, RegistryError};
pub use handler::{BlockCall, BlockHandler, FnBlock};

/// One registered block: its metadata plus its executable handler.
#[derive(Clone)]
pub struct Block {
    /// Gate and schema metadata.
    pub descriptor: BlockDescriptor,
    /// The code that runs when a step calls this block.
    pub handler: Arc<dyn BlockHandler>,
}

/// The catalog of registered blocks, keyed by display name.
///
/// Registration order is preserved so listings are deterministic.
#[derive(Clone, Default)]
pub struct BlockRegistry {
    blocks: IndexMap<String, Arc<Block>>,
}

impl BlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block; the display name must be unused.
    pub fn register(
        &mut self,
        descriptor: BlockDescriptor,
        handler: Arc<dyn BlockHandler>,
    ) -> Result<(), RegistryError> {
        let key = descriptor.display_name();
        if self.blocks.contains_key(&key) {
            return Err(RegistryError::DuplicateBlock(key));
        }
        tracing::debug!(block = %key, "registered block");
        self.blocks.insert(key, Arc::new(Block { descriptor, handler }));
        Ok(())
    }

    /// Registers a synchronous function block.
    pub fn register_fn<F>(&mut self, descriptor: BlockDescriptor, f: F) -> Result<(), RegistryError>
    where
        F: for<'a, 'b> Fn(&'a mut BlockCall<'b>) -> Result<serde_json::Value, blockflow_types::BlockError>
            + Send
            + Sync
            + 'static,
    {
        self.register(descriptor, Arc::new(FnBlock(f)))
    }

    /// Case-insensitive lookup by action string.
    pub fn get(&self, action: &str) -> Option<Arc<Block>> {
        self.blocks.get(&normalize_action(action)).cloned()
    }

    /// All registered blocks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_descriptor() -> BlockDescriptor {
        BlockDescriptor::builder("echo")
            .optional_param("value")
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = BlockRegistry::new();
        registry
            .register_fn(echo_descriptor(), |call| Ok(call.arg_or_null("value")))
            .unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get(" Echo ").is_some());
        assert!(registry.get("ECHO").is_some());
        assert!(registry.get("MATH.ECHO").is_none());
    }

    #[test]
    fn duplicate_display_names_are_rejected() {
        let mut registry = BlockRegistry::new();
        registry
            .register_fn(echo_descriptor(), |_| Ok(json!(null)))
            .unwrap();
        let error = registry
            .register_fn(echo_descriptor(), |_| Ok(json!(null)))
            .unwrap_err();
        assert_eq!(error, RegistryError::DuplicateBlock("ECHO".into()));
    }

    #[test]
    fn iteration_preserves_registration_order() {
        let mut registry = BlockRegistry::new();
        for name in ["b", "a", "c"] {
            let descriptor = BlockDescriptor::builder(name).build().unwrap();
            registry.register_fn(descriptor, |_| Ok(json!(null))).unwrap();
        }
        let names: Vec<String> = registry.iter().map(|b| b.descriptor.display_name()).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }
}
