//! Declarative job and step definition documents.
//!
//! These are the serde-facing shapes a caller submits (YAML or JSON). The
//! engine turns a [`JobDefinition`] into a live job; the definition itself
//! stays plain data with no behavior attached.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declared step in a workflow document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Block to execute, e.g. `"MATH.SUM"` or `"ECHO"`. Matched
    /// case-insensitively.
    pub action: String,
    /// Optional unique identifier; the 1-based position is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Named arguments passed to the block; values (and keys) may contain
    /// context tags.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub parameters: serde_json::Map<String, Value>,
    /// Optional condition; when it resolves falsy the block is not invoked.
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<Value>,
    /// Forced steps still run after an earlier step has failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forced: bool,
}

impl StepDefinition {
    /// Convenience constructor for programmatic workflows and tests.
    pub fn new(action: impl Into<String>) -> Self {
        StepDefinition {
            action: action.into(),
            ..Default::default()
        }
    }

    /// Sets the step id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds one named parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Sets the `if` condition.
    pub fn with_condition(mut self, condition: impl Into<Value>) -> Self {
        self.if_condition = Some(condition.into());
        self
    }

    /// Marks the step as forced.
    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }
}

/// A whole declarative job document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Caller-chosen identifier; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Caller-chosen display name; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Permission tags granted to this job.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Seed values for the mutable variable store.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, Value>,
    /// Read-only locals exposed to steps as `job.parameters.*`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,
    /// Per-job usage-ceiling overrides keyed by block display name.
    /// `null` lifts the block's limit entirely; names may use `*`/`?`
    /// wildcards.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub block_limits: IndexMap<String, Option<u32>>,
    /// Ordered steps to execute.
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}
