//! Error types shared between the registry, engine, and block crates.

use crate::status::NodeStatus;
use thiserror::Error;

/// Failure raised by a block invocation.
///
/// The variant preserves the origin of the failure so the executor can map
/// it to the right step status instead of collapsing everything into one
/// "step failed" bucket.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockError {
    /// The block rejected an argument value (value-domain error).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The resolved arguments did not match the block's parameter schema.
    #[error("invalid type: {0}")]
    InvalidType(String),
    /// The block asked for the whole job to stop.
    #[error("job aborted: {0}")]
    Abort(String),
    /// Anything else the block raised.
    #[error("{0}")]
    Failed(String),
}

impl BlockError {
    /// Shorthand for [`BlockError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BlockError::InvalidArgument(message.into())
    }

    /// Shorthand for [`BlockError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        BlockError::Failed(message.into())
    }

    /// The step status this failure settles to.
    pub fn status(&self) -> NodeStatus {
        match self {
            BlockError::InvalidArgument(_) => NodeStatus::InvalidArgument,
            BlockError::InvalidType(_) => NodeStatus::InvalidType,
            BlockError::Abort(_) => NodeStatus::KilledManually,
            BlockError::Failed(_) => NodeStatus::UnhandledException,
        }
    }
}

/// Workflow-fatal errors surfaced by `Job::run` before any step executes.
///
/// Everything else that can go wrong during a run is step-local and is
/// recorded on the step itself rather than raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    /// Two steps resolved to the same id.
    #[error("duplicate step id '{id}' (positions {first} and {second})")]
    DuplicateStepIds {
        /// The offending id.
        id: String,
        /// 1-based position of the first occurrence.
        first: usize,
        /// 1-based position of the second occurrence.
        second: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_error_maps_to_status() {
        assert_eq!(BlockError::invalid_argument("x").status(), NodeStatus::InvalidArgument);
        assert_eq!(BlockError::InvalidType("x".into()).status(), NodeStatus::InvalidType);
        assert_eq!(BlockError::Abort("stop".into()).status(), NodeStatus::KilledManually);
        assert_eq!(BlockError::failed("boom").status(), NodeStatus::UnhandledException);
    }

    #[test]
    fn job_error_display_names_both_positions() {
        let error = JobError::DuplicateStepIds {
            id: "x".into(),
            first: 1,
            second: 3,
        };
        assert_eq!(error.to_string(), "duplicate step id 'x' (positions 1 and 3)");
    }
}
