//! Step status contract.
//!
//! The numeric values and names are part of the public wire contract: they
//! are mirrored into the context namespace as `status.name` / `status.value`
//! and consumed by workflow authors, so they must never change.

use serde::{Deserialize, Serialize};

/// Terminal and initial statuses a step can carry during a job run.
///
/// Every step starts as [`NodeStatus::None`] and settles exactly once; the
/// executor never revisits a settled status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    /// The step has not executed yet.
    #[default]
    None,
    /// Exited without any errors.
    Done,
    /// Not executed: either an earlier step failed, or the block's usage
    /// quota was already consumed.
    Skipped,
    /// Any unexpected error raised by the block.
    UnhandledException,
    /// The referenced block is not registered.
    BlockNotFound,
    /// The block rejected an argument value.
    InvalidArgument,
    /// Two steps in the workflow share one id. Workflow-fatal.
    DuplicateStepIds,
    /// The job's tag set does not cover the block's required tags.
    ForbiddenBlock,
    /// The block's parameter validator rejected the resolved arguments.
    InvalidType,
    /// The step's `if` condition resolved falsy.
    IfConditionFailed,
    /// A block raised the abort signal; the run stops here.
    KilledManually,
}

impl NodeStatus {
    /// Contract value mirrored into the namespace as `status.value`.
    pub fn value(self) -> i32 {
        match self {
            NodeStatus::None => -1,
            NodeStatus::Done => 0,
            NodeStatus::Skipped => 100,
            NodeStatus::UnhandledException => 101,
            NodeStatus::BlockNotFound => 102,
            NodeStatus::InvalidArgument => 103,
            NodeStatus::DuplicateStepIds => 104,
            NodeStatus::ForbiddenBlock => 105,
            NodeStatus::InvalidType => 107,
            NodeStatus::IfConditionFailed => 110,
            NodeStatus::KilledManually => 111,
        }
    }

    /// Contract name mirrored into the namespace as `status.name`.
    pub fn name(self) -> &'static str {
        match self {
            NodeStatus::None => "NONE",
            NodeStatus::Done => "DONE",
            NodeStatus::Skipped => "SKIPPED",
            NodeStatus::UnhandledException => "UNHANDLED_EXCEPTION",
            NodeStatus::BlockNotFound => "BLOCK_NOT_FOUND",
            NodeStatus::InvalidArgument => "INVALID_ARGUMENT",
            NodeStatus::DuplicateStepIds => "DUPLICATE_STEP_IDS",
            NodeStatus::ForbiddenBlock => "FORBIDDEN_BLOCK",
            NodeStatus::InvalidType => "INVALID_TYPE",
            NodeStatus::IfConditionFailed => "IF_CONDITION_FAILED",
            NodeStatus::KilledManually => "KILLED_MANUALLY",
        }
    }

    /// Whether this status marks the job as failed.
    ///
    /// `SKIPPED` is deliberately not a failure: it is assigned either after
    /// the job already failed (propagation) or when a usage quota was
    /// silently satisfied. `IF_CONDITION_FAILED` is an authored branch, not
    /// an error.
    pub fn is_failure(self) -> bool {
        !matches!(
            self,
            NodeStatus::None | NodeStatus::Done | NodeStatus::Skipped | NodeStatus::IfConditionFailed
        )
    }

    /// Whether the step has settled (any status other than `NONE`).
    pub fn is_settled(self) -> bool {
        self != NodeStatus::None
    }
}

#[cfg(test)]
mod tests {
    use super::NodeStatus;

    #[test]
    fn contract_values_are_stable() {
        let expected = [
            (NodeStatus::None, "NONE", -1),
            (NodeStatus::Done, "DONE", 0),
            (NodeStatus::Skipped, "SKIPPED", 100),
            (NodeStatus::UnhandledException, "UNHANDLED_EXCEPTION", 101),
            (NodeStatus::BlockNotFound, "BLOCK_NOT_FOUND", 102),
            (NodeStatus::InvalidArgument, "INVALID_ARGUMENT", 103),
            (NodeStatus::DuplicateStepIds, "DUPLICATE_STEP_IDS", 104),
            (NodeStatus::ForbiddenBlock, "FORBIDDEN_BLOCK", 105),
            (NodeStatus::InvalidType, "INVALID_TYPE", 107),
            (NodeStatus::IfConditionFailed, "IF_CONDITION_FAILED", 110),
            (NodeStatus::KilledManually, "KILLED_MANUALLY", 111),
        ];
        for (status, name, value) in expected {
            assert_eq!(status.name(), name);
            assert_eq!(status.value(), value);
        }
    }

    #[test]
    fn failure_classification() {
        assert!(!NodeStatus::Done.is_failure());
        assert!(!NodeStatus::None.is_failure());
        assert!(!NodeStatus::Skipped.is_failure());
        assert!(!NodeStatus::IfConditionFailed.is_failure());
        assert!(NodeStatus::UnhandledException.is_failure());
        assert!(NodeStatus::BlockNotFound.is_failure());
        assert!(NodeStatus::ForbiddenBlock.is_failure());
        assert!(NodeStatus::KilledManually.is_failure());
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&NodeStatus::IfConditionFailed).expect("serialize");
        assert_eq!(json, "\"IF_CONDITION_FAILED\"");
    }
}
