//! # Blockflow Types
//!
//! Shared type definitions for the blockflow workspace: the step status
//! contract, job/step definition documents, error types, and action-name
//! helpers. Everything here is plain data so the registry, engine, and
//! block crates can depend on it without pulling in runtime machinery.

pub mod definition;
pub mod error;
pub mod names;
pub mod status;

pub use definition::{JobDefinition, StepDefinition};
pub use error::{BlockError, JobError};
pub use names::{display_name, normalize_action, split_action};
pub use status::NodeStatus;
