//! Blockflow execution engine.
//!
//! Takes a declarative workflow, resolves its context tags against the run's
//! layered namespace, gates each step through permissions and usage quotas,
//! and executes the steps strictly in order through a [`BlockRegistry`].

pub mod executor;
pub mod guard;
pub mod job;
pub mod namespace;
pub mod tags;

pub use blockflow_registry::BlockRegistry;
pub use guard::{Admission, UsageGuard, pattern_match};
pub use job::{Job, JobHook, SkipPolicy, Step, StepHook};
pub use namespace::{is_truthy, resolve_path};
pub use tags::{MAX_TAG_DEPTH, render_embedded, resolve_condition, resolve_str, resolve_value};
