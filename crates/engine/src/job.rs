//! The job controller: owns the steps, the layered context, and the run
//! loop.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use blockflow_registry::{BlockCall, BlockRegistry};
use blockflow_types::{
    JobDefinition, JobError, NodeStatus, StepDefinition, normalize_action, split_action,
};

use crate::executor::validate_arguments;
use crate::guard::{Admission, UsageGuard};
use crate::tags::{resolve_condition, resolve_value};

/// Called after every step settles, with the job and the settled step.
pub type StepHook = Arc<dyn Fn(&Job, &Step) + Send + Sync>;
/// Called once when the run finishes, whether it succeeded or not.
pub type JobHook = Arc<dyn Fn(&Job) + Send + Sync>;

/// What happens to the steps after a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Settle every later non-forced step as `SKIPPED` without invoking it.
    #[default]
    SkipRemaining,
    /// Keep executing later steps; the job still finishes unsuccessful.
    Continue,
}

/// One live step inside a job run.
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique id within the job; defaults to the 1-based position.
    pub id: String,
    /// Normalized action, e.g. `"MATH.SUM"`.
    pub action: String,
    /// Declared arguments, unresolved (tags intact).
    pub parameters: serde_json::Map<String, Value>,
    /// Optional `if` condition, unresolved.
    pub if_condition: Option<Value>,
    /// Forced steps still run after an earlier failure.
    pub forced: bool,
    /// 1-based position in the workflow.
    pub position: usize,
    /// Current status; starts as `NONE` and settles exactly once per run.
    pub status: NodeStatus,
    /// Value returned by the block, `Null` until settled.
    pub result: Value,
    /// Human-readable failure message when the status is a failure.
    pub error: Option<String>,
}

impl Step {
    fn from_definition(definition: StepDefinition, position: usize) -> Self {
        Step {
            id: definition.id.unwrap_or_else(|| position.to_string()),
            action: normalize_action(&definition.action),
            parameters: definition.parameters,
            if_condition: definition.if_condition,
            forced: definition.forced,
            position,
            status: NodeStatus::None,
            result: Value::Null,
            error: None,
        }
    }

    /// The `steps.<id>` subtree exposed to tag resolution.
    pub fn namespace_entry(&self) -> Value {
        let (category, name) = split_action(&self.action);
        json!({
            "result": self.result,
            "status": { "name": self.status.name(), "value": self.status.value() },
            "position": self.position,
            "action": self.action,
            "block": { "category": category, "name": name },
            "parameters": self.parameters,
            "id": self.id,
        })
    }
}

/// An ordered workflow bound to a block registry, ready to run.
#[derive(Clone)]
pub struct Job {
    /// Caller-chosen identifier, exposed as `job.id`.
    pub id: Option<String>,
    /// Caller-chosen display name, exposed as `job.name`.
    pub name: Option<String>,
    /// Permission tags this job holds.
    pub tags: Vec<String>,
    /// Mutable variable store, exposed as `job.variables.*`.
    pub variables: IndexMap<String, Value>,
    /// Read-only locals, exposed as `job.parameters.*`.
    pub locals: IndexMap<String, Value>,
    /// Operator-seeded values handed to block invocations only. Never
    /// exposed through the tag namespace.
    pub globals: IndexMap<String, Value>,
    /// Usage-ceiling overrides keyed by (wildcard) display name.
    pub block_limits: IndexMap<String, Option<u32>>,
    /// Failure propagation behavior.
    pub skip_policy: SkipPolicy,
    registry: Arc<BlockRegistry>,
    steps: Vec<Step>,
    success: Option<bool>,
    on_step: Option<StepHook>,
    on_finish: Option<JobHook>,
}

impl Job {
    /// Creates an empty job bound to `registry`.
    pub fn new(registry: Arc<BlockRegistry>) -> Self {
        Job {
            id: None,
            name: None,
            tags: Vec::new(),
            variables: IndexMap::new(),
            locals: IndexMap::new(),
            globals: IndexMap::new(),
            block_limits: IndexMap::new(),
            skip_policy: SkipPolicy::default(),
            registry,
            steps: Vec::new(),
            success: None,
            on_step: None,
            on_finish: None,
        }
    }

    /// Builds a job from a declarative document.
    pub fn from_definition(definition: JobDefinition, registry: Arc<BlockRegistry>) -> Self {
        let mut job = Job::new(registry);
        job.id = definition.id;
        job.name = definition.name;
        job.tags = definition.tags;
        job.variables = definition.variables;
        job.locals = definition.parameters;
        job.block_limits = definition.block_limits;
        for step in definition.steps {
            job.push_step(step);
        }
        job
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Grants a permission tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Seeds one variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Sets one read-only local.
    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(name.into(), value.into());
        self
    }

    /// Seeds one operator global. Globals are merged into the arguments of
    /// blocks that declare a matching `global_param` and are otherwise
    /// reachable only through the call context, never through tags.
    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    /// Overrides a block's usage ceiling; `None` lifts it.
    pub fn with_block_limit(mut self, pattern: impl Into<String>, limit: Option<u32>) -> Self {
        self.block_limits.insert(pattern.into(), limit);
        self
    }

    /// Sets the failure propagation behavior.
    pub fn with_skip_policy(mut self, policy: SkipPolicy) -> Self {
        self.skip_policy = policy;
        self
    }

    /// Registers the per-step hook.
    pub fn on_step(mut self, hook: impl Fn(&Job, &Step) + Send + Sync + 'static) -> Self {
        self.on_step = Some(Arc::new(hook));
        self
    }

    /// Registers the end-of-run hook.
    pub fn on_finish(mut self, hook: impl Fn(&Job) + Send + Sync + 'static) -> Self {
        self.on_finish = Some(Arc::new(hook));
        self
    }

    /// Appends a step; its id defaults to its 1-based position.
    pub fn push_step(&mut self, definition: StepDefinition) {
        let position = self.steps.len() + 1;
        self.steps.push(Step::from_definition(definition, position));
    }

    /// Chainable [`Job::push_step`].
    pub fn with_step(mut self, definition: StepDefinition) -> Self {
        self.push_step(definition);
        self
    }

    /// The live steps in workflow order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Looks a step up by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// The first step whose status counts as a failure, if any.
    pub fn failed_step(&self) -> Option<&Step> {
        self.steps.iter().find(|step| step.status.is_failure())
    }

    /// `None` until a step has settled, then the running verdict.
    pub fn success(&self) -> Option<bool> {
        self.success
    }

    /// Assembles the full context namespace for tag resolution.
    pub fn namespace(&self) -> Value {
        let mut steps = serde_json::Map::with_capacity(self.steps.len());
        for step in &self.steps {
            steps.insert(step.id.clone(), step.namespace_entry());
        }
        json!({
            "job": {
                "name": self.name,
                "success": self.success,
                "parameters": self.locals,
                "id": self.id,
                "variables": self.variables,
            },
            "steps": steps,
        })
    }

    /// Per-step outcome report in workflow order.
    pub fn report(&self) -> Value {
        Value::Array(self.steps.iter().map(Step::namespace_entry).collect())
    }

    fn find_duplicate(&self) -> Option<JobError> {
        let mut seen: IndexMap<&str, usize> = IndexMap::new();
        for step in &self.steps {
            if let Some(&first) = seen.get(step.id.as_str()) {
                return Some(JobError::DuplicateStepIds {
                    id: step.id.clone(),
                    first,
                    second: step.position,
                });
            }
            seen.insert(&step.id, step.position);
        }
        None
    }

    fn settle(&mut self, index: usize, status: NodeStatus, result: Value, error: Option<String>) {
        let step = &mut self.steps[index];
        step.status = status;
        step.result = result;
        step.error = error;
        debug!(step = %step.id, status = status.name(), "step settled");
    }

    fn fire_step_hook(&self, index: usize) {
        if let Some(hook) = &self.on_step {
            hook(self, &self.steps[index]);
        }
    }

    /// Runs every step in order and returns whether the job succeeded.
    ///
    /// Step-local failures are recorded on the steps themselves; the only
    /// `Err` this returns is the workflow-fatal duplicate-id case, raised
    /// before any step executes.
    pub async fn run(&mut self) -> Result<bool, JobError> {
        info!(job = self.name.as_deref().unwrap_or("<unnamed>"), steps = self.steps.len(), "job started");
        self.success = None;
        for step in &mut self.steps {
            step.status = NodeStatus::None;
            step.result = Value::Null;
            step.error = None;
        }
        if let Some(error) = self.find_duplicate() {
            warn!(%error, "workflow rejected");
            for step in &mut self.steps {
                step.status = NodeStatus::DuplicateStepIds;
            }
            self.success = Some(false);
            if let Some(hook) = &self.on_finish {
                hook(self);
            }
            return Err(error);
        }

        let mut guard = UsageGuard::new(&self.block_limits);
        let mut failed = false;
        let mut killed = false;
        for index in 0..self.steps.len() {
            let forced = self.steps[index].forced;
            if failed && !forced && self.skip_policy == SkipPolicy::SkipRemaining {
                self.settle(index, NodeStatus::Skipped, Value::Null, None);
                self.fire_step_hook(index);
                continue;
            }

            let action = self.steps[index].action.clone();
            let Some(block) = self.registry.get(&action) else {
                warn!(step = %self.steps[index].id, %action, "block not found");
                failed = true;
                self.settle(
                    index,
                    NodeStatus::BlockNotFound,
                    Value::Null,
                    Some(format!("block '{action}' is not registered")),
                );
                self.success = Some(false);
                self.fire_step_hook(index);
                continue;
            };

            match guard.admit(&block.descriptor, &self.tags) {
                Admission::Forbidden => {
                    warn!(step = %self.steps[index].id, %action, "forbidden block");
                    failed = true;
                    self.settle(
                        index,
                        NodeStatus::ForbiddenBlock,
                        Value::Null,
                        Some(format!("job lacks the tags required by '{action}'")),
                    );
                    self.success = Some(false);
                    self.fire_step_hook(index);
                    continue;
                }
                Admission::QuotaExhausted => {
                    debug!(step = %self.steps[index].id, %action, "usage ceiling reached");
                    self.settle(index, NodeStatus::Skipped, Value::Null, None);
                    self.success = Some(!failed);
                    self.fire_step_hook(index);
                    continue;
                }
                Admission::Granted => {}
            }

            let root = self.namespace();
            if let Some(condition) = self.steps[index].if_condition.clone()
                && !resolve_condition(&condition, &root)
            {
                self.settle(index, NodeStatus::IfConditionFailed, Value::Null, None);
                self.success = Some(!failed);
                self.fire_step_hook(index);
                continue;
            }

            let declared = Value::Object(self.steps[index].parameters.clone());
            let mut args = match resolve_value(&declared, &root) {
                Value::Object(args) => args,
                _ => serde_json::Map::new(),
            };
            if let Err(error) = validate_arguments(&block.descriptor, &args) {
                warn!(step = %self.steps[index].id, %error, "argument validation failed");
                failed = true;
                self.settle(index, error.status(), Value::Null, Some(error.to_string()));
                self.success = Some(false);
                self.fire_step_hook(index);
                continue;
            }

            for name in &block.descriptor.global_params {
                if let Some(value) = self.globals.get(name) {
                    args.insert(name.clone(), value.clone());
                }
            }

            let step_id = self.steps[index].id.clone();
            let position = self.steps[index].position;
            let mut call = BlockCall {
                args,
                globals: &self.globals,
                locals: &self.locals,
                variables: &mut self.variables,
                step_id: &step_id,
                position,
            };
            match block.handler.call(&mut call).await {
                Ok(result) => {
                    self.settle(index, NodeStatus::Done, result, None);
                }
                Err(error) => {
                    let status = error.status();
                    warn!(step = %step_id, status = status.name(), %error, "step failed");
                    failed = true;
                    if status == NodeStatus::KilledManually {
                        killed = true;
                    }
                    self.settle(index, status, Value::Null, Some(error.to_string()));
                }
            }
            self.success = Some(!failed);
            self.fire_step_hook(index);
            if killed {
                break;
            }
        }

        self.success = Some(!failed);
        info!(success = !failed, "job finished");
        if let Some(hook) = &self.on_finish {
            hook(self);
        }
        Ok(!failed)
    }
}
