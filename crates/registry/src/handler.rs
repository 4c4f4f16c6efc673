//! Block handlers: the executable side of a registered block.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use blockflow_types::BlockError;

/// Everything a block sees for one invocation.
///
/// Arguments have already been tag-resolved and arity-checked by the
/// executor; the handler only deals in plain values. Operator-seeded
/// globals and the mutable variable store are exposed here and only here,
/// so engine-supplied parameters (the `variables` store the VARIABLE
/// category works on, credentials, handles) stay out of the caller's
/// hands and out of the tag namespace.
pub struct BlockCall<'run> {
    /// Resolved caller arguments, keyed by parameter name. Declared
    /// `global_params` found in the job's globals are merged in by the
    /// executor.
    pub args: serde_json::Map<String, Value>,
    /// Operator-seeded values, invisible to tag resolution.
    pub globals: &'run IndexMap<String, Value>,
    /// Read-only job locals (`job.parameters.*`).
    pub locals: &'run IndexMap<String, Value>,
    /// Mutable variable store shared across steps.
    pub variables: &'run mut IndexMap<String, Value>,
    /// Id of the step being executed.
    pub step_id: &'run str,
    /// 1-based position of the step being executed.
    pub position: usize,
}

impl BlockCall<'_> {
    /// Looks up an argument without consuming it.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Looks up a required argument; missing ones were already rejected by
    /// the executor, so absence here is a handler-side contract breach.
    pub fn require(&self, name: &str) -> Result<&Value, BlockError> {
        self.args
            .get(name)
            .ok_or_else(|| BlockError::invalid_argument(format!("missing parameter '{name}'")))
    }

    /// Requires `name` to resolve to a string.
    pub fn require_str(&self, name: &str) -> Result<&str, BlockError> {
        self.require(name)?.as_str().ok_or_else(|| {
            BlockError::InvalidType(format!("parameter '{name}' must be a string"))
        })
    }

    /// Requires `name` to resolve to a number, coercing integers.
    pub fn require_f64(&self, name: &str) -> Result<f64, BlockError> {
        self.require(name)?.as_f64().ok_or_else(|| {
            BlockError::InvalidType(format!("parameter '{name}' must be a number"))
        })
    }

    /// Requires `name` to resolve to an array.
    pub fn require_array(&self, name: &str) -> Result<&Vec<Value>, BlockError> {
        self.require(name)?.as_array().ok_or_else(|| {
            BlockError::InvalidType(format!("parameter '{name}' must be a list"))
        })
    }

    /// The argument value or `Null` when absent.
    pub fn arg_or_null(&self, name: &str) -> Value {
        self.args.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Looks up an operator-seeded global.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }
}

/// An executable block.
///
/// Handlers are shared across runs behind an `Arc`, so they carry no
/// per-invocation state; everything mutable lives on the [`BlockCall`].
#[async_trait]
pub trait BlockHandler: Send + Sync {
    /// Runs the block and produces the step result.
    async fn call(&self, call: &mut BlockCall<'_>) -> Result<Value, BlockError>;
}

/// Adapter for blocks implemented as plain synchronous functions, which is
/// most of the standard library of blocks.
pub struct FnBlock<F>(pub F);

#[async_trait]
impl<F> BlockHandler for FnBlock<F>
where
    F: for<'a, 'b> Fn(&'a mut BlockCall<'b>) -> Result<Value, BlockError> + Send + Sync,
{
    async fn call(&self, call: &mut BlockCall<'_>) -> Result<Value, BlockError> {
        (self.0)(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fn_block_adapts_a_sync_closure() {
        let block = FnBlock(|call: &mut BlockCall<'_>| {
            let left = call.require_f64("left")?;
            let right = call.require_f64("right")?;
            Ok(json!(left + right))
        });
        let mut args = serde_json::Map::new();
        args.insert("left".into(), json!(2));
        args.insert("right".into(), json!(3.5));
        let globals = IndexMap::new();
        let locals = IndexMap::new();
        let mut variables = IndexMap::new();
        let mut call = BlockCall {
            args,
            globals: &globals,
            locals: &locals,
            variables: &mut variables,
            step_id: "sum",
            position: 1,
        };
        assert_eq!(block.call(&mut call).await.unwrap(), json!(5.5));
    }

    #[tokio::test]
    async fn type_mismatch_is_invalid_type() {
        let block = FnBlock(|call: &mut BlockCall<'_>| Ok(json!(call.require_str("text")?)));
        let mut args = serde_json::Map::new();
        args.insert("text".into(), json!(42));
        let globals = IndexMap::new();
        let locals = IndexMap::new();
        let mut variables = IndexMap::new();
        let mut call = BlockCall {
            args,
            globals: &globals,
            locals: &locals,
            variables: &mut variables,
            step_id: "s",
            position: 1,
        };
        assert!(matches!(
            block.call(&mut call).await,
            Err(BlockError::InvalidType(_))
        ));
    }
}
