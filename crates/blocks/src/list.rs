//! `LIST` category: array construction and access.

use serde_json::{Value, json};

use blockflow_registry::{BlockDescriptor, BlockRegistry, RegistryError};
use blockflow_types::BlockError;

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    // variadic: argument values become the list, in declaration order
    registry.register_fn(
        BlockDescriptor::builder("create").category("list").variadic().build()?,
        |call| Ok(Value::Array(call.args.values().cloned().collect())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("get")
            .category("list")
            .required_param("list")
            .required_param("index")
            .build()?,
        |call| {
            let index = call.require_f64("index")?;
            if index < 0.0 || index.fract() != 0.0 {
                return Err(BlockError::invalid_argument("index must be a non-negative integer"));
            }
            let list = call.require_array("list")?;
            Ok(list.get(index as usize).cloned().unwrap_or(Value::Null))
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("count")
            .category("list")
            .required_param("list")
            .build()?,
        |call| Ok(json!(call.require_array("list")?.len())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("append")
            .category("list")
            .required_param("list")
            .required_param("value")
            .build()?,
        |call| {
            let mut list = call.require_array("list")?.clone();
            list.push(call.arg_or_null("value"));
            Ok(Value::Array(list))
        },
    )?;
    Ok(())
}
