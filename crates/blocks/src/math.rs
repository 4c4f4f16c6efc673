//! `MATH` category: binary arithmetic over numbers.
//!
//! Argument types are enforced by a descriptor validator, so a non-numeric
//! input settles the step as `INVALID_TYPE` before the handler runs.

use serde_json::{Value, json};

use blockflow_registry::{BlockDescriptor, BlockDescriptorBuilder, BlockRegistry, RegistryError};
use blockflow_types::BlockError;

fn numeric_pair(builder: BlockDescriptorBuilder) -> Result<BlockDescriptor, RegistryError> {
    builder
        .category("math")
        .required_param("value1")
        .required_param("value2")
        .validator(|args: &serde_json::Map<String, Value>| {
            for name in ["value1", "value2"] {
                if args.get(name).is_none_or(|v| v.as_f64().is_none()) {
                    return Err(format!("parameter '{name}' must be a number"));
                }
            }
            Ok(())
        })
        .build()
}

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    registry.register_fn(numeric_pair(BlockDescriptor::builder("sum"))?, |call| {
        Ok(json!(call.require_f64("value1")? + call.require_f64("value2")?))
    })?;
    registry.register_fn(numeric_pair(BlockDescriptor::builder("sub"))?, |call| {
        Ok(json!(call.require_f64("value1")? - call.require_f64("value2")?))
    })?;
    registry.register_fn(numeric_pair(BlockDescriptor::builder("mul"))?, |call| {
        Ok(json!(call.require_f64("value1")? * call.require_f64("value2")?))
    })?;
    registry.register_fn(numeric_pair(BlockDescriptor::builder("div"))?, |call| {
        let divisor = call.require_f64("value2")?;
        if divisor == 0.0 {
            return Err(BlockError::invalid_argument("division by zero"));
        }
        Ok(json!(call.require_f64("value1")? / divisor))
    })?;
    registry.register_fn(numeric_pair(BlockDescriptor::builder("mod"))?, |call| {
        let divisor = call.require_f64("value2")?;
        if divisor == 0.0 {
            return Err(BlockError::invalid_argument("modulo by zero"));
        }
        Ok(json!(call.require_f64("value1")? % divisor))
    })?;
    Ok(())
}
