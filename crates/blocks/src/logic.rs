//! `LOGIC` category: truthiness and comparison helpers.

use serde_json::json;

use blockflow_engine::is_truthy;
use blockflow_registry::{BlockDescriptor, BlockRegistry, RegistryError};

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    registry.register_fn(
        BlockDescriptor::builder("if_then")
            .category("logic")
            .required_param("condition")
            .required_param("then")
            .optional_param("else")
            .build()?,
        |call| {
            if is_truthy(call.require("condition")?) {
                Ok(call.arg_or_null("then"))
            } else {
                Ok(call.arg_or_null("else"))
            }
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("equals")
            .category("logic")
            .required_param("value1")
            .required_param("value2")
            .build()?,
        |call| Ok(json!(call.require("value1")? == call.require("value2")?)),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("not")
            .category("logic")
            .required_param("value")
            .build()?,
        |call| Ok(json!(!is_truthy(call.require("value")?))),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("all")
            .category("logic")
            .required_param("values")
            .build()?,
        |call| Ok(json!(call.require_array("values")?.iter().all(is_truthy))),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("any")
            .category("logic")
            .required_param("values")
            .build()?,
        |call| Ok(json!(call.require_array("values")?.iter().any(is_truthy))),
    )?;
    Ok(())
}
