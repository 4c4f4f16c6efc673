//! `VARIABLE` category: reads and writes on the job's mutable variable
//! store.
//!
//! These are the only standard blocks that touch the store directly; the
//! store itself is engine-supplied and never caller-settable.

use serde_json::{Value, json};

use blockflow_registry::{BlockDescriptor, BlockRegistry, RegistryError};

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    registry.register_fn(
        BlockDescriptor::builder("set")
            .category("variable")
            .global_param("variables")
            .required_param("name")
            .required_param("value")
            .build()?,
        |call| {
            let name = call.require_str("name")?.to_string();
            let value = call.arg_or_null("value");
            call.variables.insert(name, value);
            Ok(Value::Null)
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("get")
            .category("variable")
            .global_param("variables")
            .required_param("name")
            .optional_param("default")
            .build()?,
        |call| {
            let name = call.require_str("name")?;
            match call.variables.get(name) {
                Some(value) => Ok(value.clone()),
                None => Ok(call.arg_or_null("default")),
            }
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("delete")
            .category("variable")
            .global_param("variables")
            .required_param("name")
            .build()?,
        |call| {
            let name = call.require_str("name")?.to_string();
            call.variables.shift_remove(&name);
            Ok(Value::Null)
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("is_exists")
            .category("variable")
            .global_param("variables")
            .required_param("name")
            .build()?,
        |call| {
            let name = call.require_str("name")?;
            Ok(json!(call.variables.contains_key(name)))
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("count")
            .category("variable")
            .global_param("variables")
            .build()?,
        |call| Ok(json!(call.variables.len())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("list_names")
            .category("variable")
            .global_param("variables")
            .build()?,
        |call| Ok(json!(call.variables.keys().collect::<Vec<_>>())),
    )?;
    Ok(())
}
