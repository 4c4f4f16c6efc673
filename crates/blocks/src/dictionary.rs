//! `DICTIONARY` category: object construction and access.
//!
//! Values are immutable JSON, so the writing blocks (`SET`, `DELETE`,
//! `MERGE`) return a new dictionary instead of mutating in place.

use serde_json::{Value, json};

use blockflow_registry::{BlockCall, BlockDescriptor, BlockRegistry, RegistryError};
use blockflow_types::BlockError;

fn require_object<'a>(call: &'a BlockCall<'_>, name: &str) -> Result<&'a serde_json::Map<String, Value>, BlockError> {
    call.require(name)?.as_object().ok_or_else(|| {
        BlockError::InvalidType(format!("parameter '{name}' must be a dictionary"))
    })
}

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    // variadic: argument names become keys
    registry.register_fn(
        BlockDescriptor::builder("create").category("dictionary").variadic().build()?,
        |call| Ok(Value::Object(call.args.clone())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("get")
            .category("dictionary")
            .required_param("dictionary")
            .required_param("key")
            .optional_param("default")
            .build()?,
        |call| {
            let key = call.require_str("key")?.to_string();
            match require_object(call, "dictionary")?.get(&key) {
                Some(value) => Ok(value.clone()),
                None => Ok(call.arg_or_null("default")),
            }
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("set")
            .category("dictionary")
            .required_param("dictionary")
            .required_param("key")
            .required_param("value")
            .build()?,
        |call| {
            let key = call.require_str("key")?.to_string();
            let mut dictionary = require_object(call, "dictionary")?.clone();
            dictionary.insert(key, call.arg_or_null("value"));
            Ok(Value::Object(dictionary))
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("delete")
            .category("dictionary")
            .required_param("dictionary")
            .required_param("key")
            .build()?,
        |call| {
            let key = call.require_str("key")?.to_string();
            let mut dictionary = require_object(call, "dictionary")?.clone();
            dictionary.shift_remove(&key);
            Ok(Value::Object(dictionary))
        },
    )?;
    // dict2 wins on key collisions
    registry.register_fn(
        BlockDescriptor::builder("merge")
            .category("dictionary")
            .required_param("dict1")
            .required_param("dict2")
            .build()?,
        |call| {
            let mut merged = require_object(call, "dict1")?.clone();
            for (key, value) in require_object(call, "dict2")? {
                merged.insert(key.clone(), value.clone());
            }
            Ok(Value::Object(merged))
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("count")
            .category("dictionary")
            .required_param("dictionary")
            .build()?,
        |call| Ok(json!(require_object(call, "dictionary")?.len())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("list_keys")
            .category("dictionary")
            .required_param("dictionary")
            .build()?,
        |call| Ok(json!(require_object(call, "dictionary")?.keys().collect::<Vec<_>>())),
    )?;
    Ok(())
}
