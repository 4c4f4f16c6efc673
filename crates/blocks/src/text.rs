//! `TEXT` category: string manipulation.

use serde_json::json;

use blockflow_registry::{BlockDescriptor, BlockRegistry, RegistryError};

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    registry.register_fn(
        BlockDescriptor::builder("join")
            .category("text")
            .required_param("text1")
            .required_param("text2")
            .optional_param("separator")
            .build()?,
        |call| {
            let separator = match call.arg("separator") {
                Some(value) => value.as_str().unwrap_or_default().to_string(),
                None => String::new(),
            };
            Ok(json!(format!(
                "{}{separator}{}",
                call.require_str("text1")?,
                call.require_str("text2")?
            )))
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("upper")
            .category("text")
            .required_param("text")
            .build()?,
        |call| Ok(json!(call.require_str("text")?.to_uppercase())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("lower")
            .category("text")
            .required_param("text")
            .build()?,
        |call| Ok(json!(call.require_str("text")?.to_lowercase())),
    )?;
    registry.register_fn(
        BlockDescriptor::builder("split")
            .category("text")
            .required_param("text")
            .required_param("separator")
            .build()?,
        |call| {
            let text = call.require_str("text")?;
            let separator = call.require_str("separator")?;
            Ok(json!(text.split(separator).collect::<Vec<_>>()))
        },
    )?;
    registry.register_fn(
        BlockDescriptor::builder("contains")
            .category("text")
            .required_param("text")
            .required_param("search")
            .build()?,
        |call| Ok(json!(call.require_str("text")?.contains(call.require_str("search")?))),
    )?;
    Ok(())
}
