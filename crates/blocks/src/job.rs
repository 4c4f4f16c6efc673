//! `JOB` category: control over the run itself.

use blockflow_registry::{BlockDescriptor, BlockRegistry, RegistryError};
use blockflow_types::BlockError;

pub fn register(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    registry.register_fn(
        BlockDescriptor::builder("abort")
            .category("job")
            .optional_param("message")
            .build()?,
        |call| {
            let message = match call.arg("message").and_then(|v| v.as_str()) {
                Some(message) => message.to_string(),
                None => "aborted by workflow".to_string(),
            };
            Err(BlockError::Abort(message))
        },
    )?;
    Ok(())
}
