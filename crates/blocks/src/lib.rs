//! Standard block library.
//!
//! A curated set of safe, general-purpose blocks an operator can expose
//! out of the box. None of them require permission tags and none carry
//! default usage ceilings; operators layer their own restricted blocks on
//! top.

pub mod dictionary;
pub mod job;
pub mod list;
pub mod logic;
pub mod math;
pub mod text;
pub mod variable;

use blockflow_registry::{BlockRegistry, RegistryError};

/// Builds a registry holding every standard block.
pub fn standard_registry() -> Result<BlockRegistry, RegistryError> {
    let mut registry = BlockRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

/// Adds the standard blocks to an existing registry.
pub fn register_all(registry: &mut BlockRegistry) -> Result<(), RegistryError> {
    variable::register(registry)?;
    math::register(registry)?;
    text::register(registry)?;
    logic::register(registry)?;
    list::register(registry)?;
    dictionary::register(registry)?;
    job::register(registry)?;
    Ok(())
}
