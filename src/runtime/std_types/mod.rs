//! Core dynamic types registered with every runtime.
//!
//! Registration runs once, from `Runtime::new`, and declares everything
//! through the same public type builder that consumers use.

pub mod keyed_map;

use log::debug;

use crate::runtime::api::Runtime;
use crate::runtime::ds::error::CoreError;

/// Registers the cursor family and the core `Map` type.
pub fn register_core_types(rt: &mut Runtime) -> Result<(), CoreError> {
    crate::runtime::query::register(rt)?;
    keyed_map::register(rt)?;
    debug!("core types registered");
    Ok(())
}
