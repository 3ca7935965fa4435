//! gridcalc Plugin System
//!
//! Calculator tools expose their operations as pure function plugins.
//! A front end looks functions up by name in a `PluginRegistry` and calls
//! them with an `EvalContext` that carries display and input settings plus
//! the tool's stored values.

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;
pub use context::EvalContext;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{FunctionPlugin, FunctionMeta, ArgMeta, PluginRegistry, EvalContext};
    pub use gridcalc_core::prelude::*;
}
