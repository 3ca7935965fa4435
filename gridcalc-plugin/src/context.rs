//! Evaluation Context

use gridcalc_core::{CalcError, CellPolicy, Value, DEFAULT_PLACES, MAX_PLACES};
use crate::PluginRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Evaluation context passed to plugins
///
/// One context belongs to one tool session. It owns the values the session
/// has stored by name, so nothing about a session lives in module state.
pub struct EvalContext {
    /// Decimal places used when rendering results
    pub precision: u32,
    /// How non-numeric matrix cells are read
    pub cell_policy: CellPolicy,
    pub variables: HashMap<String, Value>,
    pub registry: Arc<PluginRegistry>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            precision: DEFAULT_PLACES,
            cell_policy: CellPolicy::default(),
            variables: HashMap::new(),
            registry,
        }
    }

    /// Set display precision, clamped to `MAX_PLACES`
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision.min(MAX_PLACES);
        self
    }

    pub fn with_cell_policy(mut self, policy: CellPolicy) -> Self {
        self.cell_policy = policy;
        self
    }

    pub fn get_var(&self, name: &str) -> Value {
        match self.variables.get(name) {
            Some(v) => v.clone(),
            None => Value::Error(CalcError::undefined_var(name)),
        }
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Call a registered function with this context
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        self.registry.call_function(name, args, self)
    }

    /// Render a value with this context's precision
    pub fn render(&self, value: &Value) -> String {
        value.render(self.precision)
    }
}
