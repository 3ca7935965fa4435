//! Runtime values passed between front ends and function plugins
//!
//! Values can be numbers, text, booleans, objects (tagged matrices and
//! decomposition results), lists, null, or errors. Errors are ordinary
//! values so a caller can branch on them instead of unwinding.

use crate::{format_decimal, format_grid, CalcError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Object tag for matrices
pub const MATRIX_TAG: &str = "Matrix";

/// Object tag for the "no inverse exists" outcome
pub const SINGULAR_TAG: &str = "Singular";

/// Runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Object(HashMap<String, Value>),
    List(Vec<Value>),
    Null,
    Error(CalcError),
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&CalcError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Object tag (`"type"` field), if this is a tagged object
    pub fn tag(&self) -> Option<&str> {
        match self {
            Value::Object(obj) => obj.get("type").and_then(|t| t.as_text()),
            _ => None,
        }
    }

    pub fn is_singular(&self) -> bool {
        self.tag() == Some(SINGULAR_TAG)
    }

    /// Numeric rows of a tagged matrix object.
    ///
    /// Returns `None` for anything that is not a `Matrix` object whose data
    /// is a list of lists of numbers.
    pub fn matrix_rows(&self) -> Option<Vec<Vec<f64>>> {
        if self.tag() != Some(MATRIX_TAG) {
            return None;
        }
        let data = self.as_object()?.get("data")?.as_list()?;
        data.iter()
            .map(|row| row.as_list()?.iter().map(Value::as_number).collect())
            .collect()
    }

    // ========== Object Field Access ==========

    /// Get field from object. Returns Error value if not found or not an object.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(map) => map.get(key).cloned().unwrap_or_else(|| {
                Value::Error(CalcError::domain_error(format!("undefined field '{}'", key)))
            }),
            Value::Error(e) => Value::Error(e.clone()),
            _ => Value::Error(CalcError::type_error("Object", self.type_name())),
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::Bool(_) => "Bool",
            Value::Object(_) => "Object",
            Value::List(_) => "List",
            Value::Null => "Null",
            Value::Error(_) => "Error",
        }
    }

    /// The "no inverse" outcome as a tagged object
    pub fn singular() -> Value {
        let mut obj = HashMap::new();
        obj.insert("type".to_string(), Value::Text(SINGULAR_TAG.to_string()));
        Value::Object(obj)
    }

    /// Render for display with a fixed number of decimal places.
    ///
    /// Matrices render as an aligned block, one line per row.
    pub fn render(&self, places: u32) -> String {
        match self {
            Value::Number(n) => format_decimal(*n, places),
            Value::Error(e) => format!("Error: {}", e.message),
            _ if self.is_singular() => "Matrix is singular (no inverse)".to_string(),
            _ => match self.matrix_rows() {
                Some(rows) => format_grid(&rows, places),
                None => self.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Object(obj) => {
                if let Some(rows) = self.matrix_rows() {
                    let rows: Vec<String> = rows.iter().map(|row| {
                        let vals: Vec<String> = row.iter().map(|x| format_decimal(*x, 4)).collect();
                        format!("[{}]", vals.join(", "))
                    }).collect();
                    if rows.len() == 1 { write!(f, "{}", rows[0]) }
                    else { write!(f, "[{}]", rows.join("; ")) }
                } else if let Some(Value::Text(t)) = obj.get("type") {
                    write!(f, "[{}]", t)
                } else {
                    write!(f, "[Object]")
                }
            }
            Value::List(items) => {
                // Smart list display: show values for small lists, count for large
                if items.len() <= 5 {
                    let contents: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                    write!(f, "[{}]", contents.join(", "))
                } else {
                    write!(f, "[{}]", items.len())
                }
            }
            Value::Null => write!(f, "null"),
            Value::Error(e) => write!(f, "#ERROR: {}", e.code),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// From implementations for convenience
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<CalcError> for Value {
    fn from(e: CalcError) -> Self {
        Value::Error(e)
    }
}

impl From<Vec<Vec<f64>>> for Value {
    /// Untagged nested list, the shape function arguments arrive in
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Value::List(rows.into_iter()
            .map(|row| Value::List(row.into_iter().map(Value::Number).collect()))
            .collect())
    }
}
