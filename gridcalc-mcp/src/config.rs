//! Server configuration from environment variables
//!
//! | variable                | meaning                                  | default |
//! |-------------------------|------------------------------------------|---------|
//! | `GRIDCALC_PRECISION`    | decimal places in rendered output (0-10) | 4       |
//! | `GRIDCALC_STRICT_CELLS` | reject non-numeric matrix cells          | off     |

use gridcalc_core::{CellPolicy, DEFAULT_PLACES, MAX_PLACES};
use thiserror::Error;
use tracing::warn;

pub const PRECISION_VAR: &str = "GRIDCALC_PRECISION";
pub const STRICT_CELLS_VAR: &str = "GRIDCALC_STRICT_CELLS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: expected an integer from 0 to {max}, got '{value}'")]
    InvalidPrecision {
        var: &'static str,
        value: String,
        max: u32,
    },

    #[error("{var}: expected a boolean (1/0, true/false, yes/no, on/off), got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub precision: u32,
    pub cell_policy: CellPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PLACES,
            cell_policy: CellPolicy::Lenient,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup. Invalid values are logged and replaced
    /// by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let precision = parse_precision(lookup(PRECISION_VAR))
            .unwrap_or_else(|e| {
                warn!(error = %e, default = defaults.precision, "ignoring invalid precision");
                None
            })
            .unwrap_or(defaults.precision);

        let strict = parse_flag(STRICT_CELLS_VAR, lookup(STRICT_CELLS_VAR))
            .unwrap_or_else(|e| {
                warn!(error = %e, "ignoring invalid cell policy flag");
                None
            })
            .unwrap_or(false);

        Self {
            precision,
            cell_policy: if strict { CellPolicy::Strict } else { defaults.cell_policy },
        }
    }
}

fn parse_precision(raw: Option<String>) -> Result<Option<u32>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    match raw.trim().parse::<u32>() {
        Ok(p) if p <= MAX_PLACES => Ok(Some(p)),
        _ => Err(ConfigError::InvalidPrecision {
            var: PRECISION_VAR,
            value: raw,
            max: MAX_PLACES,
        }),
    }
}

fn parse_flag(var: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "" | "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidFlag { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), ServerConfig::default());
        assert_eq!(config(&[]).precision, 4);
    }

    #[test]
    fn test_precision() {
        assert_eq!(config(&[(PRECISION_VAR, " 2 ")]).precision, 2);
        assert_eq!(config(&[(PRECISION_VAR, "10")]).precision, 10);
    }

    #[test]
    fn test_invalid_precision_falls_back() {
        assert_eq!(config(&[(PRECISION_VAR, "11")]).precision, DEFAULT_PLACES);
        assert_eq!(config(&[(PRECISION_VAR, "two")]).precision, DEFAULT_PLACES);
        assert_eq!(config(&[(PRECISION_VAR, "-1")]).precision, DEFAULT_PLACES);
    }

    #[test]
    fn test_strict_cells() {
        assert_eq!(config(&[(STRICT_CELLS_VAR, "yes")]).cell_policy, CellPolicy::Strict);
        assert_eq!(config(&[(STRICT_CELLS_VAR, "off")]).cell_policy, CellPolicy::Lenient);
        assert_eq!(config(&[(STRICT_CELLS_VAR, "maybe")]).cell_policy, CellPolicy::Lenient);
    }

    #[test]
    fn test_errors() {
        let err = parse_precision(Some("99".to_string())).unwrap_err();
        assert!(err.to_string().contains("GRIDCALC_PRECISION"));
        assert_eq!(
            parse_flag(STRICT_CELLS_VAR, Some("maybe".to_string())),
            Err(ConfigError::InvalidFlag { var: STRICT_CELLS_VAR, value: "maybe".to_string() })
        );
        assert_eq!(parse_flag(STRICT_CELLS_VAR, None), Ok(None));
    }
}
