//! Number parsing and fixed-point display
//!
//! Matrix entries are plain `f64`. This module owns the two places where
//! numbers cross a text boundary: reading a cell typed by a user and
//! rendering a result with a fixed number of decimals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for number parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Empty input")]
    Empty,
}

/// Decimal places used when the caller does not ask for any
pub const DEFAULT_PLACES: u32 = 4;

/// Upper bound on requested decimal places
pub const MAX_PLACES: u32 = 10;

/// Parse a number the way a form field would be read.
///
/// Leading and trailing whitespace is ignored. Anything `f64::from_str`
/// accepts is accepted, including `NaN` and `inf`.
pub fn parse_number(s: &str) -> Result<f64, NumberError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(NumberError::Empty);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| NumberError::ParseError(trimmed.to_string()))
}

/// How a cell that is not a number is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellPolicy {
    /// Unparseable or empty cells read as `0.0`
    #[default]
    Lenient,
    /// Unparseable or empty cells are rejected
    Strict,
}

/// Read one cell of user input under the given policy
pub fn parse_cell(text: &str, policy: CellPolicy) -> Result<f64, NumberError> {
    match policy {
        CellPolicy::Lenient => Ok(parse_number(text).unwrap_or(0.0)),
        CellPolicy::Strict => parse_number(text),
    }
}

/// Render with a fixed number of decimal places (clamped to `MAX_PLACES`).
///
/// Negative zero renders as zero so that `-0.0000` never reaches a display.
pub fn format_decimal(x: f64, places: u32) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let places = places.min(MAX_PLACES) as usize;
    let s = format!("{:.prec$}", x, prec = places);
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

/// Render rows of numbers as an aligned block, one line per row.
///
/// Cells are right-aligned to the widest rendered cell and separated by two
/// spaces.
pub fn format_grid(rows: &[Vec<f64>], places: u32) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|&x| format_decimal(x, places)).collect())
        .collect();

    let width = cells
        .iter()
        .flat_map(|row| row.iter().map(|c| c.chars().count()))
        .max()
        .unwrap_or(0);

    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| format!("{:>width$}", c, width = width))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
