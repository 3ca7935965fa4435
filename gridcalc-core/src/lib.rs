//! gridcalc Core - Fundamental types
//!
//! This crate provides the core types used throughout gridcalc:
//! - `Value`: Runtime values (numbers, text, tagged objects, errors)
//! - `CalcError`: Structured errors with machine-readable codes
//! - Number parsing and fixed-decimal display

mod number;
mod value;
mod error;

pub use number::{NumberError, CellPolicy, parse_number, parse_cell, format_decimal, format_grid, DEFAULT_PLACES, MAX_PLACES};
pub use value::{Value, MATRIX_TAG, SINGULAR_TAG};
pub use error::{CalcError, ErrorContext, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, CalcError, Severity, CellPolicy};
    pub use crate::error::codes;
}
