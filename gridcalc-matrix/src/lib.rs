//! gridcalc Matrix - matrix algebra over `f64`
//!
//! Provides:
//! - A rectangular [`Matrix`] type that is checked on construction
//! - Arithmetic (add, subtract, multiply, scalar multiply, transpose)
//! - Square-matrix properties (determinant, trace) and the inverse, which
//!   reports a singular input as [`Inverse::Singular`] rather than an error
//! - LU decomposition through nalgebra
//! - Grid parsing and aligned fixed-decimal output
//! - [`MatrixCalculator`], two operand grids plus a scalar
//! - Function plugins registered by [`load_matrix_library`]
//!
//! Determinants up to 6×6 use cofactor expansion; larger ones use LU.

mod types;
mod error;
mod helpers;
mod grid;
mod construct;
mod ops;
mod props;
mod inverse;
mod decompose;
mod calculator;

pub use types::{Matrix, Dimensions};
pub use error::MatrixError;
pub use helpers::extract_matrix;
pub use grid::{parse_grid, parse_grid_cell, parse_text, format_matrix, format_number, CellPolicy};
pub use ops::{add, subtract, multiply, scalar_multiply, transpose};
pub use props::{determinant, determinant_cofactor, trace, COFACTOR_LIMIT};
pub use inverse::{inverse, Inverse, SINGULAR_EPSILON};
pub use decompose::{lu, determinant_lu, Lu};
pub use construct::MAX_DIMENSION;
pub use calculator::{MatrixCalculator, Operand, Operation, Outcome};

use gridcalc_plugin::PluginRegistry;

/// Load matrix functions into registry
pub fn load_matrix_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Construction
        .with_function(construct::MatrixFn)
        .with_function(construct::IdentityFn)
        .with_function(construct::ZerosFn)

        // Arithmetic
        .with_function(ops::MatAddFn)
        .with_function(ops::MatSubFn)
        .with_function(ops::MatmulFn)
        .with_function(ops::ScaleFn)
        .with_function(ops::TransposeFn)

        // Properties and inverse
        .with_function(props::DeterminantFn)
        .with_function(props::TraceFn)
        .with_function(inverse::InverseFn)

        // Decompositions
        .with_function(decompose::LuFn)
}
