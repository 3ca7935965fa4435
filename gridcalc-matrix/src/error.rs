//! Matrix error taxonomy

use gridcalc_core::CalcError;
use thiserror::Error;
use crate::types::Dimensions;

/// Shape and input failures of matrix operations.
///
/// A singular matrix is not an error; `inverse` reports it as
/// [`Inverse::Singular`](crate::Inverse::Singular).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("{op}: incompatible dimensions {left} and {right}")]
    DimensionMismatch {
        op: &'static str,
        left: Dimensions,
        right: Dimensions,
    },

    #[error("{op}: requires a square matrix, got {dims}")]
    NotSquare {
        op: &'static str,
        dims: Dimensions,
    },

    #[error("matrix must have at least one row and one column")]
    Empty,

    #[error("row {row} has {len} columns, expected {expected}")]
    Ragged {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("cell ({row}, {col}) is not a number: '{text}'")]
    InvalidCell {
        row: usize,
        col: usize,
        text: String,
    },

    #[error("cell ({row}, {col}) is outside a {dims} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        dims: Dimensions,
    },

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

impl From<MatrixError> for CalcError {
    fn from(err: MatrixError) -> Self {
        match err {
            MatrixError::DimensionMismatch { op, left, right } => {
                CalcError::dimension_mismatch(op, &left.to_string(), &right.to_string())
            }
            MatrixError::NotSquare { op, dims } => CalcError::not_square(op, &dims.to_string()),
            MatrixError::Empty => CalcError::empty_matrix("no rows or no columns"),
            MatrixError::Ragged { row, len, expected } => CalcError::ragged_matrix(row, len, expected),
            MatrixError::InvalidCell { row, col, text } => CalcError::invalid_cell(row, col, &text),
            e @ MatrixError::OutOfBounds { .. } => CalcError::domain_error(e.to_string()),
            MatrixError::UnknownOperation(name) => CalcError::undefined_func(&name),
        }
    }
}
