//! Matrix inverse

use gridcalc_plugin::prelude::*;
use tracing::debug;
use crate::error::MatrixError;
use crate::helpers::{check_square, extract_matrix};
use crate::props::determinant;
use crate::types::Matrix;

/// Determinants and pivots smaller than this in magnitude count as zero
pub const SINGULAR_EPSILON: f64 = 1e-10;

/// Result of inverting a square matrix
#[derive(Debug, Clone, PartialEq)]
pub enum Inverse {
    Invertible(Matrix),
    /// No inverse exists. This is an answer, not a failure.
    Singular,
}

impl Inverse {
    pub fn is_singular(&self) -> bool {
        matches!(self, Inverse::Singular)
    }

    pub fn matrix(&self) -> Option<&Matrix> {
        match self {
            Inverse::Invertible(m) => Some(m),
            Inverse::Singular => None,
        }
    }

    pub fn into_matrix(self) -> Option<Matrix> {
        match self {
            Inverse::Invertible(m) => Some(m),
            Inverse::Singular => None,
        }
    }
}

impl From<Inverse> for Value {
    fn from(inv: Inverse) -> Value {
        match inv {
            Inverse::Invertible(m) => m.into(),
            Inverse::Singular => Value::singular(),
        }
    }
}

/// Inverse of a square matrix.
///
/// 1×1 and 2×2 use closed forms; larger matrices use Gauss-Jordan
/// elimination with partial pivoting.
pub fn inverse(a: &Matrix) -> Result<Inverse, MatrixError> {
    check_square(a, "inverse")?;

    let det = determinant(a)?;
    if det.abs() < SINGULAR_EPSILON {
        debug!(dims = %a.dims(), det, "matrix is singular");
        return Ok(Inverse::Singular);
    }

    let inv = match a.rows() {
        1 => Matrix::build(1, 1, |_, _| 1.0 / a[(0, 0)]),
        2 => {
            let (p, q, r, s) = (a[(0, 0)], a[(0, 1)], a[(1, 0)], a[(1, 1)]);
            let adj = [[s, -q], [-r, p]];
            Matrix::build(2, 2, |i, j| adj[i][j] / det)
        }
        _ => match gauss_jordan(a) {
            Some(m) => m,
            None => {
                debug!(dims = %a.dims(), "pivot below threshold during elimination");
                return Ok(Inverse::Singular);
            }
        },
    };

    Ok(Inverse::Invertible(inv))
}

/// Reduce `[A | I]` to `[I | A⁻¹]`; `None` if a pivot vanishes
fn gauss_jordan(a: &Matrix) -> Option<Matrix> {
    let n = a.rows();
    let mut aug: Vec<Vec<f64>> = a
        .as_rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&x, &y| aug[x][col].abs().total_cmp(&aug[y][col].abs()))?;
        if aug[pivot_row][col].abs() < SINGULAR_EPSILON {
            return None;
        }
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for x in aug[col].iter_mut() {
            *x /= pivot;
        }

        let pivot_vals = aug[col].clone();
        for (r, row) in aug.iter_mut().enumerate() {
            if r == col {
                continue;
            }
            let factor = row[col];
            if factor != 0.0 {
                for (x, p) in row.iter_mut().zip(&pivot_vals) {
                    *x -= factor * p;
                }
            }
        }
    }

    Some(Matrix::from_rows_unchecked(
        aug.into_iter().map(|row| row[n..].to_vec()).collect(),
    ))
}

// ============ inverse ============

pub struct InverseFn;

static INVERSE_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "matrix",
    typ: "Matrix",
    description: "Square matrix",
    optional: false,
    default: None,
}];
static INVERSE_EXAMPLES: [&str; 2] = [
    "inverse([[1,2],[3,4]]) → [[-2,1],[1.5,-0.5]]",
    "inverse([[1,2],[2,4]]) → Singular",
];
static INVERSE_RELATED: [&str; 2] = ["determinant", "matmul"];

impl FunctionPlugin for InverseFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "inverse",
            description: "Matrix inverse, or a Singular object when none exists",
            usage: "inverse(matrix)",
            args: &INVERSE_ARGS,
            returns: "Matrix | Singular",
            examples: &INVERSE_EXAMPLES,
            category: "matrix/properties",
            related: &INVERSE_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(CalcError::arg_count("inverse", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], ctx, "inverse", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };

        match inverse(&matrix) {
            Ok(inv) => inv.into(),
            Err(e) => Value::Error(CalcError::from(e).in_function("inverse")),
        }
    }
}
