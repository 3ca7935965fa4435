//! Square-matrix properties: determinant and trace

use gridcalc_plugin::prelude::*;
use crate::decompose::determinant_lu;
use crate::error::MatrixError;
use crate::helpers::*;
use crate::types::Matrix;

/// Largest size evaluated by cofactor expansion in [`determinant`].
/// Bigger matrices go through LU, since expansion costs O(n!).
pub const COFACTOR_LIMIT: usize = 6;

/// Determinant of a square matrix.
///
/// Up to [`COFACTOR_LIMIT`] this is [`determinant_cofactor`]; above it,
/// [`determinant_lu`].
pub fn determinant(a: &Matrix) -> Result<f64, MatrixError> {
    check_square(a, "determinant")?;
    if a.rows() <= COFACTOR_LIMIT {
        Ok(cofactor(a.as_rows()))
    } else {
        determinant_lu(a)
    }
}

/// Determinant by cofactor expansion along the first row
pub fn determinant_cofactor(a: &Matrix) -> Result<f64, MatrixError> {
    check_square(a, "determinant")?;
    Ok(cofactor(a.as_rows()))
}

fn cofactor(m: &[Vec<f64>]) -> f64 {
    match m.len() {
        1 => m[0][0],
        2 => m[0][0] * m[1][1] - m[0][1] * m[1][0],
        n => (0..n)
            .map(|i| {
                let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                m[0][i] * sign * cofactor(&minor(m, i))
            })
            .sum(),
    }
}

/// Drop row 0 and column `col`
fn minor(m: &[Vec<f64>], col: usize) -> Vec<Vec<f64>> {
    m[1..]
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(j, _)| j != col)
                .map(|(_, &x)| x)
                .collect()
        })
        .collect()
}

/// Sum of the main diagonal
pub fn trace(a: &Matrix) -> Result<f64, MatrixError> {
    check_square(a, "trace")?;
    Ok((0..a.rows()).map(|i| a[(i, i)]).sum())
}

// ============ trace ============

pub struct TraceFn;

static TRACE_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "matrix",
    typ: "Matrix",
    description: "Square matrix",
    optional: false,
    default: None,
}];
static TRACE_EXAMPLES: [&str; 2] = [
    "trace(identity(3)) → 3",
    "trace([[1,2,3],[4,5,6],[7,8,9]]) → 15",
];
static TRACE_RELATED: [&str; 1] = ["determinant"];

impl FunctionPlugin for TraceFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "trace",
            description: "Compute the trace (sum of diagonal elements)",
            usage: "trace(matrix)",
            args: &TRACE_ARGS,
            returns: "Number",
            examples: &TRACE_EXAMPLES,
            category: "matrix/properties",
            related: &TRACE_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(CalcError::arg_count("trace", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], ctx, "trace", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };

        into_value(trace(&matrix), "trace")
    }
}

// ============ determinant ============

pub struct DeterminantFn;

static DET_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "matrix",
    typ: "Matrix",
    description: "Square matrix",
    optional: false,
    default: None,
}];
static DET_EXAMPLES: [&str; 2] = [
    "determinant(identity(3)) → 1",
    "determinant([[1,2],[3,4]]) → -2",
];
static DET_RELATED: [&str; 3] = ["inverse", "trace", "lu"];

impl FunctionPlugin for DeterminantFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "determinant",
            description: "Compute the determinant of a square matrix",
            usage: "determinant(matrix)",
            args: &DET_ARGS,
            returns: "Number",
            examples: &DET_EXAMPLES,
            category: "matrix/properties",
            related: &DET_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(CalcError::arg_count("determinant", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], ctx, "determinant", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };

        into_value(determinant(&matrix), "determinant")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gridcalc_core::codes;
    use std::sync::Arc;

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new()))
    }

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_small_determinants() {
        assert_eq!(determinant(&m(vec![vec![7.0]])), Ok(7.0));
        assert_eq!(determinant(&m(vec![vec![1.0, 2.0], vec![3.0, 4.0]])), Ok(-2.0));
    }

    #[test]
    fn test_cofactor_3x3() {
        let a = m(vec![
            vec![2.0, 0.0, 1.0],
            vec![1.0, 3.0, 2.0],
            vec![1.0, 1.0, 1.0],
        ]);
        // 2(3-2) - 0 + 1(1-3)
        assert_eq!(determinant(&a), Ok(0.0));

        let b = m(vec![
            vec![6.0, 1.0, 1.0],
            vec![4.0, -2.0, 5.0],
            vec![2.0, 8.0, 7.0],
        ]);
        assert_eq!(determinant(&b), Ok(-306.0));
    }

    #[test]
    fn test_identity_determinant() {
        for n in 1..=9 {
            let det = determinant(&Matrix::identity(n).unwrap()).unwrap();
            assert_relative_eq!(det, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_path_matches_cofactor() {
        let n = COFACTOR_LIMIT + 1;
        let a = Matrix::from_fn(n, n, |i, j| {
            if i == j { 4.0 + i as f64 } else { 1.0 / (1.0 + i as f64 + j as f64) }
        }).unwrap();
        let by_lu = determinant(&a).unwrap();
        let by_cofactor = determinant_cofactor(&a).unwrap();
        assert_relative_eq!(by_lu, by_cofactor, max_relative = 1e-9);
    }

    #[test]
    fn test_determinant_not_square() {
        let a = Matrix::zeros(2, 3).unwrap();
        assert!(matches!(determinant(&a), Err(MatrixError::NotSquare { op: "determinant", .. })));
        assert!(determinant_cofactor(&a).is_err());
    }

    #[test]
    fn test_trace() {
        let a = m(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ]);
        assert_eq!(trace(&a), Ok(15.0));
        assert!(trace(&Matrix::zeros(1, 2).unwrap()).is_err());
    }

    #[test]
    fn test_trace_fn() {
        let identity = Matrix::identity(3).unwrap().to_value();
        assert_eq!(TraceFn.call(&[identity], &ctx()).as_number(), Some(3.0));
    }

    #[test]
    fn test_determinant_fn() {
        let a = Value::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(DeterminantFn.call(&[a], &ctx()).as_number(), Some(-2.0));

        let rect = Value::from(vec![vec![1.0, 2.0]]);
        let result = DeterminantFn.call(&[rect], &ctx());
        assert!(result.as_error().unwrap().is(codes::NOT_SQUARE));
    }
}
