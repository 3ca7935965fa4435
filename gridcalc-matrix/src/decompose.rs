//! LU decomposition

use std::collections::HashMap;
use gridcalc_plugin::prelude::*;
use crate::error::MatrixError;
use crate::helpers::{check_square, extract_matrix};
use crate::types::Matrix;

/// Factors of `P·A = L·U`
#[derive(Debug, Clone, PartialEq)]
pub struct Lu {
    /// Unit lower triangular
    pub l: Matrix,
    /// Upper triangular
    pub u: Matrix,
    /// Row permutation
    pub p: Matrix,
}

impl From<Lu> for Value {
    fn from(lu: Lu) -> Value {
        let mut obj = HashMap::new();
        obj.insert("L".to_string(), lu.l.into());
        obj.insert("U".to_string(), lu.u.into());
        obj.insert("P".to_string(), lu.p.into());
        Value::Object(obj)
    }
}

/// LU decomposition with partial pivoting
pub fn lu(a: &Matrix) -> Result<Lu, MatrixError> {
    check_square(a, "lu")?;
    let n = a.rows();
    let (p, l, u) = a.to_dmatrix().lu().unpack();

    let mut p_data = nalgebra::DMatrix::<f64>::identity(n, n);
    p.permute_rows(&mut p_data);

    Ok(Lu {
        l: Matrix::from_dmatrix(&l)?,
        u: Matrix::from_dmatrix(&u)?,
        p: Matrix::from_dmatrix(&p_data)?,
    })
}

/// Determinant from the LU factors, O(n³)
pub fn determinant_lu(a: &Matrix) -> Result<f64, MatrixError> {
    check_square(a, "determinant")?;
    Ok(a.to_dmatrix().lu().determinant())
}

// ============ lu ============

pub struct LuFn;

static LU_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "matrix",
    typ: "Matrix",
    description: "Square matrix to decompose",
    optional: false,
    default: None,
}];
static LU_EXAMPLES: [&str; 1] = [
    "lu([[1,2,3],[4,5,6],[7,8,10]]) → {L, U, P}",
];
static LU_RELATED: [&str; 2] = ["determinant", "inverse"];

impl FunctionPlugin for LuFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "lu",
            description: "LU decomposition with partial pivoting (returns {L, U, P})",
            usage: "lu(matrix)",
            args: &LU_ARGS,
            returns: "Object",
            examples: &LU_EXAMPLES,
            category: "matrix/decomposition",
            related: &LU_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(CalcError::arg_count("lu", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], ctx, "lu", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };

        match lu(&matrix) {
            Ok(factors) => factors.into(),
            Err(e) => Value::Error(CalcError::from(e).in_function("lu")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::multiply;
    use approx::assert_relative_eq;
    use gridcalc_core::MATRIX_TAG;
    use std::sync::Arc;

    fn sample() -> Matrix {
        Matrix::from_rows(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 10.0],
        ]).unwrap()
    }

    #[test]
    fn test_lu_reconstructs() {
        let a = sample();
        let f = lu(&a).unwrap();
        let pa = multiply(&f.p, &a).unwrap();
        let lu = multiply(&f.l, &f.u).unwrap();
        assert!(pa.approx_eq(&lu, 1e-12));
    }

    #[test]
    fn test_lu_shapes() {
        let f = lu(&sample()).unwrap();
        for i in 0..3 {
            assert_eq!(f.l[(i, i)], 1.0);
            for j in (i + 1)..3 {
                assert_eq!(f.l[(i, j)], 0.0);
                assert_eq!(f.u[(j, i)], 0.0);
            }
        }
    }

    #[test]
    fn test_determinant_lu() {
        assert_relative_eq!(determinant_lu(&sample()).unwrap(), -3.0, epsilon = 1e-12);
        let sq = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_relative_eq!(determinant_lu(&sq).unwrap(), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lu_not_square() {
        let a = Matrix::zeros(2, 3).unwrap();
        assert!(matches!(lu(&a), Err(MatrixError::NotSquare { op: "lu", .. })));
        assert!(determinant_lu(&a).is_err());
    }

    #[test]
    fn test_lu_fn() {
        let ctx = EvalContext::new(Arc::new(PluginRegistry::new()));
        let result = LuFn.call(&[sample().to_value()], &ctx);
        for key in ["L", "U", "P"] {
            assert_eq!(result.get(key).tag(), Some(MATRIX_TAG));
        }
    }
}
