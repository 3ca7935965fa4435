//! Matrix arithmetic: add, subtract, multiply, scale, transpose

use gridcalc_plugin::prelude::*;
use crate::error::MatrixError;
use crate::types::Matrix;
use crate::helpers::*;

/// Elementwise sum
pub fn add(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    check_same_dims(a, b, "add")?;
    Ok(a.zip_with(b, |x, y| x + y))
}

/// Elementwise difference
pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    check_same_dims(a, b, "subtract")?;
    Ok(a.zip_with(b, |x, y| x - y))
}

/// Row-by-column product, `(a.rows × b.cols)`
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    check_matmul_dims(a, b, "multiply")?;
    Ok(Matrix::build(a.rows(), b.cols(), |i, j| {
        (0..a.cols()).map(|k| a[(i, k)] * b[(k, j)]).sum()
    }))
}

pub fn scalar_multiply(a: &Matrix, k: f64) -> Matrix {
    a.map(|x| x * k)
}

pub fn transpose(a: &Matrix) -> Matrix {
    Matrix::build(a.cols(), a.rows(), |i, j| a[(j, i)])
}

// ============ mat_add ============

pub struct MatAddFn;

static MAT_ADD_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("a", "Matrix", "First matrix"),
    ArgMeta::required("b", "Matrix", "Second matrix (same shape)"),
];

static MAT_ADD_EXAMPLES: [&str; 1] = ["mat_add([[1,2],[3,4]], [[5,6],[7,8]]) → [[6,8],[10,12]]"];
static MAT_ADD_RELATED: [&str; 2] = ["mat_sub", "scale"];

impl FunctionPlugin for MatAddFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "mat_add", description: "Elementwise matrix addition", usage: "mat_add(a, b)",
            args: &MAT_ADD_ARGS, returns: "Matrix", examples: &MAT_ADD_EXAMPLES,
            category: "matrix/arithmetic", related: &MAT_ADD_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 { return Value::Error(CalcError::arg_count("mat_add", 2, args.len())); }

        let a = match extract_matrix(&args[0], ctx, "mat_add", "a") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let b = match extract_matrix(&args[1], ctx, "mat_add", "b") { Ok(m) => m, Err(e) => return Value::Error(e) };

        into_value(add(&a, &b), "mat_add")
    }
}

// ============ mat_sub ============

pub struct MatSubFn;

static MAT_SUB_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("a", "Matrix", "Matrix to subtract from"),
    ArgMeta::required("b", "Matrix", "Matrix to subtract (same shape)"),
];

static MAT_SUB_EXAMPLES: [&str; 1] = ["mat_sub([[5,6],[7,8]], [[1,2],[3,4]]) → [[4,4],[4,4]]"];
static MAT_SUB_RELATED: [&str; 2] = ["mat_add", "scale"];

impl FunctionPlugin for MatSubFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "mat_sub", description: "Elementwise matrix subtraction", usage: "mat_sub(a, b)",
            args: &MAT_SUB_ARGS, returns: "Matrix", examples: &MAT_SUB_EXAMPLES,
            category: "matrix/arithmetic", related: &MAT_SUB_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 { return Value::Error(CalcError::arg_count("mat_sub", 2, args.len())); }

        let a = match extract_matrix(&args[0], ctx, "mat_sub", "a") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let b = match extract_matrix(&args[1], ctx, "mat_sub", "b") { Ok(m) => m, Err(e) => return Value::Error(e) };

        into_value(subtract(&a, &b), "mat_sub")
    }
}

// ============ matmul ============

pub struct MatmulFn;

static MATMUL_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("a", "Matrix", "Left matrix (m×n)"),
    ArgMeta::required("b", "Matrix", "Right matrix (n×p)"),
];

static MATMUL_EXAMPLES: [&str; 1] = ["matmul([[1,2],[3,4]], [[5,6],[7,8]]) → [[19,22],[43,50]]"];
static MATMUL_RELATED: [&str; 2] = ["transpose", "inverse"];

impl FunctionPlugin for MatmulFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "matmul", description: "Matrix multiplication", usage: "matmul(a, b)",
            args: &MATMUL_ARGS, returns: "Matrix", examples: &MATMUL_EXAMPLES,
            category: "matrix/arithmetic", related: &MATMUL_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 { return Value::Error(CalcError::arg_count("matmul", 2, args.len())); }

        let a = match extract_matrix(&args[0], ctx, "matmul", "a") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let b = match extract_matrix(&args[1], ctx, "matmul", "b") { Ok(m) => m, Err(e) => return Value::Error(e) };

        into_value(multiply(&a, &b), "matmul")
    }
}

// ============ scale ============

pub struct ScaleFn;

static SCALE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Matrix to scale"),
    ArgMeta::required("k", "Number", "Scalar factor"),
];

static SCALE_EXAMPLES: [&str; 1] = ["scale([[1,2],[3,4]], 2) → [[2,4],[6,8]]"];
static SCALE_RELATED: [&str; 2] = ["mat_add", "matmul"];

impl FunctionPlugin for ScaleFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "scale", description: "Multiply every element by a scalar", usage: "scale(matrix, k)",
            args: &SCALE_ARGS, returns: "Matrix", examples: &SCALE_EXAMPLES,
            category: "matrix/arithmetic", related: &SCALE_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 { return Value::Error(CalcError::arg_count("scale", 2, args.len())); }

        let m = match extract_matrix(&args[0], ctx, "scale", "matrix") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let k = match extract_number(&args[1], "scale", "k") { Ok(k) => k, Err(e) => return Value::Error(e) };

        scalar_multiply(&m, k).into()
    }
}

// ============ transpose ============

pub struct TransposeFn;

static TRANSPOSE_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("matrix", "Matrix", "Matrix to transpose"),
];

static TRANSPOSE_EXAMPLES: [&str; 1] = ["transpose([[1,2,3],[4,5,6]]) → [[1,4],[2,5],[3,6]]"];
static TRANSPOSE_RELATED: [&str; 1] = ["matmul"];

impl FunctionPlugin for TransposeFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "transpose", description: "Swap rows and columns", usage: "transpose(matrix)",
            args: &TRANSPOSE_ARGS, returns: "Matrix", examples: &TRANSPOSE_EXAMPLES,
            category: "matrix/arithmetic", related: &TRANSPOSE_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 { return Value::Error(CalcError::arg_count("transpose", 1, args.len())); }

        match extract_matrix(&args[0], ctx, "transpose", "matrix") {
            Ok(m) => transpose(&m).into(),
            Err(e) => Value::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimensions;
    use gridcalc_core::codes;
    use std::sync::Arc;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new()))
    }

    #[test]
    fn test_add_subtract() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        assert_eq!(add(&a, &b).unwrap().to_rows(), vec![vec![6.0, 8.0], vec![10.0, 12.0]]);
        assert_eq!(subtract(&b, &a).unwrap().to_rows(), vec![vec![4.0, 4.0], vec![4.0, 4.0]]);
    }

    #[test]
    fn test_add_mismatch() {
        let a = Matrix::zeros(2, 2).unwrap();
        let b = Matrix::zeros(3, 2).unwrap();
        assert_eq!(add(&a, &b), Err(MatrixError::DimensionMismatch {
            op: "add",
            left: Dimensions::new(2, 2),
            right: Dimensions::new(3, 2),
        }));
        assert!(subtract(&a, &b).is_err());
    }

    #[test]
    fn test_multiply() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        assert_eq!(multiply(&a, &b).unwrap().to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn test_multiply_rectangular() {
        let a = m(vec![vec![1.0, 2.0, 3.0]]);
        let b = m(vec![vec![1.0], vec![1.0], vec![1.0]]);
        let ab = multiply(&a, &b).unwrap();
        assert_eq!(ab.dims(), Dimensions::new(1, 1));
        assert_eq!(ab[(0, 0)], 6.0);
        assert_eq!(multiply(&b, &a).unwrap().dims(), Dimensions::new(3, 3));
    }

    #[test]
    fn test_multiply_mismatch() {
        let a = Matrix::zeros(2, 3).unwrap();
        assert!(matches!(multiply(&a, &a), Err(MatrixError::DimensionMismatch { op: "multiply", .. })));
    }

    #[test]
    fn test_scalar_and_transpose() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(scalar_multiply(&a, 1.0), a);
        assert_eq!(scalar_multiply(&a, -2.0)[(1, 2)], -12.0);
        let t = transpose(&a);
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
        assert_eq!(transpose(&t), a);
    }

    #[test]
    fn test_matmul_fn() {
        let a = Value::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Value::from(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        let result = MatmulFn.call(&[a, b], &ctx());
        assert_eq!(result.matrix_rows(), Some(vec![vec![19.0, 22.0], vec![43.0, 50.0]]));
    }

    #[test]
    fn test_mat_add_fn_mismatch() {
        let a = Value::from(vec![vec![1.0, 2.0]]);
        let b = Value::from(vec![vec![1.0], vec![2.0]]);
        let result = MatAddFn.call(&[a, b], &ctx());
        let err = result.as_error().unwrap();
        assert!(err.is(codes::DIMENSION_MISMATCH));
        assert_eq!(err.context.as_ref().and_then(|c| c.function.as_deref()), Some("mat_add"));
    }

    #[test]
    fn test_arg_count() {
        let result = ScaleFn.call(&[Value::from(vec![vec![1.0]])], &ctx());
        assert!(result.as_error().unwrap().is(codes::ARG_COUNT));
    }
}
