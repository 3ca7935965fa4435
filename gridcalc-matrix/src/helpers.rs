//! Argument extraction and shape checks shared by the function plugins

use gridcalc_core::{CalcError, CellPolicy, Value};
use gridcalc_plugin::EvalContext;
use crate::error::MatrixError;
use crate::grid::{parse_grid_cell, parse_text};
use crate::types::Matrix;

/// Extract a Number from a Value
pub fn extract_number(value: &Value, func: &str, arg: &str) -> Result<f64, CalcError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Error(e) => Err(e.clone().with_note(format!("passed to {}() as '{}'", func, arg))),
        _ => Err(CalcError::arg_type(func, arg, "Number", value.type_name())),
    }
}

/// Extract a non-negative integer from a Value
pub fn extract_usize(value: &Value, func: &str, arg: &str) -> Result<usize, CalcError> {
    let n = extract_number(value, func, arg)?;
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(CalcError::domain_error(format!("{}: {} must be an integer", func, arg)));
    }
    if n < 0.0 {
        return Err(CalcError::domain_error(format!("{}: {} must be non-negative", func, arg)));
    }
    Ok(n as usize)
}

/// Extract a matrix from a Value.
///
/// Accepts a tagged Matrix object, a nested list, or a block of text
/// (`"1 2; 3 4"`). Text and null cells are read with the context's
/// cell policy.
pub fn extract_matrix(value: &Value, ctx: &EvalContext, func: &str, arg: &str) -> Result<Matrix, CalcError> {
    let annotate = |e: MatrixError| CalcError::from(e).in_function(func).for_argument(arg);

    match value {
        Value::Object(_) => match value.matrix_rows() {
            Some(rows) => Matrix::from_rows(rows).map_err(annotate),
            None => Err(CalcError::arg_type(func, arg, "Matrix", value.tag().unwrap_or("Object"))),
        },
        Value::List(rows) => matrix_from_list(rows, ctx.cell_policy, func, arg).map_err(|e| match e {
            ListError::Matrix(e) => annotate(e),
            ListError::Calc(e) => e,
        }),
        Value::Text(block) => parse_text(block, ctx.cell_policy).map_err(annotate),
        Value::Error(e) => Err(e.clone().with_note(format!("passed to {}() as '{}'", func, arg))),
        _ => Err(CalcError::arg_type(func, arg, "Matrix", value.type_name())),
    }
}

enum ListError {
    Matrix(MatrixError),
    Calc(CalcError),
}

impl From<MatrixError> for ListError {
    fn from(e: MatrixError) -> Self {
        ListError::Matrix(e)
    }
}

fn matrix_from_list(rows: &[Value], policy: CellPolicy, func: &str, arg: &str) -> Result<Matrix, ListError> {
    let mut data = Vec::with_capacity(rows.len());

    for (i, row_val) in rows.iter().enumerate() {
        let cells = match row_val {
            Value::List(cells) => cells,
            _ => return Err(ListError::Calc(CalcError::domain_error(format!(
                "{}: {} row {} must be a list", func, arg, i
            )))),
        };

        let mut row = Vec::with_capacity(cells.len());
        for (j, cell) in cells.iter().enumerate() {
            let x = match cell {
                Value::Number(n) => *n,
                Value::Text(t) => parse_grid_cell(t, i, j, policy)?,
                Value::Null => parse_grid_cell("", i, j, policy)?,
                other => return Err(ListError::Calc(CalcError::domain_error(format!(
                    "{}: {}[{}][{}] must be a Number, got {}", func, arg, i, j, other.type_name()
                )))),
            };
            row.push(x);
        }
        data.push(row);
    }

    Ok(Matrix::from_rows(data)?)
}

/// Check that two matrices have the same dimensions
pub fn check_same_dims(a: &Matrix, b: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if a.dims() != b.dims() {
        return Err(MatrixError::DimensionMismatch { op, left: a.dims(), right: b.dims() });
    }
    Ok(())
}

/// Check that two matrices can be multiplied
pub fn check_matmul_dims(a: &Matrix, b: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if a.cols() != b.rows() {
        return Err(MatrixError::DimensionMismatch { op, left: a.dims(), right: b.dims() });
    }
    Ok(())
}

/// Check that a matrix is square
pub fn check_square(m: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if !m.is_square() {
        return Err(MatrixError::NotSquare { op, dims: m.dims() });
    }
    Ok(())
}

/// Turn an algebra result into a Value, tagging errors with the function name
pub fn into_value<T: Into<Value>>(result: Result<T, MatrixError>, func: &str) -> Value {
    match result {
        Ok(v) => v.into(),
        Err(e) => Value::Error(CalcError::from(e).in_function(func)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::codes;
    use gridcalc_plugin::PluginRegistry;
    use std::sync::Arc;

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new()))
    }

    fn list(rows: Vec<Vec<Value>>) -> Value {
        Value::List(rows.into_iter().map(Value::List).collect())
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number(&Value::Number(42.0), "test", "x"), Ok(42.0));
        let err = extract_number(&Value::Text("a".into()), "test", "x").unwrap_err();
        assert!(err.is(codes::ARG_TYPE));
    }

    #[test]
    fn test_extract_usize() {
        assert_eq!(extract_usize(&Value::Number(3.0), "test", "n"), Ok(3));
        assert!(extract_usize(&Value::Number(2.5), "test", "n").is_err());
        assert!(extract_usize(&Value::Number(-1.0), "test", "n").is_err());
    }

    #[test]
    fn test_extract_matrix_from_list() {
        let val = Value::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let m = extract_matrix(&val, &ctx(), "test", "m").unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
    }

    #[test]
    fn test_extract_matrix_from_object() {
        let val = Matrix::identity(2).unwrap().to_value();
        let m = extract_matrix(&val, &ctx(), "test", "m").unwrap();
        assert_eq!(m, Matrix::identity(2).unwrap());
    }

    #[test]
    fn test_extract_matrix_from_text() {
        let m = extract_matrix(&Value::Text("1 2; 3 4".into()), &ctx(), "test", "m").unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_text_cells_follow_policy() {
        let val = list(vec![vec![Value::Number(1.0), Value::Text("x".into())]]);
        let m = extract_matrix(&val, &ctx(), "test", "m").unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 0.0]]);

        let strict = ctx().with_cell_policy(CellPolicy::Strict);
        let err = extract_matrix(&val, &strict, "test", "m").unwrap_err();
        assert!(err.is(codes::INVALID_CELL));
        let context = err.context.unwrap();
        assert_eq!(context.function.as_deref(), Some("test"));
        assert_eq!(context.argument.as_deref(), Some("m"));
    }

    #[test]
    fn test_extract_matrix_ragged() {
        let val = list(vec![
            vec![Value::Number(1.0), Value::Number(2.0)],
            vec![Value::Number(3.0)],
        ]);
        let err = extract_matrix(&val, &ctx(), "test", "m").unwrap_err();
        assert!(err.is(codes::RAGGED_MATRIX));
    }

    #[test]
    fn test_extract_matrix_wrong_type() {
        let err = extract_matrix(&Value::Number(1.0), &ctx(), "test", "m").unwrap_err();
        assert!(err.is(codes::ARG_TYPE));
        let err = extract_matrix(&Value::singular(), &ctx(), "test", "m").unwrap_err();
        assert!(err.message.contains("Singular"));
    }

    #[test]
    fn test_checks() {
        let a = Matrix::zeros(2, 3).unwrap();
        let b = Matrix::zeros(3, 2).unwrap();
        assert!(check_matmul_dims(&a, &b, "multiply").is_ok());
        assert!(check_same_dims(&a, &b, "add").is_err());
        assert_eq!(check_square(&a, "trace"), Err(MatrixError::NotSquare { op: "trace", dims: a.dims() }));
    }
}
