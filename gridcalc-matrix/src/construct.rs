//! Matrix construction functions

use gridcalc_plugin::prelude::*;
use crate::helpers::*;
use crate::types::Matrix;

/// Largest row or column count the constructors will allocate
pub const MAX_DIMENSION: usize = 1024;

fn extract_dimension(value: &Value, func: &str, arg: &str) -> Result<usize, CalcError> {
    let n = extract_usize(value, func, arg)?;
    if n == 0 {
        return Err(CalcError::domain_error(format!("{}: {} must be positive", func, arg)));
    }
    if n > MAX_DIMENSION {
        return Err(CalcError::domain_error(format!("{}: {} must be at most {}", func, arg, MAX_DIMENSION)));
    }
    Ok(n)
}

// ============ matrix ============

pub struct MatrixFn;

static MATRIX_ARGS: [ArgMeta; 1] = [
    ArgMeta {
        name: "data",
        typ: "List|Text",
        description: "Nested list [[row1], [row2], ...] or text such as \"1 2; 3 4\"",
        optional: false,
        default: None,
    },
];

static MATRIX_EXAMPLES: [&str; 2] = [
    "matrix([[1,2,3],[4,5,6]]) → 2×3 matrix",
    "matrix(\"1 2; 3 4\") → 2×2 matrix",
];

static MATRIX_RELATED: [&str; 2] = ["identity", "zeros"];

impl FunctionPlugin for MatrixFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "matrix",
            description: "Create a matrix from a nested list or a block of text",
            usage: "matrix(data)",
            args: &MATRIX_ARGS,
            returns: "Matrix",
            examples: &MATRIX_EXAMPLES,
            category: "matrix/construct",
            related: &MATRIX_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(CalcError::arg_count("matrix", 1, args.len()));
        }

        match extract_matrix(&args[0], ctx, "matrix", "data") {
            Ok(m) => m.into(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ identity ============

pub struct IdentityFn;

static IDENTITY_ARGS: [ArgMeta; 1] = [
    ArgMeta {
        name: "n",
        typ: "Number",
        description: "Size of identity matrix",
        optional: false,
        default: None,
    },
];

static IDENTITY_EXAMPLES: [&str; 1] = ["identity(3) → 3×3 identity matrix"];

static IDENTITY_RELATED: [&str; 2] = ["zeros", "matrix"];

impl FunctionPlugin for IdentityFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "identity",
            description: "Create n×n identity matrix",
            usage: "identity(n)",
            args: &IDENTITY_ARGS,
            returns: "Matrix",
            examples: &IDENTITY_EXAMPLES,
            category: "matrix/construct",
            related: &IDENTITY_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(CalcError::arg_count("identity", 1, args.len()));
        }

        let n = match extract_dimension(&args[0], "identity", "n") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        into_value(Matrix::identity(n), "identity")
    }
}

// ============ zeros ============

pub struct ZerosFn;

static ZEROS_ARGS: [ArgMeta; 2] = [
    ArgMeta {
        name: "rows",
        typ: "Number",
        description: "Number of rows",
        optional: false,
        default: None,
    },
    ArgMeta {
        name: "cols",
        typ: "Number",
        description: "Number of columns",
        optional: false,
        default: None,
    },
];

static ZEROS_EXAMPLES: [&str; 1] = ["zeros(2, 3) → 2×3 zero matrix"];

static ZEROS_RELATED: [&str; 2] = ["identity", "matrix"];

impl FunctionPlugin for ZerosFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "zeros",
            description: "Create matrix of zeros",
            usage: "zeros(rows, cols)",
            args: &ZEROS_ARGS,
            returns: "Matrix",
            examples: &ZEROS_EXAMPLES,
            category: "matrix/construct",
            related: &ZEROS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() != 2 {
            return Value::Error(CalcError::arg_count("zeros", 2, args.len()));
        }

        let rows = match extract_dimension(&args[0], "zeros", "rows") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        let cols = match extract_dimension(&args[1], "zeros", "cols") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        into_value(Matrix::zeros(rows, cols), "zeros")
    }
}
