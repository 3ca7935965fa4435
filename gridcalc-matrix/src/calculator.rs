//! Matrix calculator state
//!
//! A [`MatrixCalculator`] holds two operand grids and a scalar, the way a
//! calculator screen does. Editing a cell or resizing a grid replaces the
//! operand with a new [`Matrix`]; operations never touch the operands.

use std::fmt;
use std::str::FromStr;
use gridcalc_core::{format_decimal, Value, DEFAULT_PLACES, MAX_PLACES};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::MatrixError;
use crate::grid::{format_matrix, parse_grid_cell, CellPolicy};
use crate::inverse::{inverse, Inverse};
use crate::ops::{add, multiply, scalar_multiply, subtract, transpose};
use crate::props::{determinant, trace};
use crate::types::Matrix;

/// Operand slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    A,
    B,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::A => write!(f, "A"),
            Operand::B => write!(f, "B"),
        }
    }
}

/// Calculator operation. Unary operations act on operand A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    ScalarMultiply,
    Transpose,
    Determinant,
    Trace,
    Inverse,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::ScalarMultiply,
        Operation::Transpose,
        Operation::Determinant,
        Operation::Trace,
        Operation::Inverse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::ScalarMultiply => "scalar_multiply",
            Operation::Transpose => "transpose",
            Operation::Determinant => "determinant",
            Operation::Trace => "trace",
            Operation::Inverse => "inverse",
        }
    }

    /// Whether the operation reads operand B
    pub fn is_binary(&self) -> bool {
        matches!(self, Operation::Add | Operation::Subtract | Operation::Multiply)
    }
}

impl FromStr for Operation {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(Operation::Add),
            "subtract" | "sub" => Ok(Operation::Subtract),
            "multiply" | "mul" => Ok(Operation::Multiply),
            "scale" | "scalar_multiply" => Ok(Operation::ScalarMultiply),
            "transpose" => Ok(Operation::Transpose),
            "determinant" | "det" => Ok(Operation::Determinant),
            "trace" => Ok(Operation::Trace),
            "inverse" | "inv" => Ok(Operation::Inverse),
            _ => Err(MatrixError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an operation produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matrix(Matrix),
    Scalar(f64),
    Singular,
}

impl Outcome {
    pub fn render(&self, places: u32) -> String {
        match self {
            Outcome::Matrix(m) => format_matrix(m, places),
            Outcome::Scalar(x) => format_decimal(*x, places),
            Outcome::Singular => "Matrix is singular (no inverse)".to_string(),
        }
    }
}

impl From<Inverse> for Outcome {
    fn from(inv: Inverse) -> Self {
        match inv {
            Inverse::Invertible(m) => Outcome::Matrix(m),
            Inverse::Singular => Outcome::Singular,
        }
    }
}

impl From<Outcome> for Value {
    fn from(outcome: Outcome) -> Value {
        match outcome {
            Outcome::Matrix(m) => m.into(),
            Outcome::Scalar(x) => Value::Number(x),
            Outcome::Singular => Value::singular(),
        }
    }
}

/// Two-operand matrix calculator
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCalculator {
    a: Matrix,
    b: Matrix,
    scalar: f64,
    policy: CellPolicy,
    places: u32,
}

impl MatrixCalculator {
    /// Both operands start as `rows × cols` zero matrices
    pub fn new(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        Ok(Self {
            a: Matrix::zeros(rows, cols)?,
            b: Matrix::zeros(rows, cols)?,
            scalar: 1.0,
            policy: CellPolicy::default(),
            places: DEFAULT_PLACES,
        })
    }

    pub fn with_policy(mut self, policy: CellPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Display precision, clamped to `MAX_PLACES`
    pub fn with_places(mut self, places: u32) -> Self {
        self.places = places.min(MAX_PLACES);
        self
    }

    pub fn operand(&self, which: Operand) -> &Matrix {
        match which {
            Operand::A => &self.a,
            Operand::B => &self.b,
        }
    }

    pub fn set_operand(&mut self, which: Operand, m: Matrix) {
        *self.slot(which) = m;
    }

    fn slot(&mut self, which: Operand) -> &mut Matrix {
        match which {
            Operand::A => &mut self.a,
            Operand::B => &mut self.b,
        }
    }

    /// Parse `text` into one cell of an operand
    pub fn set_cell(&mut self, which: Operand, row: usize, col: usize, text: &str) -> Result<(), MatrixError> {
        let value = parse_grid_cell(text, row, col, self.policy)?;
        let updated = self.operand(which).with_entry(row, col, value)?;
        self.set_operand(which, updated);
        Ok(())
    }

    /// Resize an operand, keeping overlapping cells
    pub fn resize(&mut self, which: Operand, rows: usize, cols: usize) -> Result<(), MatrixError> {
        let resized = self.operand(which).resized(rows, cols)?;
        self.set_operand(which, resized);
        Ok(())
    }

    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    pub fn set_scalar(&mut self, k: f64) {
        self.scalar = k;
    }

    pub fn policy(&self) -> CellPolicy {
        self.policy
    }

    pub fn places(&self) -> u32 {
        self.places
    }

    pub fn run(&self, op: Operation) -> Result<Outcome, MatrixError> {
        debug!(
            op = %op,
            a = %self.a.dims(),
            b = %self.b.dims(),
            binary = op.is_binary(),
            "running matrix operation"
        );

        let a = &self.a;
        let outcome = match op {
            Operation::Add => Outcome::Matrix(add(a, &self.b)?),
            Operation::Subtract => Outcome::Matrix(subtract(a, &self.b)?),
            Operation::Multiply => Outcome::Matrix(multiply(a, &self.b)?),
            Operation::ScalarMultiply => Outcome::Matrix(scalar_multiply(a, self.scalar)),
            Operation::Transpose => Outcome::Matrix(transpose(a)),
            Operation::Determinant => Outcome::Scalar(determinant(a)?),
            Operation::Trace => Outcome::Scalar(trace(a)?),
            Operation::Inverse => inverse(a)?.into(),
        };
        Ok(outcome)
    }

    /// Run and render with the calculator's precision
    pub fn run_rendered(&self, op: Operation) -> Result<String, MatrixError> {
        self.run(op).map(|o| o.render(self.places))
    }
}
