//! Core matrix type

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use gridcalc_core::{format_decimal, Value, MATRIX_TAG};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use crate::error::MatrixError;

/// Shape of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

impl Dimensions {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn transposed(&self) -> Self {
        Self { rows: self.cols, cols: self.rows }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.cols)
    }
}

/// Rectangular matrix of `f64`, stored as rows.
///
/// Every row has the same length and there is at least one row and one
/// column. The fields are private so that invariant cannot be broken after
/// construction; operations return new matrices rather than editing one in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    data: Vec<Vec<f64>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a matrix from rows, validating shape
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let cols = match data.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(MatrixError::Empty),
        };

        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::Ragged { row: i, len: row.len(), expected: cols });
            }
        }

        Ok(Self::from_rows_unchecked(data))
    }

    /// Build a `rows × cols` matrix from a function of (row, col)
    pub fn from_fn(rows: usize, cols: usize, f: impl FnMut(usize, usize) -> f64) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::Empty);
        }
        Ok(Self::build(rows, cols, f))
    }

    pub fn identity(n: usize) -> Result<Self, MatrixError> {
        Self::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        Self::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self, MatrixError> {
        Self::from_fn(rows, cols, |_, _| value)
    }

    /// Callers guarantee `rows >= 1` and `cols >= 1`.
    pub(crate) fn build(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| f(i, j)).collect())
            .collect();
        Self { data, rows, cols }
    }

    /// Callers guarantee the data is non-empty and rectangular.
    pub(crate) fn from_rows_unchecked(data: Vec<Vec<f64>>) -> Self {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        debug_assert!(rows > 0 && cols > 0);
        debug_assert!(data.iter().all(|r| r.len() == cols));
        Self { data, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> Dimensions {
        Dimensions::new(self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.data.get(row).map(Vec::as_slice)
    }

    pub fn as_rows(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.clone()
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.data
    }

    /// Copy of this matrix with one entry replaced
    pub fn with_entry(&self, row: usize, col: usize, value: f64) -> Result<Self, MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::OutOfBounds { row, col, dims: self.dims() });
        }
        let mut data = self.data.clone();
        data[row][col] = value;
        Ok(Self { data, ..*self })
    }

    /// Copy of this matrix at a new size; overlapping entries are kept and
    /// new entries are zero
    pub fn resized(&self, rows: usize, cols: usize) -> Result<Self, MatrixError> {
        Self::from_fn(rows, cols, |i, j| self.get(i, j).unwrap_or(0.0))
    }

    /// Apply `f` to every entry
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::build(self.rows, self.cols, |i, j| f(self.data[i][j]))
    }

    /// Combine two same-shaped matrices entry by entry.
    /// Callers check the shapes first.
    pub(crate) fn zip_with(&self, other: &Matrix, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        debug_assert_eq!(self.dims(), other.dims());
        Self::build(self.rows, self.cols, |i, j| f(self.data[i][j], other.data[i][j]))
    }

    /// Same shape and every entry within `tol`
    pub fn approx_eq(&self, other: &Matrix, tol: f64) -> bool {
        self.dims() == other.dims()
            && self.data.iter().flatten()
                .zip(other.data.iter().flatten())
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// Convert to nalgebra DMatrix
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rows, self.cols, |i, j| self.data[i][j])
    }

    /// Create from nalgebra DMatrix
    pub fn from_dmatrix(m: &DMatrix<f64>) -> Result<Self, MatrixError> {
        Self::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
    }

    /// Convert to Value
    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row][col]
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = MatrixError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Matrix::from_rows(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.into_rows()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", format_decimal(*val, 4))?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Convert Matrix to a tagged Value object
impl From<Matrix> for Value {
    fn from(m: Matrix) -> Value {
        let mut obj = HashMap::new();
        obj.insert("type".to_string(), Value::Text(MATRIX_TAG.to_string()));
        obj.insert("rows".to_string(), Value::Number(m.rows as f64));
        obj.insert("cols".to_string(), Value::Number(m.cols as f64));
        obj.insert("data".to_string(), Value::from(m.into_rows()));
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_matrix_creation() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(a.rows(), 2);
        assert_eq!(a.cols(), 3);
        assert_eq!(a.dims(), Dimensions::new(2, 3));
        assert!(!a.is_square());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Matrix::from_rows(vec![]), Err(MatrixError::Empty));
        assert_eq!(Matrix::from_rows(vec![vec![]]), Err(MatrixError::Empty));
        assert_eq!(Matrix::zeros(0, 3), Err(MatrixError::Empty));
    }

    #[test]
    fn test_ragged_rejected() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err, MatrixError::Ragged { row: 1, len: 1, expected: 2 });
    }

    #[test]
    fn test_matrix_get() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(a.get(0, 0), Some(1.0));
        assert_eq!(a.get(1, 1), Some(4.0));
        assert_eq!(a.get(2, 2), None);
        assert_eq!(a[(1, 0)], 3.0);
        assert_eq!(a.row(1), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn test_identity() {
        let i = Matrix::identity(3).unwrap();
        assert_eq!(i.get(1, 1), Some(1.0));
        assert_eq!(i.get(0, 2), Some(0.0));
    }

    #[test]
    fn test_with_entry_leaves_original() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = a.with_entry(0, 1, 9.0).unwrap();
        assert_eq!(a.get(0, 1), Some(2.0));
        assert_eq!(b.get(0, 1), Some(9.0));
        assert!(matches!(a.with_entry(2, 0, 1.0), Err(MatrixError::OutOfBounds { .. })));
    }

    #[test]
    fn test_resized_keeps_overlap() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let grown = a.resized(3, 3).unwrap();
        assert_eq!(grown.to_rows(), vec![
            vec![1.0, 2.0, 0.0],
            vec![3.0, 4.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ]);
        let shrunk = a.resized(1, 2).unwrap();
        assert_eq!(shrunk.to_rows(), vec![vec![1.0, 2.0]]);
        assert_eq!(a.resized(0, 2), Err(MatrixError::Empty));
    }

    #[test]
    fn test_dmatrix_round_trip() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let d = a.to_dmatrix();
        assert_eq!(d[(1, 2)], 6.0);
        assert_eq!(Matrix::from_dmatrix(&d).unwrap(), a);
    }

    #[test]
    fn test_display() {
        let a = m(vec![vec![1.0, 2.5], vec![-3.0, 4.0]]);
        assert_eq!(a.to_string(), "[[1.0000, 2.5000], [-3.0000, 4.0000]]");
    }

    #[test]
    fn test_to_value() {
        let a = m(vec![vec![1.0, 2.0]]);
        let v = a.to_value();
        assert_eq!(v.tag(), Some(MATRIX_TAG));
        assert_eq!(v.get("cols").as_number(), Some(2.0));
        assert_eq!(v.matrix_rows(), Some(vec![vec![1.0, 2.0]]));
    }

    #[test]
    fn test_serde_validates_shape() {
        let a: Matrix = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(a.dims(), Dimensions::new(2, 2));
        assert!(serde_json::from_str::<Matrix>("[[1, 2], [3]]").is_err());
        assert_eq!(serde_json::to_string(&a).unwrap(), "[[1.0,2.0],[3.0,4.0]]");
    }
}
