//! Grid input and output
//!
//! Turns the text a user typed into cells into a [`Matrix`] and renders a
//! matrix back as an aligned block of fixed-decimal numbers.

use gridcalc_core::{format_grid, parse_cell};
use crate::error::MatrixError;
use crate::types::Matrix;

pub use gridcalc_core::{CellPolicy, format_decimal as format_number};

/// Parse one cell, reporting its position on failure
pub fn parse_grid_cell(text: &str, row: usize, col: usize, policy: CellPolicy) -> Result<f64, MatrixError> {
    parse_cell(text, policy).map_err(|_| MatrixError::InvalidCell {
        row,
        col,
        text: text.trim().to_string(),
    })
}

/// Parse a grid of cell texts into a matrix
pub fn parse_grid<R, C>(rows: R, policy: CellPolicy) -> Result<Matrix, MatrixError>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    let mut data = Vec::new();
    for (i, row) in rows.into_iter().enumerate() {
        let parsed = row.into_iter()
            .enumerate()
            .map(|(j, cell)| parse_grid_cell(cell.as_ref(), i, j, policy))
            .collect::<Result<Vec<f64>, _>>()?;
        data.push(parsed);
    }
    Matrix::from_rows(data)
}

/// Parse a pasted block of numbers.
///
/// Rows are separated by newlines or `;`. Within a row, cells are split on
/// commas when the row has any (empty cells are kept), otherwise on
/// whitespace. Blank rows are skipped.
pub fn parse_text(block: &str, policy: CellPolicy) -> Result<Matrix, MatrixError> {
    let rows: Vec<Vec<&str>> = block
        .split(['\n', ';'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(split_cells)
        .collect();
    parse_grid(rows, policy)
}

fn split_cells(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

/// Render a matrix as right-aligned columns, one line per row
pub fn format_matrix(m: &Matrix, places: u32) -> String {
    format_grid(m.as_rows(), places)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        let m = parse_grid([["1", "2"], ["3", "4.5"]], CellPolicy::Strict).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.5]]);
    }

    #[test]
    fn test_lenient_coerces_to_zero() {
        let m = parse_grid([["1", "x"], ["", "4"]], CellPolicy::Lenient).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 0.0], vec![0.0, 4.0]]);
    }

    #[test]
    fn test_strict_reports_position() {
        let err = parse_grid([["1", "2"], ["3", " abc "]], CellPolicy::Strict).unwrap_err();
        assert_eq!(err, MatrixError::InvalidCell { row: 1, col: 1, text: "abc".to_string() });
    }

    #[test]
    fn test_ragged_grid() {
        let rows = vec![vec!["1", "2"], vec!["3"]];
        assert!(matches!(parse_grid(rows, CellPolicy::Lenient), Err(MatrixError::Ragged { row: 1, .. })));
    }

    #[test]
    fn test_parse_text_whitespace_and_semicolons() {
        let m = parse_text("1 2; 3 4\n\n5 6", CellPolicy::Strict).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
    }

    #[test]
    fn test_parse_text_commas_keep_empty_cells() {
        let m = parse_text("1, ,3\n4,5,6", CellPolicy::Lenient).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 0.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert!(parse_text("1, ,3\n4,5,6", CellPolicy::Strict).is_err());
    }

    #[test]
    fn test_parse_text_empty() {
        assert_eq!(parse_text("  \n ; ", CellPolicy::Lenient), Err(MatrixError::Empty));
    }

    #[test]
    fn test_parse_non_finite_cells() {
        let m = parse_text("NaN inf", CellPolicy::Strict).unwrap();
        assert!(m[(0, 0)].is_nan());
        assert_eq!(m[(0, 1)], f64::INFINITY);
    }

    #[test]
    fn test_format_matrix() {
        let m = Matrix::from_rows(vec![vec![-2.0, 1.0], vec![1.5, -0.5]]).unwrap();
        assert_eq!(format_matrix(&m, 2), "-2.00   1.00\n 1.50  -0.50");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(-0.0, 2), "0.00");
        assert_eq!(format_number(f64::INFINITY, 2), "∞");
    }
}
