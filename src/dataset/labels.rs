//! Dense multi-output label matrix.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Row-major matrix of class labels, one column per category.
///
/// Cells are small non-negative integers (0/1 for binary categories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMatrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<u8>,
}

impl LabelMatrix {
    /// Create an all-zero matrix.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            values: vec![0; n_rows * n_cols],
        }
    }

    /// Build a matrix from rows that each hold `n_cols` labels.
    ///
    /// An empty `rows` gives a `0 x n_cols` matrix.
    pub fn from_rows(rows: &[Vec<u8>], n_cols: usize) -> Result<Self> {
        let mut values = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(TriageError::data(format!(
                    "label row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            n_rows: rows.len(),
            n_cols,
            values,
        })
    }

    /// Build a matrix from columns of equal length.
    pub fn from_columns(columns: &[Vec<u8>]) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((j, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != n_rows)
        {
            return Err(TriageError::data(format!(
                "label column {j} has {} rows, expected {n_rows}",
                column.len()
            )));
        }

        let mut matrix = Self::zeros(n_rows, columns.len());
        for (j, column) in columns.iter().enumerate() {
            for (i, &value) in column.iter().enumerate() {
                matrix.set(i, j, value);
            }
        }
        Ok(matrix)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.values[row * self.n_cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.values[row * self.n_cols + col] = value;
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.values[row * self.n_cols..(row + 1) * self.n_cols]
    }

    /// Copy out one column.
    pub fn column(&self, col: usize) -> Vec<u8> {
        (0..self.n_rows).map(|row| self.get(row, col)).collect()
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact(0) panics; a zero-column matrix has no cells to chunk.
        self.values.chunks_exact(self.n_cols.max(1))
    }

    /// Build a new matrix from the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut values = Vec::with_capacity(rows.len() * self.n_cols);
        for &row in rows {
            values.extend_from_slice(self.row(row));
        }
        Self {
            n_rows: rows.len(),
            n_cols: self.n_cols,
            values,
        }
    }
}
