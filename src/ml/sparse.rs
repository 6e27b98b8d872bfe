//! Compressed Sparse Row (CSR) matrix for document-term features.
//!
//! Text features are extremely sparse: a message touches a handful of
//! terms out of a vocabulary of thousands. CSR stores only the non-zero
//! cells, row by row, which is the access pattern of both the vectorizer
//! (one document at a time) and tree traversal (one sample at a time).
//!
//! # Structure
//!
//! - `values`: non-zero values, stored row by row
//! - `col_indices`: column index for each value, ascending within a row
//! - `row_ptrs`: start of each row in `values`/`col_indices`
//!
//! For row `i`, the cells are `values[row_ptrs[i]..row_ptrs[i + 1]]` in
//! columns `col_indices[row_ptrs[i]..row_ptrs[i + 1]]`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Compressed Sparse Row matrix of `f64` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    values: Vec<f64>,
    col_indices: Vec<usize>,
    /// Length is `num_rows + 1`, with `row_ptrs[num_rows] = nnz`.
    row_ptrs: Vec<usize>,
    num_cols: usize,
}

/// Borrowed view of one CSR row.
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    pub indices: &'a [usize],
    pub values: &'a [f64],
}

impl SparseRow<'_> {
    /// Value at `col`, zero when the cell is not stored.
    pub fn get(&self, col: usize) -> f64 {
        match self.indices.binary_search(&col) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Iterate over stored `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of stored cells.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }
}

impl CsrMatrix {
    /// Create an empty matrix with `num_cols` columns and no rows.
    pub fn empty(num_cols: usize) -> Self {
        Self {
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0],
            num_cols,
        }
    }

    /// Build a matrix from per-row `(column, value)` lists.
    ///
    /// Entries of a row are sorted by column; zero values are dropped.
    /// Duplicate columns within a row and out-of-range columns are errors.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, num_cols: usize) -> Result<Self> {
        let mut matrix = Self::empty(num_cols);
        for (i, mut row) in rows.into_iter().enumerate() {
            row.sort_unstable_by_key(|&(col, _)| col);
            for pair in row.windows(2) {
                if pair[0].0 == pair[1].0 {
                    return Err(TriageError::data(format!(
                        "row {i} has duplicate column {}",
                        pair[0].0
                    )));
                }
            }
            if let Some(&(col, _)) = row.last() {
                if col >= num_cols {
                    return Err(TriageError::data(format!(
                        "row {i} has column {col}, matrix has {num_cols} columns"
                    )));
                }
            }
            matrix.push_sorted_row(row.into_iter().filter(|&(_, value)| value != 0.0));
        }
        Ok(matrix)
    }

    /// Append a row whose entries are already sorted by column.
    fn push_sorted_row(&mut self, entries: impl IntoIterator<Item = (usize, f64)>) {
        for (col, value) in entries {
            self.col_indices.push(col);
            self.values.push(value);
        }
        self.row_ptrs.push(self.values.len());
    }

    pub fn num_rows(&self) -> usize {
        self.row_ptrs.len() - 1
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored (non-zero) cells.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> SparseRow<'_> {
        let range = self.row_ptrs[i]..self.row_ptrs[i + 1];
        SparseRow {
            indices: &self.col_indices[range.clone()],
            values: &self.values[range],
        }
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = SparseRow<'_>> + '_ {
        (0..self.num_rows()).map(move |i| self.row(i))
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row).get(col)
    }

    /// Build a new matrix from the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut selected = Self::empty(self.num_cols);
        for &i in rows {
            selected.push_sorted_row(self.row(i).iter());
        }
        selected
    }

    /// Number of rows with a stored value, per column.
    pub fn column_nnz(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_cols];
        for &col in &self.col_indices {
            counts[col] += 1;
        }
        counts
    }

    /// Multiply every stored value by its column's factor.
    pub fn scale_columns(&mut self, factors: &[f64]) {
        for (value, &col) in self.values.iter_mut().zip(&self.col_indices) {
            *value *= factors[col];
        }
    }

    /// Scale every row to unit Euclidean length. All-zero rows stay zero.
    pub fn normalize_rows_l2(&mut self) {
        for i in 0..self.num_rows() {
            let range = self.row_ptrs[i]..self.row_ptrs[i + 1];
            let row = &mut self.values[range];
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|v| *v /= norm);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CsrMatrix {
        CsrMatrix::from_rows(
            vec![
                vec![(2, 1.0), (0, 3.0)],
                vec![],
                vec![(1, 4.0), (2, 0.0)],
            ],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_rows_are_sorted_and_zeros_dropped() {
        let m = matrix();

        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(0).indices, &[0, 2]);
        assert_eq!(m.row(0).values, &[3.0, 1.0]);
        assert_eq!(m.row(1).nnz(), 0);
        assert_eq!(m.get(2, 1), 4.0);
        assert_eq!(m.get(2, 2), 0.0);
    }

    #[test]
    fn test_invalid_rows_are_rejected() {
        assert!(CsrMatrix::from_rows(vec![vec![(0, 1.0), (0, 2.0)]], 2).is_err());
        assert!(CsrMatrix::from_rows(vec![vec![(5, 1.0)]], 2).is_err());
    }

    #[test]
    fn test_select_rows() {
        let selected = matrix().select_rows(&[2, 0, 2]);

        assert_eq!(selected.num_rows(), 3);
        assert_eq!(selected.get(0, 1), 4.0);
        assert_eq!(selected.get(1, 0), 3.0);
        assert_eq!(selected.row(2).indices, &[1]);
    }

    #[test]
    fn test_column_nnz_and_scaling() {
        let mut m = matrix();
        assert_eq!(m.column_nnz(), vec![1, 1, 1]);

        m.scale_columns(&[2.0, 0.5, 1.0]);
        assert_eq!(m.get(0, 0), 6.0);
        assert_eq!(m.get(2, 1), 2.0);
    }

    #[test]
    fn test_l2_normalization() {
        let mut m = CsrMatrix::from_rows(vec![vec![(0, 3.0), (1, 4.0)], vec![]], 2).unwrap();
        m.normalize_rows_l2();

        assert!((m.get(0, 0) - 0.6).abs() < 1e-12);
        assert!((m.get(0, 1) - 0.8).abs() < 1e-12);
        assert_eq!(m.row(1).nnz(), 0);
    }
}
