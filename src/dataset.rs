//! Labeled message data: loading, label storage and splitting.
//!
//! - [`loader`] reads the message table out of the SQLite store
//! - [`labels`] holds the dense per-category label matrix
//! - [`split`] partitions a dataset into train and test rows

pub mod labels;
pub mod loader;
pub mod split;

pub use labels::LabelMatrix;
pub use loader::{LabelSelection, LoaderConfig, load_messages};
pub use split::train_test_split;

use crate::error::{Result, TriageError};

/// Message texts aligned with their category labels.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDataset {
    /// One text per row.
    pub messages: Vec<String>,
    /// Category names, one per label column, in table order.
    pub label_names: Vec<String>,
    /// Row-aligned label matrix.
    pub labels: LabelMatrix,
}

impl MessageDataset {
    /// Create a dataset, checking that texts and labels line up.
    pub fn new(
        messages: Vec<String>,
        label_names: Vec<String>,
        labels: LabelMatrix,
    ) -> Result<Self> {
        if messages.len() != labels.n_rows() {
            return Err(TriageError::data(format!(
                "{} messages but {} label rows",
                messages.len(),
                labels.n_rows()
            )));
        }
        if label_names.len() != labels.n_cols() {
            return Err(TriageError::data(format!(
                "{} label names but {} label columns",
                label_names.len(),
                labels.n_cols()
            )));
        }

        Ok(Self {
            messages,
            label_names,
            labels,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Build a new dataset from the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            messages: rows.iter().map(|&i| self.messages[i].clone()).collect(),
            label_names: self.label_names.clone(),
            labels: self.labels.select_rows(rows),
        }
    }
}
