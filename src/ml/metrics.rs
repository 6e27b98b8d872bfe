//! Classification metrics.
//!
//! [`ClassificationReport`] renders the familiar per-class table:
//!
//! ```text
//!               precision    recall  f1-score   support
//!
//!            0       0.92      0.97      0.94       152
//!            1       0.75      0.50      0.60        28
//!
//!     accuracy                           0.90       180
//!    macro avg       0.83      0.74      0.77       180
//! weighted avg       0.89      0.90      0.89       180
//! ```
//!
//! Ratios whose denominator is zero are reported as 0.0.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};

/// Fraction of rows whose every label is predicted correctly.
pub fn subset_accuracy(expected: &LabelMatrix, predicted: &LabelMatrix) -> Result<f64> {
    if expected.shape() != predicted.shape() {
        return Err(TriageError::other(format!(
            "label shapes differ: {:?} vs {:?}",
            expected.shape(),
            predicted.shape()
        )));
    }
    if expected.n_rows() == 0 {
        return Err(TriageError::other("cannot score zero rows"));
    }

    let correct = expected
        .rows()
        .zip(predicted.rows())
        .filter(|(e, p)| e == p)
        .count();
    Ok(correct as f64 / expected.n_rows() as f64)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Precision, recall and F1 for one class or one average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class report for a single label column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// One entry per class present in either the truth or the predictions.
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Compare expected and predicted classes of one column.
    pub fn new(expected: &[u8], predicted: &[u8]) -> Result<Self> {
        if expected.len() != predicted.len() {
            return Err(TriageError::other(format!(
                "{} expected labels but {} predictions",
                expected.len(),
                predicted.len()
            )));
        }
        if expected.is_empty() {
            return Err(TriageError::other("cannot report on zero rows"));
        }

        let labels: BTreeSet<u8> = expected.iter().chain(predicted).copied().collect();
        let classes: Vec<ClassMetrics> = labels
            .iter()
            .map(|&label| {
                let mut tp = 0;
                let mut predicted_count = 0;
                let mut support = 0;
                for (&e, &p) in expected.iter().zip(predicted) {
                    if e == label {
                        support += 1;
                    }
                    if p == label {
                        predicted_count += 1;
                        if e == label {
                            tp += 1;
                        }
                    }
                }
                let precision = ratio(tp, predicted_count);
                let recall = ratio(tp, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let total = expected.len();
        let correct = expected.iter().zip(predicted).filter(|(e, p)| e == p).count();
        let n = classes.len() as f64;

        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n,
            support: total,
        };
        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            classes
                .iter()
                .map(|c| metric(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1_score: weighted(|c| c.f1_score),
            support: total,
        };

        Ok(Self {
            accuracy: ratio(correct, total),
            classes,
            macro_avg,
            weighted_avg,
        })
    }

    /// Total number of rows.
    pub fn support(&self) -> usize {
        self.weighted_avg.support
    }
}

const NAME_WIDTH: usize = 12;

fn write_row(f: &mut fmt::Formatter<'_>, row: &ClassMetrics, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        row.label, row.precision, row.recall, row.f1_score, row.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .max()
            .unwrap_or(0)
            .max(NAME_WIDTH);

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            write_row(f, class, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        write_row(f, &self.macro_avg, width)?;
        write_row(f, &self.weighted_avg, width)
    }
}
