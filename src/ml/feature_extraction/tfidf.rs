//! TF-IDF reweighting of term counts.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::ml::sparse::CsrMatrix;

/// Reweights term counts by smoothed inverse document frequency and scales
/// each row to unit L2 norm.
///
/// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, where `n` is the number of
/// fitted documents and `df(t)` the number of them containing `t`. The
/// smoothing behaves as if one extra document contained every term once,
/// so no weight is ever zero or infinite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfTransformer {
    idf: Vec<f64>,
}

impl TfidfTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learned IDF weights, one per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    /// Learn IDF weights from a count matrix.
    pub fn fit(&mut self, counts: &CsrMatrix) -> Result<()> {
        let n = counts.num_rows() as f64;
        self.idf = counts
            .column_nnz()
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        Ok(())
    }

    /// Apply the learned weights and normalize rows.
    pub fn transform(&self, counts: &CsrMatrix) -> Result<CsrMatrix> {
        if !self.is_fitted() {
            return Err(TriageError::model("tf-idf transformer is not fitted"));
        }
        if counts.num_cols() != self.idf.len() {
            return Err(TriageError::model(format!(
                "count matrix has {} columns, tf-idf was fitted on {}",
                counts.num_cols(),
                self.idf.len()
            )));
        }

        let mut weighted = counts.clone();
        weighted.scale_columns(&self.idf);
        weighted.normalize_rows_l2();
        Ok(weighted)
    }

    pub fn fit_transform(&mut self, counts: &CsrMatrix) -> Result<CsrMatrix> {
        self.fit(counts)?;
        self.transform(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> CsrMatrix {
        // term 0 in every document, term 1 in one of three
        CsrMatrix::from_rows(
            vec![
                vec![(0, 1.0), (1, 2.0)],
                vec![(0, 1.0)],
                vec![(0, 3.0)],
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_smoothed_idf() {
        let mut tfidf = TfidfTransformer::new();
        tfidf.fit(&counts()).unwrap();

        assert!((tfidf.idf()[0] - 1.0).abs() < 1e-12);
        assert!((tfidf.idf()[1] - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_have_unit_norm() {
        let mut tfidf = TfidfTransformer::new();
        let weighted = tfidf.fit_transform(&counts()).unwrap();

        for row in weighted.rows() {
            let norm: f64 = row.values.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
        // a lone term normalizes to 1 regardless of its count
        assert!((weighted.get(2, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let mut tfidf = TfidfTransformer::new();
        let weighted = tfidf.fit_transform(&counts()).unwrap();

        assert!(weighted.get(0, 1) > weighted.get(0, 0));
    }

    #[test]
    fn test_column_mismatch() {
        let mut tfidf = TfidfTransformer::new();
        tfidf.fit(&counts()).unwrap();

        let other = CsrMatrix::from_rows(vec![vec![(2, 1.0)]], 3).unwrap();
        assert!(tfidf.transform(&other).is_err());
        assert!(TfidfTransformer::new().transform(&counts()).is_err());
    }
}
