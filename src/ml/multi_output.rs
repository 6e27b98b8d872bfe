//! One independent classifier per label column.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::ml::forest::{ForestParams, RandomForestClassifier};
use crate::ml::sparse::CsrMatrix;

/// Fits one random forest per label column on shared features.
///
/// Columns are fitted one after another; each forest parallelizes over its
/// own trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    params: ForestParams,
    estimators: Vec<RandomForestClassifier>,
}

impl MultiOutputClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            estimators: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Replace the forest configuration. Takes effect at the next fit.
    pub fn set_params(&mut self, params: ForestParams) {
        self.params = params;
    }

    /// Fitted forests, one per label column.
    pub fn estimators(&self) -> &[RandomForestClassifier] {
        &self.estimators
    }

    pub fn is_fitted(&self) -> bool {
        !self.estimators.is_empty()
    }

    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        x: &CsrMatrix,
        y: &LabelMatrix,
        rng: &mut R,
    ) -> Result<()> {
        if x.num_rows() != y.n_rows() {
            return Err(TriageError::training(format!(
                "{} feature rows but {} label rows",
                x.num_rows(),
                y.n_rows()
            )));
        }
        if y.n_cols() == 0 {
            return Err(TriageError::training("no label columns to fit"));
        }

        let mut estimators = Vec::with_capacity(y.n_cols());
        for column in 0..y.n_cols() {
            let mut forest = RandomForestClassifier::new(self.params.clone());
            forest.fit(x, &y.column(column), rng)?;
            debug!(
                "Fitted label column {}/{} (classes {:?})",
                column + 1,
                y.n_cols(),
                forest.classes()
            );
            estimators.push(forest);
        }

        self.estimators = estimators;
        Ok(())
    }

    /// Predict every label column.
    pub fn predict(&self, x: &CsrMatrix) -> Result<LabelMatrix> {
        if !self.is_fitted() {
            return Err(TriageError::model("multi-output classifier is not fitted"));
        }
        let columns = self
            .estimators
            .iter()
            .map(|forest| forest.predict(x))
            .collect::<Result<Vec<_>>>()?;
        LabelMatrix::from_columns(&columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_one_forest_per_column() {
        let x = CsrMatrix::from_rows(
            vec![vec![(0, 1.0)], vec![(1, 1.0)], vec![(0, 1.0)], vec![(1, 1.0)]],
            2,
        )
        .unwrap();
        let y = LabelMatrix::from_rows(&[vec![1, 0], vec![0, 0], vec![1, 0], vec![0, 0]], 2)
            .unwrap();
        let mut classifier = MultiOutputClassifier::new(ForestParams {
            n_estimators: 5,
            bootstrap: false,
            ..Default::default()
        });

        classifier.fit(&x, &y, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(classifier.estimators().len(), 2);
        assert_eq!(classifier.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_shape_mismatch() {
        let x = CsrMatrix::from_rows(vec![vec![(0, 1.0)]], 1).unwrap();
        let y = LabelMatrix::zeros(2, 1);
        let mut classifier = MultiOutputClassifier::new(ForestParams::default());

        assert!(classifier.fit(&x, &y, &mut StdRng::seed_from_u64(0)).is_err());
        assert!(classifier.predict(&x).is_err());
    }
}
