//! Random forest classifier.

use std::collections::BTreeSet;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::ml::sparse::CsrMatrix;
use crate::ml::tree::DecisionTreeClassifier;

/// Number of features considered per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// Every feature.
    All,
    /// A fixed count, capped at the number of features.
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(n) => n.min(n_features),
        };
        n.max(1)
    }
}

/// Random forest configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the forest.
    pub n_estimators: usize,
    /// Fit each tree on a bootstrap sample of the rows.
    pub bootstrap: bool,
    /// Features considered per split.
    pub max_features: MaxFeatures,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            bootstrap: true,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

/// Bagged ensemble of fully grown decision trees.
///
/// Predictions average the per-tree class probabilities and take the most
/// probable class; on a tie the smaller class wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    /// Distinct classes seen at fit time, ascending.
    classes: Vec<u8>,
    n_features: usize,
    trees: Vec<DecisionTreeClassifier>,
}

/// Per-row draw counts of a bootstrap sample of size `n`.
fn bootstrap_weights<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    for _ in 0..n {
        weights[rng.random_range(0..n)] += 1.0;
    }
    weights
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            classes: Vec::new(),
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    pub fn trees(&self) -> &[DecisionTreeClassifier] {
        &self.trees
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fit the forest.
    ///
    /// One seed per tree is drawn from `rng` before the trees are grown in
    /// parallel, so the result does not depend on the thread count.
    pub fn fit<R: Rng + ?Sized>(&mut self, x: &CsrMatrix, y: &[u8], rng: &mut R) -> Result<()> {
        if x.num_rows() != y.len() {
            return Err(TriageError::training(format!(
                "{} feature rows but {} labels",
                x.num_rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(TriageError::training("cannot fit a forest on zero rows"));
        }
        if self.params.n_estimators == 0 {
            return Err(TriageError::training("n_estimators must be at least 1"));
        }

        let classes: Vec<u8> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.partition_point(|class| class < label))
            .collect();
        let n_classes = classes.len();
        let n_rows = y.len();
        let max_features = self.params.max_features.resolve(x.num_cols());
        let bootstrap = self.params.bootstrap;

        let seeds: Vec<u64> = (0..self.params.n_estimators)
            .map(|_| rng.random())
            .collect();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut tree_rng = StdRng::seed_from_u64(seed);
                let weights = if bootstrap {
                    bootstrap_weights(n_rows, &mut tree_rng)
                } else {
                    vec![1.0; n_rows]
                };
                DecisionTreeClassifier::fit(
                    x,
                    &encoded,
                    n_classes,
                    &weights,
                    max_features,
                    &mut tree_rng,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Grew {} trees over {} rows, {} features, {} classes (max depth {})",
            trees.len(),
            n_rows,
            x.num_cols(),
            n_classes,
            trees.iter().map(DecisionTreeClassifier::depth).max().unwrap_or(0)
        );

        self.classes = classes;
        self.n_features = x.num_cols();
        self.trees = trees;
        Ok(())
    }

    /// Mean class probabilities per row, columns ordered like [`classes`](Self::classes).
    pub fn predict_proba(&self, x: &CsrMatrix) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted() {
            return Err(TriageError::model("random forest is not fitted"));
        }
        if x.num_cols() != self.n_features {
            return Err(TriageError::model(format!(
                "input has {} features, forest was fitted on {}",
                x.num_cols(),
                self.n_features
            )));
        }

        let n_trees = self.trees.len() as f64;
        Ok((0..x.num_rows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mut proba = vec![0.0; self.classes.len()];
                for tree in &self.trees {
                    for (p, t) in proba.iter_mut().zip(tree.predict_proba_row(row)) {
                        *p += t;
                    }
                }
                proba.iter_mut().for_each(|p| *p /= n_trees);
                proba
            })
            .collect())
    }

    /// Most probable class per row.
    pub fn predict(&self, x: &CsrMatrix) -> Result<Vec<u8>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .iter()
            .map(|p| {
                let mut best = 0;
                for (k, &value) in p.iter().enumerate() {
                    if value > p[best] {
                        best = k;
                    }
                }
                self.classes[best]
            })
            .collect())
    }
}
