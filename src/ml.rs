//! Machine learning for message classification.
//!
//! The model is assembled from small parts that mirror the classic text
//! classification stack:
//!
//! ```text
//! texts → CountVectorizer → TfidfTransformer → MultiOutputClassifier
//!                                                (RandomForestClassifier × labels)
//! ```
//!
//! [`build_model`] wraps that pipeline in a [`GridSearch`] over the forest
//! size. Everything here is deterministic given the `StdRng` passed to
//! `fit`.

pub mod feature_extraction;
pub mod forest;
pub mod metrics;
pub mod multi_output;
pub mod pipeline;
pub mod search;
pub mod sparse;
pub mod tree;

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, MessageAnalyzer};
use crate::dataset::LabelMatrix;
use crate::error::Result;
use crate::ml::forest::ForestParams;
use crate::ml::pipeline::{PipelineParams, TextClassificationPipeline};
use crate::ml::search::GridSearch;

/// A multi-output text classifier that can be tuned by [`GridSearch`].
pub trait Estimator: Clone + Send + Sync {
    /// One point of the hyperparameter grid.
    type Params: Clone + fmt::Debug + fmt::Display + Serialize + Send + Sync;

    /// Current hyperparameters.
    fn params(&self) -> Self::Params;

    /// Replace the hyperparameters. Takes effect at the next fit.
    fn set_params(&mut self, params: &Self::Params);

    /// Fit on `texts` and their label rows, discarding any previous fit.
    fn fit(&mut self, texts: &[String], labels: &LabelMatrix, rng: &mut StdRng) -> Result<()>;

    /// Predict one label row per text.
    fn predict(&self, texts: &[String]) -> Result<LabelMatrix>;

    /// Subset accuracy of the predictions for `texts`.
    fn score(&self, texts: &[String], labels: &LabelMatrix) -> Result<f64> {
        let predicted = self.predict(texts)?;
        metrics::subset_accuracy(labels, &predicted)
    }
}

/// Model and search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Forest sizes tried by the grid search.
    pub n_estimators_grid: Vec<usize>,
    /// Cross-validation folds per candidate.
    pub cv_folds: usize,
    /// Seed for the split, the search and the forests. `None` draws from
    /// the OS entropy source.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators_grid: vec![20, 30],
            cv_folds: 5,
            seed: None,
        }
    }
}

/// Build the untrained grid search over the text classification pipeline.
pub fn build_model(config: &ModelConfig) -> Result<GridSearch<TextClassificationPipeline>> {
    let analyzer: Arc<dyn Analyzer> = Arc::new(MessageAnalyzer::new()?);
    let pipeline = TextClassificationPipeline::new(analyzer, ForestParams::default());
    let grid = config
        .n_estimators_grid
        .iter()
        .map(|&n_estimators| PipelineParams { n_estimators })
        .collect();
    GridSearch::new(pipeline, grid, config.cv_folds)
}
