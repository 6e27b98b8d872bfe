//! The text classification pipeline: counts → TF-IDF → per-label forests.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::dataset::LabelMatrix;
use crate::error::Result;
use crate::ml::Estimator;
use crate::ml::feature_extraction::{CountVectorizer, TfidfTransformer};
use crate::ml::forest::ForestParams;
use crate::ml::multi_output::MultiOutputClassifier;

/// Tunable hyperparameters of [`TextClassificationPipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Trees per label forest.
    pub n_estimators: usize,
}

impl fmt::Display for PipelineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n_estimators={}", self.n_estimators)
    }
}

/// Vectorizer, TF-IDF weighting and a multi-output random forest, fitted
/// and applied as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassificationPipeline {
    vectorizer: CountVectorizer,
    tfidf: TfidfTransformer,
    classifier: MultiOutputClassifier,
}

impl TextClassificationPipeline {
    pub fn new(analyzer: Arc<dyn Analyzer>, forest: ForestParams) -> Self {
        Self {
            vectorizer: CountVectorizer::new(analyzer),
            tfidf: TfidfTransformer::new(),
            classifier: MultiOutputClassifier::new(forest),
        }
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn tfidf(&self) -> &TfidfTransformer {
        &self.tfidf
    }

    pub fn classifier(&self) -> &MultiOutputClassifier {
        &self.classifier
    }

    /// Reattach the analyzer after deserialization.
    pub fn attach_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.vectorizer.attach_analyzer(analyzer);
    }
}

impl Estimator for TextClassificationPipeline {
    type Params = PipelineParams;

    fn params(&self) -> PipelineParams {
        PipelineParams {
            n_estimators: self.classifier.params().n_estimators,
        }
    }

    fn set_params(&mut self, params: &PipelineParams) {
        let mut forest = self.classifier.params().clone();
        forest.n_estimators = params.n_estimators;
        self.classifier.set_params(forest);
    }

    fn fit(&mut self, texts: &[String], labels: &LabelMatrix, rng: &mut StdRng) -> Result<()> {
        let counts = self.vectorizer.fit_transform(texts)?;
        let features = self.tfidf.fit_transform(&counts)?;
        self.classifier.fit(&features, labels, rng)
    }

    fn predict(&self, texts: &[String]) -> Result<LabelMatrix> {
        let counts = self.vectorizer.transform(texts)?;
        let features = self.tfidf.transform(&counts)?;
        self.classifier.predict(&features)
    }
}
