//! The training run: load → train → evaluate → save.
//!
//! Each stage consumes the previous one, so the stages can only run in
//! order:
//!
//! ```text
//! LoadedRun ──train──▶ TrainedRun ──save──▶ SavedRun
//!                        │
//!                        └─evaluate─▶ Evaluation
//! ```
//!
//! Any error aborts the run; nothing is retried.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::dataset::{MessageDataset, load_messages, train_test_split};
use crate::error::Result;
use crate::ml::metrics::ClassificationReport;
use crate::ml::pipeline::TextClassificationPipeline;
use crate::ml::search::GridSearch;
use crate::model::{ModelArtifact, ModelMetadata};
use crate::util::seeded_rng;

/// Messages loaded and ready to train on.
#[derive(Debug)]
pub struct LoadedRun {
    config: TrainingConfig,
    dataset: MessageDataset,
    rng: StdRng,
}

impl LoadedRun {
    /// Validate `config` and load the message store at `database`.
    pub fn load<P: AsRef<Path>>(database: P, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let dataset = load_messages(database, &config.loader)?;
        Self::from_dataset(dataset, config)
    }

    /// Start a run from messages that are already in memory.
    pub fn from_dataset(dataset: MessageDataset, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let rng = seeded_rng(config.model.seed);
        Ok(Self {
            config,
            dataset,
            rng,
        })
    }

    pub fn dataset(&self) -> &MessageDataset {
        &self.dataset
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Split the messages and fit `search` on the training side.
    pub fn train(mut self, mut search: GridSearch<TextClassificationPipeline>) -> Result<TrainedRun> {
        let (train, test) = train_test_split(&self.dataset, self.config.test_size, &mut self.rng)?;
        info!(
            "Training on {} messages, holding out {} for evaluation",
            train.len(),
            test.len()
        );

        search.fit(&train.messages, &train.labels, &mut self.rng)?;

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            crate_version: crate::VERSION.to_string(),
            train_rows: train.len(),
            test_rows: test.len(),
            seed: self.config.model.seed,
        };
        let artifact = ModelArtifact::from_search(search, train.label_names, metadata)?;

        Ok(TrainedRun { artifact, test })
    }
}

/// Report for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub report: ClassificationReport,
}

/// Held-out performance, one report per category in label column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub categories: Vec<CategoryReport>,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.categories {
            writeln!(f, "{} {}", entry.category, entry.report)?;
        }
        Ok(())
    }
}

/// A fitted model and the rows held out from it.
#[derive(Debug)]
pub struct TrainedRun {
    artifact: ModelArtifact,
    test: MessageDataset,
}

impl TrainedRun {
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn test_set(&self) -> &MessageDataset {
        &self.test
    }

    /// Score the model on the held-out rows, category by category.
    pub fn evaluate(&self) -> Result<Evaluation> {
        let predicted = self.artifact.predict(&self.test.messages)?;

        let categories = self
            .test
            .label_names
            .iter()
            .enumerate()
            .map(|(column, category)| {
                let report = ClassificationReport::new(
                    &self.test.labels.column(column),
                    &predicted.column(column),
                )?;
                Ok(CategoryReport {
                    category: category.clone(),
                    report,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Evaluation { categories })
    }

    /// Persist the model to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<SavedRun> {
        let path = path.as_ref().to_path_buf();
        self.artifact.save(&path)?;
        Ok(SavedRun {
            path,
            artifact: self.artifact,
        })
    }
}

/// A model that has been written to disk.
#[derive(Debug)]
pub struct SavedRun {
    path: PathBuf,
    artifact: ModelArtifact,
}

impl SavedRun {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}
