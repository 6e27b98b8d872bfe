//! The persisted model artifact.
//!
//! An artifact is a single bincode file: a `u32` format version followed
//! by the serialized [`ModelArtifact`]. Loading checks the version before
//! touching the rest of the file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::MessageAnalyzer;
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::ml::Estimator;
use crate::ml::pipeline::{PipelineParams, TextClassificationPipeline};
use crate::ml::search::{CandidateResult, GridSearch};

/// Version of the on-disk layout. Bumped on any incompatible change.
pub const FORMAT_VERSION: u32 = 1;

/// Facts about the run that produced an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    /// Version of the crate that wrote the artifact.
    pub crate_version: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: Option<u64>,
}

/// A fitted model together with what is needed to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Category names, in prediction column order.
    pub label_names: Vec<String>,
    pub best_params: PipelineParams,
    pub cv_results: Vec<CandidateResult<PipelineParams>>,
    pub metadata: ModelMetadata,
    pipeline: TextClassificationPipeline,
}

impl ModelArtifact {
    /// Package the refitted best estimator of a finished search.
    pub fn from_search(
        search: GridSearch<TextClassificationPipeline>,
        label_names: Vec<String>,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        let cv_results = search.cv_results().to_vec();
        let pipeline = search.into_best_estimator()?;
        Ok(Self {
            label_names,
            best_params: pipeline.params(),
            cv_results,
            metadata,
            pipeline,
        })
    }

    pub fn pipeline(&self) -> &TextClassificationPipeline {
        &self.pipeline
    }

    /// Predict one label row per text, columns ordered like `label_names`.
    pub fn predict(&self, texts: &[String]) -> Result<LabelMatrix> {
        self.pipeline.predict(texts)
    }

    /// Write the artifact to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &FORMAT_VERSION)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        info!("Saved model artifact to {}", path.display());
        Ok(())
    }

    /// Read an artifact written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        let version: u32 = bincode::deserialize_from(&mut reader)?;
        if version != FORMAT_VERSION {
            return Err(TriageError::model(format!(
                "{} has format version {version}, expected {FORMAT_VERSION}",
                path.display()
            )));
        }

        let mut artifact: ModelArtifact = bincode::deserialize_from(&mut reader)?;
        artifact
            .pipeline
            .attach_analyzer(Arc::new(MessageAnalyzer::new()?));
        Ok(artifact)
    }
}
