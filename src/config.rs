//! Training run configuration.
//!
//! A [`TrainingConfig`] can be read from a JSON file; every field is
//! optional and falls back to its default:
//!
//! ```json
//! {
//!   "loader": { "table": "messages", "text_column": "message", "labels": { "offset": 4 } },
//!   "model": { "n_estimators_grid": [20, 30], "cv_folds": 5, "seed": 42 },
//!   "test_size": 0.2
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::LoaderConfig;
use crate::error::{Result, TriageError};
use crate::ml::ModelConfig;

/// Everything a training run needs besides its input and output paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub loader: LoaderConfig,
    pub model: ModelConfig,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            model: ModelConfig::default(),
            test_size: 0.2,
        }
    }
}

impl TrainingConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: TrainingConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Check the configuration for values no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TriageError::invalid_config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.model.cv_folds < 2 {
            return Err(TriageError::invalid_config(format!(
                "cv_folds must be at least 2, got {}",
                self.model.cv_folds
            )));
        }
        if self.model.n_estimators_grid.is_empty() {
            return Err(TriageError::invalid_config("n_estimators_grid is empty"));
        }
        if self.model.n_estimators_grid.contains(&0) {
            return Err(TriageError::invalid_config(
                "n_estimators_grid entries must be at least 1",
            ));
        }
        if self.loader.table.is_empty() || self.loader.text_column.is_empty() {
            return Err(TriageError::invalid_config(
                "table and text_column must not be empty",
            ));
        }
        Ok(())
    }
}
