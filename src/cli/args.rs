//! Command line argument parsing for the triage CLI using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::dataset::LabelSelection;
use crate::error::Result;

/// Printed when the positional arguments are missing or extra.
pub const USAGE: &str = "Please provide the filepath of the disaster messages database \
as the first argument and the filepath of the model file to save the model to as the \
second argument. \n\nExample: triage ../data/DisasterResponse.db classifier.bin";

/// Triage - train a multi-label classifier for disaster-response messages
#[derive(Parser, Debug, Clone)]
#[command(name = "triage")]
#[command(about = "Train a multi-label classifier for disaster-response messages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "Example: triage ../data/DisasterResponse.db classifier.bin")]
pub struct TriageArgs {
    /// SQLite database holding the `messages` table
    #[arg(value_name = "DATABASE")]
    pub database: PathBuf,

    /// Where to write the trained model (overwritten if present)
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Training configuration file (JSON); flags override its values
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seed for the split, the search and the forests
    #[arg(long, env = "TRIAGE_SEED")]
    pub seed: Option<u64>,

    /// Label columns to train on (comma-separated); default is every column after the 4th
    #[arg(long, value_delimiter = ',', value_name = "COLUMNS")]
    pub labels: Vec<String>,

    /// Fraction of messages held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Cross-validation folds per grid candidate
    #[arg(long)]
    pub folds: Option<usize>,

    /// Forest sizes to search (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "SIZES")]
    pub n_estimators: Vec<usize>,

    /// Increase verbosity (-v info logs and CV scores, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format of the evaluation report
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl TriageArgs {
    /// Get the effective verbosity level (0=quiet, 1=normal, 2=verbose, 3+=debug)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }

    /// Build the run configuration: defaults, then the config file, then flags.
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_file(path)?,
            None => TrainingConfig::default(),
        };

        if self.seed.is_some() {
            config.model.seed = self.seed;
        }
        if !self.labels.is_empty() {
            config.loader.labels = LabelSelection::Named(self.labels.clone());
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(folds) = self.folds {
            config.model.cv_folds = folds;
        }
        if !self.n_estimators.is_empty() {
            config.model.n_estimators_grid = self.n_estimators.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<TriageArgs, clap::Error> {
        TriageArgs::try_parse_from(std::iter::once("triage").chain(args.iter().copied()))
    }

    #[test]
    fn test_two_positionals() {
        let args = parse(&["data/DisasterResponse.db", "classifier.bin"]).unwrap();

        assert_eq!(args.database, PathBuf::from("data/DisasterResponse.db"));
        assert_eq!(args.model, PathBuf::from("classifier.bin"));
        assert_eq!(args.verbosity(), 1);
        assert_eq!(args.output_format, OutputFormat::Human);
    }

    #[test]
    fn test_wrong_positional_count() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["only.db"]).is_err());
        assert!(parse(&["a.db", "b.bin", "extra"]).is_err());
    }

    #[test]
    fn test_each_v_raises_verbosity() {
        assert_eq!(parse(&["a.db", "b.bin", "-v"]).unwrap().verbosity(), 2);
        assert_eq!(parse(&["a.db", "b.bin", "-vv"]).unwrap().verbosity(), 3);
        assert_eq!(parse(&["a.db", "b.bin", "-vv", "-q"]).unwrap().verbosity(), 0);
    }

    #[test]
    fn test_usage_has_example() {
        assert!(USAGE.contains("Example: triage ../data/DisasterResponse.db classifier.bin"));
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "a.db",
            "b.bin",
            "--seed",
            "9",
            "--labels",
            "water,food",
            "--n-estimators",
            "10,40",
            "--folds",
            "3",
            "-q",
        ])
        .unwrap();
        let config = args.training_config().unwrap();

        assert_eq!(config.model.seed, Some(9));
        assert_eq!(
            config.loader.labels,
            LabelSelection::Named(vec!["water".to_string(), "food".to_string()])
        );
        assert_eq!(config.model.n_estimators_grid, vec![10, 40]);
        assert_eq!(config.model.cv_folds, 3);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_invalid_flag_values_fail_validation() {
        let args = parse(&["a.db", "b.bin", "--test-size", "1.5"]).unwrap();
        assert!(args.training_config().is_err());
    }
}
