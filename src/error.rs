//! Error types for the triage library.
//!
//! Every fallible operation in the crate returns [`Result`], whose error
//! side is the [`TriageError`] enum. The training run is a one-shot batch
//! job, so none of these errors are retried: they propagate to the binary,
//! which reports them and exits.
//!
//! # Examples
//!
//! ```
//! use triage::error::{Result, TriageError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TriageError::invalid_argument("test size must be in (0, 1)"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for triage operations.
#[derive(Error, Debug)]
pub enum TriageError {
    /// I/O errors (model file, config file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors raised by the SQLite driver (unreachable store, bad SQL).
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The store does not have the expected table or columns.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A cell in the store holds a value the loader cannot use.
    #[error("Data error: {0}")]
    Data(String),

    /// Analysis-related errors (tokenization, filtering).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Errors raised while fitting or applying an estimator.
    #[error("Training error: {0}")]
    Training(String),

    /// The persisted model is missing, unreadable or incompatible.
    #[error("Model error: {0}")]
    Model(String),

    /// Binary (de)serialization of the model artifact failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file the run needs (store, model, config) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Result type alias for operations that may fail with TriageError.
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        TriageError::Schema(msg.into())
    }

    /// Create a new data error.
    pub fn data<S: Into<String>>(msg: S) -> Self {
        TriageError::Data(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TriageError::Analysis(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        TriageError::Training(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        TriageError::Model(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        TriageError::NotFound(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TriageError::schema("no such table: messages");
        assert_eq!(error.to_string(), "Schema error: no such table: messages");

        let error = TriageError::training("empty vocabulary");
        assert_eq!(error.to_string(), "Training error: empty vocabulary");

        let error = TriageError::invalid_config("folds must be at least 2");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: folds must be at least 2"
        );
    }

    #[test]
    fn test_not_found_is_not_double_prefixed() {
        let error = TriageError::not_found("message store /nonexistent.db");
        assert!(matches!(error, TriageError::NotFound(_)));
        assert_eq!(error.to_string(), "Not found: message store /nonexistent.db");
        assert!(!TriageError::other("cannot score zero rows").to_string().starts_with("Error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let triage_error = TriageError::from(io_error);

        match triage_error {
            TriageError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
