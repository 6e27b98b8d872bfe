//! # Triage
//!
//! Trains a multi-label classifier that tags disaster-response messages
//! with the categories they concern (water, shelter, medical help, ...).
//!
//! ## Pipeline
//!
//! - Load labeled messages from a SQLite store ([`dataset`])
//! - Tokenize and lemmatize the text ([`analysis`])
//! - Count terms, weight them by TF-IDF and fit one random forest per
//!   category, tuned by a cross-validated grid search ([`ml`])
//! - Report per-category precision, recall and F1 on held-out messages and
//!   persist the model ([`training`], [`model`])

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod model;
pub mod training;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
