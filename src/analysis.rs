//! Text analysis for message featurization.
//!
//! The analysis layer turns raw message text into the ordered term list the
//! vectorizer counts. It is built from small composable parts: a
//! [`tokenizer`](tokenizer::Tokenizer) splits text into tokens, a chain of
//! [`token filters`](token_filter::Filter) normalizes them, and an
//! [`analyzer`](analyzer::Analyzer) ties the two together.
//!
//! [`tokenize`] is the entry point used by the training pipeline.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

use crate::analysis::analyzer::{Analyzer, MessageAnalyzer};
use crate::error::Result;

/// Tokenize a message into normalized terms.
///
/// Splits the text into Treebank words, reduces each word to its noun
/// lemma, lowercases and trims it. The function is pure: the same text
/// always yields the same terms, and empty text yields no terms.
///
/// # Examples
///
/// ```
/// let terms = triage::analysis::tokenize("Roads are blocked, send trucks!").unwrap();
/// assert_eq!(terms, vec!["roads", "are", "blocked", ",", "send", "truck", "!"]);
///
/// assert!(triage::analysis::tokenize("").unwrap().is_empty());
/// ```
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    MessageAnalyzer::new()?.terms(text)
}
