//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step in the analysis pipeline: they split raw
//! message text into [`Token`](crate::analysis::token::Token)s which the
//! token filters then normalize.
//!
//! # Available Tokenizers
//!
//! - [`treebank::TreebankTokenizer`] - Sentence split followed by Penn
//!   Treebank word rules (punctuation and contractions become tokens)
//!
//! # Examples
//!
//! ```
//! use triage::analysis::tokenizer::Tokenizer;
//! use triage::analysis::tokenizer::treebank::TreebankTokenizer;
//!
//! let tokenizer = TreebankTokenizer::new().unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("We need water.").unwrap().collect();
//! assert_eq!(tokens.len(), 4);
//! assert_eq!(tokens[3].text, ".");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so one analyzer can be shared by the
/// rayon workers that fit forests in parallel.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod treebank;

pub use treebank::TreebankTokenizer;
