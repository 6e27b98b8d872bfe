//! Lemmatizing token filter and lemmatizer implementations.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for lemmatization algorithms.
///
/// A lemmatizer maps an inflected word to its dictionary base form. Words
/// the lemmatizer does not recognize come back unchanged.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a word to its base form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

pub mod noun;

pub use noun::NounLemmatizer;

/// Filter that applies lemmatization to tokens.
pub struct LemmatizeFilter {
    lemmatizer: Box<dyn Lemmatizer>,
}

impl std::fmt::Debug for LemmatizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmatizeFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .finish()
    }
}

impl LemmatizeFilter {
    /// Create a new lemmatize filter with the noun lemmatizer.
    pub fn new() -> Self {
        LemmatizeFilter {
            lemmatizer: Box::new(NounLemmatizer::new()),
        }
    }

    /// Create a lemmatize filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        LemmatizeFilter { lemmatizer }
    }
}

impl Default for LemmatizeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmatizeFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let lemma = self.lemmatizer.lemmatize(&token.text);
                    token.with_text(lemma)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemmatize"
    }
}
