//! Token filter implementations for token transformation.
//!
//! Filters receive the token stream produced by a tokenizer and rewrite it.
//! The message analyzer chains them in a fixed order:
//!
//! ```text
//! Tokenizer → Lemmatize → Lowercase → Strip → Vectorizer
//! ```
//!
//! # Available Filters
//!
//! - [`lemmatize::LemmatizeFilter`] - Reduces words to their dictionary base form
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase
//! - [`strip::StripFilter`] - Removes leading and trailing whitespace
//!
//! # Examples
//!
//! ```
//! use triage::analysis::token_filter::Filter;
//! use triage::analysis::token_filter::lowercase::LowercaseFilter;
//! use triage::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Flood", 0), Token::new("WARNING", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "flood");
//! assert_eq!(filtered[1].text, "warning");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod lemmatize;
pub mod lowercase;
pub mod strip;

pub use lemmatize::{LemmatizeFilter, Lemmatizer, NounLemmatizer};
pub use lowercase::LowercaseFilter;
pub use strip::StripFilter;
