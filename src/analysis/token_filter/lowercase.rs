//! Lowercase filter implementation.
//!
//! # Examples
//!
//! ```
//! use triage::analysis::token_filter::Filter;
//! use triage::analysis::token_filter::lowercase::LowercaseFilter;
//! use triage::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Earthquake", 0), Token::new("ÉCOLE", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "earthquake");
//! assert_eq!(filtered[1].text, "école");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// ASCII-only tokens take the cheap byte-wise path; anything else goes
/// through Unicode-aware lowercasing. Stopped tokens pass through untouched.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

fn to_lowercase(text: &str) -> String {
    if text.is_ascii() {
        text.to_ascii_lowercase()
    } else {
        text.to_lowercase()
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                token
            } else {
                let lowered = to_lowercase(&token.text);
                token.with_text(lowered)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::{IntoTokenStream, Token};

    #[test]
    fn test_lowercase_keeps_offsets() {
        let tokens = vec![
            Token::with_offsets("Port-au-Prince", 0, 3, 17),
            Token::with_offsets("NEEDS", 1, 18, 23),
        ];

        let result: Vec<Token> = LowercaseFilter::new()
            .filter(tokens.into_token_stream())
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "port-au-prince");
        assert_eq!((result[0].start_offset, result[0].end_offset), (3, 17));
        assert_eq!(result[1].text, "needs");
    }

    #[test]
    fn test_stopped_tokens_pass_through() {
        let tokens = vec![Token::new("Rain", 0).stop()];

        let result: Vec<Token> = LowercaseFilter::new()
            .filter(tokens.into_token_stream())
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "Rain");
        assert!(result[0].is_stopped());
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(LowercaseFilter::new().name(), "lowercase");
    }
}
