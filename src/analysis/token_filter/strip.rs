//! Strip filter implementation.

use super::Filter;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A filter that removes leading and trailing whitespace from tokens.
///
/// A token that is nothing but whitespace is stopped rather than emitted
/// as an empty term.
#[derive(Clone, Debug, Default)]
pub struct StripFilter;

impl StripFilter {
    /// Create a new strip filter.
    pub fn new() -> Self {
        StripFilter
    }
}

fn strip(token: Token) -> Token {
    if token.is_stopped() {
        return token;
    }
    match token.text.trim() {
        "" => token.stop(),
        trimmed if trimmed.len() == token.text.len() => token,
        trimmed => token.with_text(trimmed),
    }
}

impl Filter for StripFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(strip)))
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::IntoTokenStream;

    #[test]
    fn test_whitespace_is_trimmed_or_stopped() {
        let tokens = vec![
            Token::new("  shelter  ", 0),
            Token::new("water", 1),
            Token::new("   ", 2),
        ];

        let result: Vec<Token> = StripFilter::new()
            .filter(tokens.into_token_stream())
            .unwrap()
            .collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "shelter");
        assert_eq!(result[1].text, "water");
        assert_eq!(result[2].text, "   ");
        assert!(result[2].is_stopped());
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(StripFilter::new().name(), "strip");
    }
}
