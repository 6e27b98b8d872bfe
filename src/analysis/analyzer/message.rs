//! The analyzer used to featurize disaster-response messages.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lemmatize::LemmatizeFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::strip::StripFilter;
use crate::analysis::tokenizer::treebank::TreebankTokenizer;
use crate::error::Result;

/// Treebank words, noun lemmas, lowercased and trimmed.
///
/// There is no stop word removal and no n-gram expansion: every word and
/// punctuation token the tokenizer emits becomes a term.
pub struct MessageAnalyzer {
    inner: PipelineAnalyzer,
}

impl MessageAnalyzer {
    pub fn new() -> Result<Self> {
        let tokenizer = Arc::new(TreebankTokenizer::new()?);
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LemmatizeFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StripFilter::new()))
            .with_name("message");

        Ok(Self { inner: analyzer })
    }
}

impl Analyzer for MessageAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "message"
    }
}

impl Debug for MessageAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_analyzer() {
        let analyzer = MessageAnalyzer::new().unwrap();

        let terms = analyzer
            .terms("We need tents and blankets for the children.")
            .unwrap();

        assert_eq!(
            terms,
            vec!["we", "need", "tent", "and", "blanket", "for", "the", "child", "."]
        );
    }

    #[test]
    fn test_capitalized_words_are_lowercased_after_lemmatizing() {
        let analyzer = MessageAnalyzer::new().unwrap();
        assert_eq!(analyzer.terms("Floods floods").unwrap(), vec!["floods", "flood"]);
    }

    #[test]
    fn test_message_analyzer_name() {
        assert_eq!(MessageAnalyzer::new().unwrap().name(), "message");
    }
}
