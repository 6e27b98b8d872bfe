//! Pipeline analyzer that combines a tokenizer and filters.
//!
//! The pipeline applies the tokenizer first and then every filter in the
//! order it was added.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use triage::analysis::analyzer::Analyzer;
//! use triage::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use triage::analysis::token_filter::lowercase::LowercaseFilter;
//! use triage::analysis::tokenizer::treebank::TreebankTokenizer;
//!
//! let tokenizer = Arc::new(TreebankTokenizer::new().unwrap());
//! let analyzer = PipelineAnalyzer::new(tokenizer)
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .with_name("lowercased_words");
//!
//! let terms = analyzer.terms("Roads BLOCKED").unwrap();
//! assert_eq!(terms, vec!["roads", "blocked"]);
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the configured name of this analyzer.
    pub fn pipeline_name(&self) -> &str {
        &self.name
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let tokens = self.tokenizer.tokenize(text)?;
        self.filters
            .iter()
            .try_fold(tokens, |tokens, filter| filter.filter(tokens))
    }

    fn name(&self) -> &'static str {
        // The configured name is not 'static; see `pipeline_name`.
        "pipeline"
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;
    use crate::analysis::token_filter::lemmatize::LemmatizeFilter;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;
    use crate::analysis::tokenizer::treebank::TreebankTokenizer;

    #[test]
    fn test_pipeline_analyzer() {
        let tokenizer = Arc::new(TreebankTokenizer::new().unwrap());
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(LemmatizeFilter::new()));

        let tokens: Vec<Token> = analyzer.analyze("Houses FLOODED").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "house");
        assert_eq!(tokens[1].text, "flooded");
    }

    #[test]
    fn test_filter_order_matters() {
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(TreebankTokenizer::new().unwrap());
        let lemmatize_first = PipelineAnalyzer::new(Arc::clone(&tokenizer))
            .add_filter(Arc::new(LemmatizeFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));
        let lowercase_first = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(LemmatizeFilter::new()));

        assert_eq!(lemmatize_first.terms("Tents").unwrap(), vec!["tents"]);
        assert_eq!(lowercase_first.terms("Tents").unwrap(), vec!["tent"]);
    }

    #[test]
    fn test_pipeline_names() {
        let tokenizer = Arc::new(TreebankTokenizer::new().unwrap());
        let analyzer = PipelineAnalyzer::new(tokenizer);
        assert_eq!(analyzer.pipeline_name(), "pipeline_treebank");
        assert_eq!(analyzer.name(), "pipeline");
        assert!(analyzer.filters().is_empty());
    }
}
