//! Term-count vectorization.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, TriageError};
use crate::ml::sparse::CsrMatrix;

/// Converts texts into a sparse matrix of term counts.
///
/// Each text is lowercased and then passed through the analyzer; every
/// term becomes a vocabulary entry at fit time. The vocabulary is sorted
/// lexicographically and term `i` owns column `i`. Terms unseen during fit
/// are ignored by [`transform`](Self::transform).
///
/// The analyzer is not serialized. A deserialized vectorizer must get one
/// back through [`attach_analyzer`](Self::attach_analyzer) before use.
#[derive(Clone, Serialize, Deserialize)]
pub struct CountVectorizer {
    lowercase: bool,
    vocabulary: BTreeMap<String, usize>,
    #[serde(skip)]
    analyzer: Option<Arc<dyn Analyzer>>,
}

impl fmt::Debug for CountVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountVectorizer")
            .field("lowercase", &self.lowercase)
            .field("vocabulary_size", &self.vocabulary.len())
            .field("analyzer", &self.analyzer.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl CountVectorizer {
    /// Create an unfitted vectorizer that lowercases text before analysis.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            lowercase: true,
            vocabulary: BTreeMap::new(),
            analyzer: Some(analyzer),
        }
    }

    /// Enable or disable lowercasing before analysis.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Reattach the analyzer after deserialization.
    pub fn attach_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzer = Some(analyzer);
    }

    /// Term → column mapping learned by [`fit`](Self::fit).
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Terms in column order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.vocabulary.keys().map(String::as_str).collect()
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Run preprocessing and analysis on one text.
    pub fn analyze(&self, text: &str) -> Result<Vec<String>> {
        let analyzer = self.analyzer.as_ref().ok_or_else(|| {
            TriageError::model("count vectorizer has no analyzer attached")
        })?;
        if self.lowercase {
            analyzer.terms(&text.to_lowercase())
        } else {
            analyzer.terms(text)
        }
    }

    fn analyze_all(&self, texts: &[String]) -> Result<Vec<Vec<String>>> {
        texts.par_iter().map(|text| self.analyze(text)).collect()
    }

    /// Learn the vocabulary from `texts`.
    pub fn fit(&mut self, texts: &[String]) -> Result<()> {
        let analyzed = self.analyze_all(texts)?;
        self.learn_vocabulary(&analyzed)
    }

    fn learn_vocabulary(&mut self, analyzed: &[Vec<String>]) -> Result<()> {
        let mut vocabulary: BTreeMap<String, usize> = analyzed
            .iter()
            .flatten()
            .map(|term| (term.clone(), 0))
            .collect();
        if vocabulary.is_empty() {
            return Err(TriageError::training(
                "empty vocabulary; the documents contain no terms",
            ));
        }
        for (column, index) in vocabulary.values_mut().enumerate() {
            *index = column;
        }

        debug!(
            "Learned vocabulary of {} terms from {} documents",
            vocabulary.len(),
            analyzed.len()
        );
        self.vocabulary = vocabulary;
        Ok(())
    }

    /// Count vocabulary terms in each text.
    pub fn transform(&self, texts: &[String]) -> Result<CsrMatrix> {
        if !self.is_fitted() {
            return Err(TriageError::model("count vectorizer is not fitted"));
        }
        let analyzed = self.analyze_all(texts)?;
        self.count(&analyzed)
    }

    /// Learn the vocabulary and return the term counts of `texts`.
    pub fn fit_transform(&mut self, texts: &[String]) -> Result<CsrMatrix> {
        let analyzed = self.analyze_all(texts)?;
        self.learn_vocabulary(&analyzed)?;
        self.count(&analyzed)
    }

    fn count(&self, analyzed: &[Vec<String>]) -> Result<CsrMatrix> {
        let rows = analyzed
            .iter()
            .map(|terms| {
                let mut counts: AHashMap<usize, f64> = AHashMap::new();
                for term in terms {
                    if let Some(&column) = self.vocabulary.get(term) {
                        *counts.entry(column).or_insert(0.0) += 1.0;
                    }
                }
                counts.into_iter().collect()
            })
            .collect();
        CsrMatrix::from_rows(rows, self.vocabulary.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::MessageAnalyzer;

    fn vectorizer() -> CountVectorizer {
        CountVectorizer::new(Arc::new(MessageAnalyzer::new().unwrap()))
    }

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let mut v = vectorizer();
        v.fit(&docs(&["water needed", "need food and water"])).unwrap();

        assert_eq!(
            v.feature_names(),
            vec!["and", "food", "need", "needed", "water"]
        );
        assert_eq!(v.vocabulary()["water"], 4);
    }

    #[test]
    fn test_text_is_lowercased_before_analysis() {
        let mut v = vectorizer();
        let counts = v.fit_transform(&docs(&["Tents TENTS tents"])).unwrap();

        assert_eq!(v.feature_names(), vec!["tent"]);
        assert_eq!(counts.get(0, 0), 3.0);
    }

    #[test]
    fn test_without_lowercasing_capitalized_words_keep_their_plural() {
        let mut v = vectorizer().with_lowercase(false);
        v.fit(&docs(&["Tents tents"])).unwrap();

        assert_eq!(v.feature_names(), vec!["tent", "tents"]);
    }

    #[test]
    fn test_unknown_terms_are_ignored() {
        let mut v = vectorizer();
        v.fit(&docs(&["send water"])).unwrap();
        let counts = v.transform(&docs(&["send help", "earthquake"])).unwrap();

        assert_eq!(counts.num_rows(), 2);
        assert_eq!(counts.num_cols(), 2);
        assert_eq!(counts.get(0, 0), 1.0);
        assert_eq!(counts.row(1).nnz(), 0);
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let mut v = vectorizer();
        assert!(matches!(
            v.fit(&docs(&["", "   "])),
            Err(TriageError::Training(_))
        ));
    }

    #[test]
    fn test_unfitted_transform_fails() {
        assert!(vectorizer().transform(&docs(&["water"])).is_err());
    }

    #[test]
    fn test_missing_analyzer_after_deserialization() {
        let mut v = vectorizer();
        v.fit(&docs(&["water"])).unwrap();

        let json = serde_json::to_string(&v).unwrap();
        let mut restored: CountVectorizer = serde_json::from_str(&json).unwrap();
        assert!(restored.transform(&docs(&["water"])).is_err());

        restored.attach_analyzer(Arc::new(MessageAnalyzer::new().unwrap()));
        assert_eq!(restored.transform(&docs(&["water"])).unwrap().get(0, 0), 1.0);
    }
}
