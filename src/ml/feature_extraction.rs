//! Text feature extraction: term counts and TF-IDF weighting.

pub mod count;
pub mod tfidf;

pub use count::CountVectorizer;
pub use tfidf::TfidfTransformer;
