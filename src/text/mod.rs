//! Text vectorization: tokenization, stop words and TF-IDF weighting.

pub mod stop_words;
pub mod tfidf;
pub mod tokenize;

pub use stop_words::{is_stop_word, ENGLISH_STOP_WORDS};
pub use tfidf::{smoothed_idf, FeatureMatrix, TfidfVectorizer};
pub use tokenize::TermTokenizer;
