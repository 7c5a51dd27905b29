//! TF-IDF vectorizer
//!
//! Turns an ordered list of titles into an N×M feature matrix:
//! - tf = raw term count in the title
//! - idf = ln((1 + n) / (1 + df)) + 1 (smoothed, never zero)
//! - each row L2-normalized (all-zero rows stay zero)
//!
//! The vocabulary is sorted lexicographically, so column order (and with it
//! every downstream tie-break) is deterministic for a given input.

use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};

use crate::config::StopWords;
use super::tokenize::TermTokenizer;

/// Dense TF-IDF feature matrix; row i belongs to input text i
pub type FeatureMatrix = Array2<f64>;

/// Smoothed inverse document frequency
#[inline]
pub fn smoothed_idf(total_documents: usize, doc_frequency: usize) -> f64 {
    ((1.0 + total_documents as f64) / (1.0 + doc_frequency as f64)).ln() + 1.0
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    tokenizer: TermTokenizer,
    vocabulary: HashMap<String, usize>,
    feature_names: Vec<String>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            tokenizer: TermTokenizer::new(stop_words),
            vocabulary: HashMap::new(),
            feature_names: Vec::new(),
            idf: Vec::new(),
        }
    }

    /// Learn vocabulary and idf from `texts`, replacing any earlier fit
    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) -> &mut Self {
        let tokenized: Vec<Vec<String>> = texts
            .iter()
            .map(|t| self.tokenizer.tokenize(t.as_ref()))
            .collect();
        self.fit_tokens(&tokenized);
        self
    }

    /// Project `texts` onto the fitted vocabulary
    ///
    /// An empty vocabulary yields a single all-zero column so callers always
    /// receive a well-formed matrix.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> FeatureMatrix {
        let tokenized: Vec<Vec<String>> = texts
            .iter()
            .map(|t| self.tokenizer.tokenize(t.as_ref()))
            .collect();
        self.transform_tokens(&tokenized)
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, texts: &[S]) -> FeatureMatrix {
        let tokenized: Vec<Vec<String>> = texts
            .iter()
            .map(|t| self.tokenizer.tokenize(t.as_ref()))
            .collect();
        self.fit_tokens(&tokenized);
        self.transform_tokens(&tokenized)
    }

    /// Terms in column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// True when the fitted vocabulary is empty (e.g. all-stopword titles)
    pub fn is_degenerate(&self) -> bool {
        self.feature_names.is_empty()
    }

    fn fit_tokens(&mut self, tokenized: &[Vec<String>]) {
        // BTreeMap keeps the vocabulary sorted
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in tokenized {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = tokenized.len();
        self.feature_names = doc_freq.keys().map(|t| t.to_string()).collect();
        self.idf = doc_freq.values().map(|&df| smoothed_idf(n_docs, df)).collect();
        self.vocabulary = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
    }

    fn transform_tokens(&self, tokenized: &[Vec<String>]) -> FeatureMatrix {
        let n_cols = self.feature_names.len().max(1);
        let mut matrix = Array2::<f64>::zeros((tokenized.len(), n_cols));
        if self.is_degenerate() {
            return matrix;
        }

        for (row, tokens) in tokenized.iter().enumerate() {
            for token in tokens {
                if let Some(&col) = self.vocabulary.get(token) {
                    matrix[[row, col]] += 1.0;
                }
            }
            let mut row_view = matrix.row_mut(row);
            for (col, value) in row_view.iter_mut().enumerate() {
                *value *= self.idf[col];
            }
            let norm = row_view.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row_view.mapv_inplace(|v| v / norm);
            }
        }

        matrix
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(StopWords::English)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_norm(matrix: &FeatureMatrix, row: usize) -> f64 {
        matrix.row(row).iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    #[test]
    fn test_vocabulary_sorted_without_stop_words() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&["the optical sensor", "a laser sensor array"]);
        assert_eq!(
            vectorizer.feature_names(),
            &["array", "laser", "optical", "sensor"]
        );
    }

    #[test]
    fn test_shape_and_unit_rows() {
        let titles = ["laser ranging system", "laser detection method", "optical sensor array"];
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&titles);

        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), vectorizer.feature_names().len());
        for row in 0..3 {
            assert!((row_norm(&matrix, row) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_shared_terms_weigh_less() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&["laser ranging", "laser detection"]);
        let names = vectorizer.feature_names();
        let laser = names.iter().position(|t| t == "laser").unwrap();
        let ranging = names.iter().position(|t| t == "ranging").unwrap();
        assert!(matrix[[0, laser]] < matrix[[0, ranging]]);
    }

    #[test]
    fn test_smoothed_idf() {
        assert!((smoothed_idf(1, 1) - 1.0).abs() < 1e-12);
        assert!((smoothed_idf(3, 1) - (2.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_vocabulary() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&["the of and", "a an"]);
        assert!(vectorizer.is_degenerate());
        assert_eq!(matrix.shape(), &[2, 1]);
        assert!(matrix.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&["laser ranging"]);
        let matrix = vectorizer.transform(&["radar imaging"]);
        assert!(matrix.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let titles = ["photonic sensor design", "radar signal processing"];
        let a = TfidfVectorizer::default().fit_transform(&titles);
        let b = TfidfVectorizer::default().fit_transform(&titles);
        assert_eq!(a, b);
    }
}
