//! Title tokenization for TF-IDF.

use regex::Regex;

use crate::config::StopWords;
use super::stop_words::is_stop_word;

/// Words of two or more Unicode word characters
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Lowercasing word tokenizer with stop-word filtering
#[derive(Debug, Clone)]
pub struct TermTokenizer {
    pattern: Regex,
    stop_words: StopWords,
}

impl TermTokenizer {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            pattern: Regex::new(TOKEN_PATTERN).expect("token pattern is valid"),
            stop_words,
        }
    }

    /// Tokens of `text` in order of appearance, duplicates kept
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !is_stop_word(self.stop_words, token))
            .map(str::to_string)
            .collect()
    }

    pub fn stop_words(&self) -> StopWords {
        self.stop_words
    }
}

impl Default for TermTokenizer {
    fn default() -> Self {
        Self::new(StopWords::English)
    }
}
