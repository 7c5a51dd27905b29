// techsearch-core/src/embeddings/tokenize.rs
//
// WordPiece tokenization of search queries

use tokenizers::Tokenizer;
use std::sync::Arc;

/// Tokenizer wrapper sized for one embedding model
pub struct QueryTokenizer {
    tokenizer: Arc<Tokenizer>,
    max_length: usize,
}

/// Model inputs for a single query
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedQuery {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

impl TokenizedQuery {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Cut all three sequences to `max_length`
    pub fn truncate(&mut self, max_length: usize) {
        self.input_ids.truncate(max_length);
        self.attention_mask.truncate(max_length);
        self.token_type_ids.truncate(max_length);
    }
}

impl QueryTokenizer {
    /// Create tokenizer from tokenizer.json contents
    pub fn from_json(tokenizer_json: &str, max_length: usize) -> Result<Self, TokenizerError> {
        let tokenizer = Tokenizer::from_bytes(tokenizer_json.as_bytes())
            .map_err(|e| TokenizerError::LoadFailed(e.to_string()))?;

        Ok(Self {
            tokenizer: Arc::new(tokenizer),
            max_length,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Tokenize a query with special tokens, truncated to the model limit
    pub fn encode(&self, text: &str) -> Result<TokenizedQuery, TokenizerError> {
        let encoding = self.tokenizer.encode(text, true)
            .map_err(|e| TokenizerError::EncodeFailed(e.to_string()))?;

        let mut query = TokenizedQuery {
            input_ids: encoding.get_ids().iter().map(|&id| id as i64).collect(),
            attention_mask: encoding.get_attention_mask().iter().map(|&m| m as i64).collect(),
            token_type_ids: encoding.get_type_ids().iter().map(|&id| id as i64).collect(),
        };
        query.truncate(self.max_length);

        if query.is_empty() {
            return Err(TokenizerError::EncodeFailed("no tokens produced".to_string()));
        }
        Ok(query)
    }
}

/// Tokenizer errors
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizerError {
    LoadFailed(String),
    EncodeFailed(String),
}

impl std::fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed(e) => write!(f, "Failed to load tokenizer: {}", e),
            Self::EncodeFailed(e) => write!(f, "Failed to encode query: {}", e),
        }
    }
}

impl std::error::Error for TokenizerError {}

#[cfg(test)]
mod tests {
    use super::*;

    // Loading a real tokenizer needs tokenizer.json from the HuggingFace Hub

    #[test]
    fn test_truncate_keeps_sequences_aligned() {
        let mut query = TokenizedQuery {
            input_ids: vec![101, 9138, 10788, 102],
            attention_mask: vec![1, 1, 1, 1],
            token_type_ids: vec![0, 0, 0, 0],
        };
        query.truncate(2);
        assert_eq!(query.len(), 2);
        assert_eq!(query.attention_mask.len(), 2);
        assert_eq!(query.token_type_ids.len(), 2);
    }

    #[test]
    fn test_invalid_tokenizer_json() {
        let result = QueryTokenizer::from_json("not json", 256);
        assert!(matches!(result, Err(TokenizerError::LoadFailed(_))));
    }
}
