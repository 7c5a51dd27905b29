// techsearch-core/src/embeddings/mod.rs
//
// Query embedding for vector retrieval.
// Uses `tract-onnx` for pure-Rust ONNX inference (WASM-compatible).
//
// The model is loaded once by the host and handed to the search service by
// reference through the `QueryEmbedder` trait.

pub mod config;
pub mod model;
pub mod tokenize;

pub use config::{EmbedConfig, OnnxModel, PoolingStrategy};
pub use model::{l2_normalize, EmbedModel, ModelError};
pub use tokenize::{QueryTokenizer, TokenizedQuery, TokenizerError};

/// Errors raised while embedding a query
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedError {
    Model(ModelError),
    DimensionMismatch { expected: usize, got: usize },
}

impl std::fmt::Display for EmbedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model(e) => write!(f, "Embedding failed: {}", e),
            Self::DimensionMismatch { expected, got } => {
                write!(f, "Embedding dimension mismatch: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for EmbedError {}

impl From<ModelError> for EmbedError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

/// Anything that can turn a query string into a search vector
pub trait QueryEmbedder {
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn dimensions(&self) -> usize;
}

impl QueryEmbedder for EmbedModel {
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let embedding = self.embed(text)?;
        if embedding.len() != self.dimensions() {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimensions(),
                got: embedding.len(),
            });
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        EmbedModel::dimensions(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_error_display() {
        let err = EmbedError::DimensionMismatch { expected: 384, got: 768 };
        assert!(err.to_string().contains("384"));

        let err: EmbedError = ModelError::InferenceFailed("boom".to_string()).into();
        assert!(err.to_string().contains("boom"));
    }
}
