// techsearch-core/src/embeddings/config.rs
//
// Query embedding model configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported ONNX sentence-embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OnnxModel {
    /// all-MiniLM-L6-v2 - 384 dimensions, the model the patent index was built with
    #[default]
    #[serde(rename = "all-minilm-l6-v2")]
    AllMiniLML6V2,

    /// BAAI/bge-small-en-v1.5 - 384 dimensions
    #[serde(rename = "bge-small-en-v1.5")]
    BGESmallENV15,
}

impl fmt::Display for OnnxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllMiniLML6V2 => write!(f, "all-minilm-l6-v2"),
            Self::BGESmallENV15 => write!(f, "bge-small-en-v1.5"),
        }
    }
}

impl OnnxModel {
    /// Parse a model id, accepting HuggingFace-style aliases
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => Some(Self::AllMiniLML6V2),
            "bge-small" | "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => Some(Self::BGESmallENV15),
            _ => None,
        }
    }

    /// Embedding vector size
    pub fn dimensions(&self) -> usize {
        match self {
            Self::AllMiniLML6V2 => 384,
            Self::BGESmallENV15 => 384,
        }
    }

    /// Maximum token sequence length
    pub fn max_length(&self) -> usize {
        match self {
            Self::AllMiniLML6V2 => 256,
            Self::BGESmallENV15 => 512,
        }
    }

    pub fn hf_model_id(&self) -> &'static str {
        match self {
            Self::AllMiniLML6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            Self::BGESmallENV15 => "BAAI/bge-small-en-v1.5",
        }
    }

    /// Pooling the model was trained with
    pub fn native_pooling(&self) -> PoolingStrategy {
        match self {
            Self::AllMiniLML6V2 => PoolingStrategy::Mean,
            Self::BGESmallENV15 => PoolingStrategy::Cls,
        }
    }
}

/// Pooling strategy for converting token embeddings to a sentence embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PoolingStrategy {
    /// Mean over attended tokens
    #[default]
    Mean,
    /// [CLS] token embedding
    Cls,
}

/// Embedding pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub model: OnnxModel,
    pub pooling: PoolingStrategy,
    /// L2-normalize output vectors (the index uses cosine distance)
    pub normalize: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self::for_model(OnnxModel::default())
    }
}

impl EmbedConfig {
    /// Config with the model's native pooling
    pub fn for_model(model: OnnxModel) -> Self {
        Self {
            model,
            pooling: model.native_pooling(),
            normalize: true,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.model.dimensions()
    }
}
