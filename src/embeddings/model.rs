// techsearch-core/src/embeddings/model.rs
//
// ONNX sentence-embedding inference via tract

use crate::embeddings::config::{EmbedConfig, PoolingStrategy};
use crate::embeddings::tokenize::{QueryTokenizer, TokenizedQuery, TokenizerError};
use ndarray::{Array2, ArrayView2};
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Type alias for the tract typed model
type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Loaded embedding model ready for inference
///
/// Build once at startup and share by reference; inference takes `&self`.
pub struct EmbedModel {
    model: Arc<TractModel>,
    tokenizer: QueryTokenizer,
    config: EmbedConfig,
}

/// Model loading and inference errors
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    LoadFailed(String),
    InferenceFailed(String),
    TokenizerError(TokenizerError),
    ShapeError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadFailed(e) => write!(f, "Model load failed: {}", e),
            Self::InferenceFailed(e) => write!(f, "Inference failed: {}", e),
            Self::TokenizerError(e) => write!(f, "Tokenizer error: {}", e),
            Self::ShapeError(e) => write!(f, "Shape error: {}", e),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<TokenizerError> for ModelError {
    fn from(e: TokenizerError) -> Self {
        Self::TokenizerError(e)
    }
}

impl EmbedModel {
    /// Load model from ONNX bytes and tokenizer JSON
    pub fn from_bytes(
        model_bytes: &[u8],
        tokenizer_json: &str,
        config: EmbedConfig,
    ) -> Result<Self, ModelError> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .map_err(|e| ModelError::LoadFailed(e.to_string()))?
            .into_optimized()
            .map_err(|e| ModelError::LoadFailed(e.to_string()))?
            .into_runnable()
            .map_err(|e| ModelError::LoadFailed(e.to_string()))?;

        let tokenizer = QueryTokenizer::from_json(tokenizer_json, config.model.max_length())?;

        Ok(Self {
            model: Arc::new(model),
            tokenizer,
            config,
        })
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions()
    }

    /// Embed one query text
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let query = self.tokenizer.encode(text)?;
        let seq_len = query.len();

        let inputs: TVec<TValue> = tvec![
            Self::input_tensor(&query.input_ids, seq_len)?.into(),
            Self::input_tensor(&query.attention_mask, seq_len)?.into(),
            Self::input_tensor(&query.token_type_ids, seq_len)?.into(),
        ];

        let outputs = self.model.run(inputs)
            .map_err(|e| ModelError::InferenceFailed(e.to_string()))?;

        // BERT models output: (batch_size, seq_len, hidden_size)
        let output = &outputs[0];
        let shape = output.shape();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(ModelError::ShapeError(format!("unexpected output shape {:?}", shape)));
        }
        let values = output
            .as_slice::<f32>()
            .map_err(|e| ModelError::ShapeError(e.to_string()))?;
        let hidden = Array2::from_shape_vec((shape[1], shape[2]), values.to_vec())
            .map_err(|e| ModelError::ShapeError(e.to_string()))?;

        let embedding = pool(&hidden.view(), &query, self.config.pooling)?;
        Ok(if self.config.normalize {
            l2_normalize(embedding)
        } else {
            embedding
        })
    }

    fn input_tensor(values: &[i64], seq_len: usize) -> Result<Tensor, ModelError> {
        Tensor::from_shape(&[1, seq_len], values).map_err(|e| ModelError::ShapeError(e.to_string()))
    }
}

/// Reduce per-token embeddings (seq_len × hidden) to one vector
fn pool(
    hidden: &ArrayView2<f32>,
    query: &TokenizedQuery,
    strategy: PoolingStrategy,
) -> Result<Vec<f32>, ModelError> {
    if hidden.nrows() == 0 {
        return Err(ModelError::ShapeError("empty token sequence".to_string()));
    }

    match strategy {
        PoolingStrategy::Cls => Ok(hidden.row(0).to_vec()),
        PoolingStrategy::Mean => {
            let mut sum = vec![0.0f32; hidden.ncols()];
            let mut count = 0.0f32;
            for (row, &m) in hidden.rows().into_iter().zip(&query.attention_mask) {
                if m > 0 {
                    sum.iter_mut().zip(row.iter()).for_each(|(s, v)| *s += v);
                    count += 1.0;
                }
            }
            if count > 0.0 {
                sum.iter_mut().for_each(|v| *v /= count);
            }
            Ok(sum)
        }
    }
}

/// Scale to unit length; the zero vector is returned unchanged
pub fn l2_normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        embedding.iter_mut().for_each(|x| *x /= norm);
    }
    embedding
}
