//! Search request validation

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        SearchRequest {
            query: query.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Trimmed query and effective `top_k`, or the first violation found
    pub fn validate(&self, config: &SearchConfig) -> Result<ValidRequest, RequestError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(RequestError::EmptyQuery);
        }

        let top_k = self.top_k.unwrap_or(config.default_top_k);
        if top_k == 0 || top_k > config.max_top_k {
            return Err(RequestError::InvalidTopK {
                top_k,
                max: config.max_top_k,
            });
        }

        Ok(ValidRequest {
            query: query.to_string(),
            top_k,
        })
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRequest {
    pub query: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    EmptyQuery,
    InvalidTopK { top_k: usize, max: usize },
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::EmptyQuery => write!(f, "Query must not be empty"),
            RequestError::InvalidTopK { top_k, max } => {
                write!(f, "top_k must be between 1 and {}, got {}", max, top_k)
            }
        }
    }
}

impl std::error::Error for RequestError {}
