//! Retrieval collaborator contract
//!
//! The vector index is external: it takes a query embedding and a result
//! limit and returns scored hits. This module defines that seam, converts
//! loose hits into typed records, and ships a brute-force in-memory index.

mod distance;
mod memory;

pub use distance::{cosine_similarity, magnitude};
pub use memory::MemoryIndex;

use serde::{Deserialize, Serialize};

use crate::types::{ItemType, ResultRecord, ResultSet};

/// One hit as returned by the vector index; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub doc_id: Option<i64>,
    pub score: Option<f64>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub publication_date: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

impl SearchHit {
    /// Typed record, or `None` when the type tag is missing or unknown
    pub fn into_record(self) -> Option<ResultRecord> {
        let item_type = ItemType::from_tag(self.item_type.as_deref()?)?;
        Some(ResultRecord {
            doc_id: self.doc_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            score: self.score.unwrap_or(0.0),
            source: self.source.unwrap_or_default(),
            item_type,
            publication_date: self.publication_date.unwrap_or_default(),
            cluster_id: None,
        })
    }
}

/// Split hits into patent and research lists, keeping rank order
///
/// Hits with any other type are dropped.
pub fn partition_hits(query: impl Into<String>, hits: Vec<SearchHit>) -> ResultSet {
    let mut results = ResultSet::new(query);
    for record in hits.into_iter().filter_map(SearchHit::into_record) {
        results.push(record);
    }
    results
}

/// Retrieval errors
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalError {
    DimensionMismatch { expected: usize, got: usize },
    Backend(String),
}

impl std::fmt::Display for RetrievalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalError::DimensionMismatch { expected, got } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, got)
            }
            RetrievalError::Backend(msg) => write!(f, "Vector search failed: {}", msg),
        }
    }
}

impl std::error::Error for RetrievalError {}

/// Similarity search over stored document embeddings
pub trait VectorSearch {
    /// Up to `limit` hits for `vector`, best first
    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, RetrievalError>;
}

impl<T: VectorSearch + ?Sized> VectorSearch for &T {
    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        (**self).search(vector, limit)
    }
}
