//! Brute-force in-memory vector index
//!
//! Scores every stored document by cosine similarity against the query.
//! Fine for test corpora and small offline sets; production deployments plug
//! an external index in behind `VectorSearch`.

use crate::retrieval::distance::{cosine_similarity, magnitude};
use crate::retrieval::{RetrievalError, SearchHit, VectorSearch};
use crate::types::ItemType;

#[derive(Debug, Clone)]
struct StoredDocument {
    vector: Vec<f32>,
    magnitude: f32,
    hit: SearchHit,
}

#[derive(Debug, Clone)]
pub struct MemoryIndex {
    dimensions: usize,
    documents: Vec<StoredDocument>,
}

impl MemoryIndex {
    pub fn new(dimensions: usize) -> Self {
        MemoryIndex {
            dimensions,
            documents: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Store a document; a second insert with the same id replaces the first
    pub fn insert(
        &mut self,
        doc_id: i64,
        item_type: ItemType,
        title: &str,
        vector: Vec<f32>,
    ) -> Result<(), RetrievalError> {
        self.insert_hit(
            SearchHit {
                doc_id: Some(doc_id),
                title: Some(title.to_string()),
                item_type: Some(item_type.as_str().to_string()),
                ..Default::default()
            },
            vector,
        )
    }

    /// Store a document with full metadata; `hit.score` is ignored
    pub fn insert_hit(&mut self, hit: SearchHit, vector: Vec<f32>) -> Result<(), RetrievalError> {
        if vector.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }

        if let Some(doc_id) = hit.doc_id {
            self.documents.retain(|d| d.hit.doc_id != Some(doc_id));
        }

        self.documents.push(StoredDocument {
            magnitude: magnitude(&vector),
            vector,
            hit,
        });
        Ok(())
    }

    pub fn remove(&mut self, doc_id: i64) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.hit.doc_id != Some(doc_id));
        self.documents.len() != before
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}

impl VectorSearch for MemoryIndex {
    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        if vector.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }

        let query_magnitude = magnitude(vector);
        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| {
                (i, cosine_similarity(vector, &d.vector, Some(query_magnitude), Some(d.magnitude)))
            })
            .collect();

        // stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(i, score)| SearchHit {
                score: Some(f64::from(score)),
                ..self.documents[i].hit.clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new(2);
        index.insert(1, ItemType::Patent, "laser ranging system", vec![1.0, 0.0]).unwrap();
        index.insert(2, ItemType::Research, "radar signal processing", vec![0.0, 1.0]).unwrap();
        index.insert(3, ItemType::Patent, "laser detection method", vec![0.9, 0.1]).unwrap();
        index
    }

    #[test]
    fn test_search_ranks_by_cosine() {
        let hits = index().search(&[1.0, 0.0], 10).unwrap();
        let ids: Vec<i64> = hits.iter().filter_map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert!((hits[0].score.unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(hits[0].item_type.as_deref(), Some("patent"));
    }

    #[test]
    fn test_limit_truncates() {
        let hits = index().search(&[0.0, 1.0], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, Some(2));
        assert!(index().search(&[0.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = MemoryIndex::new(2);
        for id in [7, 3, 5] {
            index.insert(id, ItemType::Research, "same", vec![1.0, 1.0]).unwrap();
        }
        let ids: Vec<i64> = index
            .search(&[1.0, 1.0], 3)
            .unwrap()
            .iter()
            .filter_map(|h| h.doc_id)
            .collect();
        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn test_dimension_checks() {
        let mut index = index();
        assert_eq!(
            index.insert(9, ItemType::Patent, "x", vec![1.0]),
            Err(RetrievalError::DimensionMismatch { expected: 2, got: 1 })
        );
        assert_eq!(
            index.search(&[1.0, 0.0, 0.0], 5),
            Err(RetrievalError::DimensionMismatch { expected: 2, got: 3 })
        );
    }

    #[test]
    fn test_reinsert_replaces_and_remove() {
        let mut index = index();
        index.insert(1, ItemType::Patent, "laser ranging v2", vec![0.0, 1.0]).unwrap();
        assert_eq!(index.len(), 3);

        // replaced document moves to the back of the insertion order
        let ids: Vec<i64> = index
            .search(&[0.0, 1.0], 2)
            .unwrap()
            .iter()
            .filter_map(|h| h.doc_id)
            .collect();
        assert_eq!(ids, vec![2, 1]);

        assert!(index.remove(2));
        assert!(!index.remove(2));
        assert_eq!(index.len(), 2);
        index.clear();
        assert!(index.is_empty());
    }
}
