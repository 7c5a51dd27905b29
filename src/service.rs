//! End-to-end search: validate -> embed -> retrieve -> partition -> cluster
//!
//! The embedder and the index are borrowed collaborators; the service owns
//! only configuration, so one model instance can back any number of services.

use serde::{Deserialize, Serialize};

use crate::cluster::cluster_results;
use crate::config::{ClusterConfig, SearchConfig};
use crate::embeddings::{EmbedError, QueryEmbedder};
use crate::request::{RequestError, SearchRequest};
use crate::retrieval::{partition_hits, RetrievalError, VectorSearch};
use crate::types::GroupedOutput;
use crate::{console_debug, console_warn};

/// Per-phase timings in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTimings {
    pub embed_us: u64,
    pub search_us: u64,
    pub cluster_us: u64,
    pub total_us: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub output: GroupedOutput,
    /// Hits returned by the index, before type filtering
    pub hits_returned: usize,
    pub timings: SearchTimings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    Request(RequestError),
    Embed(EmbedError),
    Retrieval(RetrievalError),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Request(e) => write!(f, "Invalid request: {}", e),
            SearchError::Embed(e) => write!(f, "Embedding failed: {}", e),
            SearchError::Retrieval(e) => write!(f, "Retrieval failed: {}", e),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<RequestError> for SearchError {
    fn from(e: RequestError) -> Self {
        SearchError::Request(e)
    }
}

impl From<EmbedError> for SearchError {
    fn from(e: EmbedError) -> Self {
        SearchError::Embed(e)
    }
}

impl From<RetrievalError> for SearchError {
    fn from(e: RetrievalError) -> Self {
        SearchError::Retrieval(e)
    }
}

pub struct SearchService<'a, E: QueryEmbedder, S: VectorSearch> {
    embedder: &'a E,
    index: &'a S,
    cluster_config: ClusterConfig,
    search_config: SearchConfig,
}

impl<'a, E: QueryEmbedder, S: VectorSearch> SearchService<'a, E, S> {
    pub fn new(embedder: &'a E, index: &'a S) -> Self {
        SearchService {
            embedder,
            index,
            cluster_config: ClusterConfig::default(),
            search_config: SearchConfig::default(),
        }
    }

    pub fn with_cluster_config(mut self, config: ClusterConfig) -> Self {
        self.cluster_config = config;
        self
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = config;
        self
    }

    pub fn cluster_config(&self) -> &ClusterConfig {
        &self.cluster_config
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let overall_start = instant::Instant::now();
        let mut timings = SearchTimings::default();

        let request = request.validate(&self.search_config)?;

        let embed_start = instant::Instant::now();
        let vector = self.embedder.embed_query(&request.query)?;
        timings.embed_us = embed_start.elapsed().as_micros() as u64;

        let search_start = instant::Instant::now();
        let hits = self.index.search(&vector, request.top_k).map_err(|e| {
            console_warn!("[search] vector search failed: {}", e);
            e
        })?;
        timings.search_us = search_start.elapsed().as_micros() as u64;
        let hits_returned = hits.len();

        let cluster_start = instant::Instant::now();
        let results = partition_hits(request.query, hits);
        let output = cluster_results(&results, &self.cluster_config);
        timings.cluster_us = cluster_start.elapsed().as_micros() as u64;

        timings.total_us = overall_start.elapsed().as_micros() as u64;
        console_debug!(
            "[search] {} hits -> {} groups in {}us",
            hits_returned,
            output.groups.len(),
            timings.total_us
        );

        Ok(SearchResponse {
            output,
            hits_returned,
            timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{MemoryIndex, SearchHit};
    use crate::types::ItemType;
    use std::cell::Cell;

    /// Bag-of-keywords embedder over a fixed three-word basis
    struct KeywordEmbedder {
        calls: Cell<usize>,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            KeywordEmbedder { calls: Cell::new(0) }
        }
    }

    impl QueryEmbedder for KeywordEmbedder {
        fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            self.calls.set(self.calls.get() + 1);
            Ok(["laser", "sensor", "radar"]
                .iter()
                .map(|k| if text.contains(k) { 1.0 } else { 0.1 })
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct FailingIndex;

    impl VectorSearch for FailingIndex {
        fn search(&self, _vector: &[f32], _limit: usize) -> Result<Vec<SearchHit>, RetrievalError> {
            Err(RetrievalError::Backend("connection refused".to_string()))
        }
    }

    fn corpus(embedder: &KeywordEmbedder) -> MemoryIndex {
        let mut index = MemoryIndex::new(3);
        let docs = [
            (1, ItemType::Patent, "laser ranging system"),
            (2, ItemType::Patent, "laser detection method"),
            (3, ItemType::Patent, "optical sensor array"),
            (4, ItemType::Research, "radar signal processing"),
            (5, ItemType::Research, "photonic sensor design"),
        ];
        for (id, item_type, title) in docs {
            let vector = embedder.embed_query(title).unwrap();
            index.insert(id, item_type, title, vector).unwrap();
        }
        embedder.calls.set(0);
        index
    }

    #[test]
    fn test_search_returns_grouped_output() {
        let embedder = KeywordEmbedder::new();
        let index = corpus(&embedder);
        let service = SearchService::new(&embedder, &index)
            .with_cluster_config(ClusterConfig::default().with_num_clusters(2));

        let response = service.search(&SearchRequest::new("laser detection")).unwrap();
        assert_eq!(response.hits_returned, 5);
        assert_eq!(response.output.query, "laser detection");
        assert_eq!(response.output.record_count(), 5);
        assert!(!response.output.groups.is_empty() && response.output.groups.len() <= 2);
        assert!(response.timings.total_us >= response.timings.cluster_us);
        assert_eq!(embedder.calls.get(), 1);
    }

    #[test]
    fn test_top_k_limits_hits() {
        let embedder = KeywordEmbedder::new();
        let index = corpus(&embedder);
        let service = SearchService::new(&embedder, &index);

        let response = service
            .search(&SearchRequest::new("laser").with_top_k(2))
            .unwrap();
        assert_eq!(response.hits_returned, 2);
        let ids: Vec<i64> = response
            .output
            .groups
            .iter()
            .flat_map(|g| g.similar_patents.iter().map(|r| r.doc_id))
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1) && ids.contains(&2));
    }

    #[test]
    fn test_invalid_request_skips_embedding() {
        let embedder = KeywordEmbedder::new();
        let index = corpus(&embedder);
        let service = SearchService::new(&embedder, &index);

        let err = service.search(&SearchRequest::new("   ")).unwrap_err();
        assert_eq!(err, SearchError::Request(RequestError::EmptyQuery));
        assert_eq!(embedder.calls.get(), 0);
    }

    #[test]
    fn test_backend_failure_surfaces() {
        let embedder = KeywordEmbedder::new();
        let service = SearchService::new(&embedder, &FailingIndex);

        let err = service.search(&SearchRequest::new("laser")).unwrap_err();
        assert!(matches!(err, SearchError::Retrieval(RetrievalError::Backend(_))));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_empty_index_gives_empty_clusters() {
        let embedder = KeywordEmbedder::new();
        let index = MemoryIndex::new(3);
        let service = SearchService::new(&embedder, &index);

        let response = service.search(&SearchRequest::new("laser")).unwrap();
        assert_eq!(response.hits_returned, 0);
        assert_eq!(
            response.output.to_json(),
            serde_json::json!({"query": "laser", "clusters": {}})
        );
    }

    #[test]
    fn test_index_dimension_mismatch() {
        let embedder = KeywordEmbedder::new();
        let index = MemoryIndex::new(4);
        let service = SearchService::new(&embedder, &index);

        assert_eq!(
            service.search(&SearchRequest::new("laser")).unwrap_err(),
            SearchError::Retrieval(RetrievalError::DimensionMismatch { expected: 4, got: 3 })
        );
    }
}
