//! techsearch-core: Topic clustering for patent & research search results
//!
//! A Rust/WASM implementation of the post-retrieval half of a technology
//! search service: given the documents a vector index returned for a query,
//! group them by title content and name each group.
//!
//! # Architecture
//!
//! ## Clustering Core
//! - `text/` - Tokenizer, English stop words, TF-IDF vectorizer
//! - `cluster/kmeans.rs` - Seeded k-means++ / Lloyd with restarts
//! - `cluster/labeler.rs` - Per-cluster TF-IDF refit, top-term labels
//! - `cluster/assembler.rs` - `cluster_results`: vectorize, group, label, reshape
//! - `types.rs` - ResultRecord, ResultSet, GroupedOutput (JSON contract)
//! - `config.rs` - ClusterConfig, SearchConfig
//!
//! ## Search Pipeline
//! - `embeddings/` - ONNX query embedding (tract) behind `QueryEmbedder`
//! - `retrieval/` - `VectorSearch` contract, hit partitioning, MemoryIndex
//! - `request.rs` - SearchRequest validation
//! - `service.rs` - SearchService: validate -> embed -> retrieve -> cluster
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { ClusterCortex } from 'techsearch-core';
//!
//! await init();
//!
//! const cortex = ClusterCortex.withConfig({ cluster: { num_clusters: 3 } });
//!
//! // Cluster results you already have
//! const grouped = cortex.clusterResults({
//!   query: 'laser detection',
//!   similar_patents: [{ doc_id: 1, title: 'laser ranging system', score: 0.91,
//!                       source: 'uspto', type: 'patent', publication_date: '2021-03-04' }],
//!   similar_research: [],
//! });
//!
//! // Or run the whole search with a JS-side vector index
//! cortex.loadModel(onnxBytes, tokenizerJson);
//! const result = await cortex.search('laser detection', 10,
//!   (vector, limit) => index.query(vector, limit));
//! console.log(result.clusters ?? Object.keys(result));
//! ```

pub mod logging;

pub mod cluster;
pub mod config;
pub mod embeddings;
pub mod request;
pub mod retrieval;
pub mod service;
pub mod text;
pub mod types;
pub mod wasm;

// Public exports - Clustering
pub use cluster::{assign_clusters, cluster_results, ClusterAssignment, ClusterError, KMeans};
pub use config::{ClusterConfig, SearchConfig, StopWords};
pub use text::TfidfVectorizer;
pub use types::{GroupedOutput, ItemType, LabeledGroup, ResultRecord, ResultSet};

// Public exports - Search pipeline
pub use embeddings::{EmbedConfig, EmbedError, EmbedModel, QueryEmbedder};
pub use request::{RequestError, SearchRequest};
pub use retrieval::{partition_hits, MemoryIndex, RetrievalError, SearchHit, VectorSearch};
pub use service::{SearchError, SearchResponse, SearchService, SearchTimings};
pub use wasm::{ClusterCortex, CortexConfig};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("techsearch-core v{}", env!("CARGO_PKG_VERSION"))
}
