//! Topic clustering of retrieval results
//!
//! ```text
//! ResultSet -> titles -> TF-IDF -> KMeans -> per-cluster TF-IDF -> labels
//!                                                                    ↓
//!                         GroupedOutput { query, label -> {patents, research} }
//! ```

pub mod assembler;
pub mod kmeans;
pub mod labeler;

pub use assembler::{assign_clusters, cluster_results, ClusterAssignment};
pub use kmeans::{ClusterError, KMeans, KMeansFit, MIN_N_INIT};
pub use labeler::{fallback_label, ClusterLabeler, ClusterLabels, WeightedTerm};

#[cfg(test)]
mod tests;
