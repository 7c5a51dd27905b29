//! Configuration types and defaults for clustering and search.

use serde::{Deserialize, Serialize};

/// Separator placed between the top terms of a cluster label
pub const DEFAULT_LABEL_SEPARATOR: &str = " / ";

// =============================================================================
// Stop Words
// =============================================================================

/// Which stop-word list the vectorizer filters with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    /// Built-in English list
    #[default]
    English,
    /// Keep every token
    None,
}

// =============================================================================
// Cluster Configuration
// =============================================================================

/// Parameters for the TF-IDF + k-means grouping and labeling pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Requested cluster count. Effective k is min(num_clusters, records). Default: 5
    pub num_clusters: usize,
    /// Independent k-means++ restarts; lowest inertia wins. Default: 10, values below 10 are raised to 10
    pub n_init: usize,
    /// Lloyd iteration cap per restart. Default: 300
    pub max_iter: usize,
    /// Relative centroid-shift tolerance for convergence. Default: 1e-4
    pub tol: f64,
    /// Seed for centroid initialization. Default: 42
    pub seed: u64,
    /// Terms per label. Default: 3
    pub top_terms: usize,
    /// Label term separator. Default: " / "
    pub label_separator: String,
    /// Stop-word list used by both TF-IDF passes
    pub stop_words: StopWords,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            num_clusters: 5,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
            top_terms: 3,
            label_separator: DEFAULT_LABEL_SEPARATOR.to_string(),
            stop_words: StopWords::default(),
        }
    }
}

impl ClusterConfig {
    /// Builder: set requested cluster count
    pub fn with_num_clusters(mut self, num_clusters: usize) -> Self {
        self.num_clusters = num_clusters;
        self
    }

    /// Builder: set initialization seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder: set number of restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Builder: set terms per label
    pub fn with_top_terms(mut self, top_terms: usize) -> Self {
        self.top_terms = top_terms;
        self
    }

    /// Effective cluster count for `n_records` records
    ///
    /// Never exceeds the record count and is at least 1 whenever a record exists.
    pub fn effective_k(&self, n_records: usize) -> usize {
        if n_records == 0 {
            return 0;
        }
        self.num_clusters.clamp(1, n_records)
    }
}

// =============================================================================
// Search Configuration
// =============================================================================

/// Request-level search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result count when the request does not set one. Default: 10
    pub default_top_k: usize,
    /// Upper bound accepted for `top_k`. Default: 100
    pub max_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            max_top_k: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cluster_config() {
        let config = ClusterConfig::default();
        assert_eq!(config.num_clusters, 5);
        assert_eq!(config.n_init, 10);
        assert_eq!(config.seed, 42);
        assert_eq!(config.top_terms, 3);
        assert_eq!(config.label_separator, " / ");
        assert_eq!(config.stop_words, StopWords::English);
    }

    #[test]
    fn test_effective_k() {
        let config = ClusterConfig::default();
        assert_eq!(config.effective_k(0), 0);
        assert_eq!(config.effective_k(1), 1);
        assert_eq!(config.effective_k(3), 3);
        assert_eq!(config.effective_k(50), 5);

        let zero = ClusterConfig::default().with_num_clusters(0);
        assert_eq!(zero.effective_k(4), 1);
    }

    #[test]
    fn test_builders() {
        let config = ClusterConfig::default()
            .with_num_clusters(2)
            .with_seed(7)
            .with_n_init(20)
            .with_top_terms(2);
        assert_eq!(config.n_init, 20);
        assert_eq!(config.num_clusters, 2);
        assert_eq!(config.seed, 7);
        assert_eq!(config.top_terms, 2);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ClusterConfig = serde_json::from_str(r#"{"num_clusters": 2}"#).unwrap();
        assert_eq!(config.num_clusters, 2);
        assert_eq!(config.n_init, 10);

        let search: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(search.default_top_k, 10);
    }
}
