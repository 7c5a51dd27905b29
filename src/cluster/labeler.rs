//! Cluster labeling
//!
//! Each cluster gets a fresh TF-IDF fit over its own titles only. Term weights
//! are averaged across the cluster's rows and the top terms, joined with the
//! configured separator, become the label.
//!
//! Ordering: descending average weight, then ascending term. Terms with zero
//! weight are never used. Clusters with no titles, or whose titles reduce to
//! an empty vocabulary, fall back to `Cluster_<id>`.

use ndarray::Axis;

use crate::config::ClusterConfig;
use crate::text::TfidfVectorizer;

/// One label per cluster id
pub type ClusterLabels = Vec<String>;

/// Label used when a cluster yields no terms
pub fn fallback_label(cluster_id: usize) -> String {
    format!("Cluster_{}", cluster_id)
}

/// A term with its cluster-averaged TF-IDF weight
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

pub struct ClusterLabeler<'a> {
    config: &'a ClusterConfig,
}

impl<'a> ClusterLabeler<'a> {
    pub fn new(config: &'a ClusterConfig) -> Self {
        ClusterLabeler { config }
    }

    /// Top weighted terms of `titles`, at most `config.top_terms`
    pub fn top_terms<S: AsRef<str>>(&self, titles: &[S]) -> Vec<WeightedTerm> {
        if titles.is_empty() {
            return vec![];
        }

        let mut vectorizer = TfidfVectorizer::new(self.config.stop_words);
        let matrix = vectorizer.fit_transform(titles);
        if vectorizer.is_degenerate() {
            return vec![];
        }

        let Some(averages) = matrix.mean_axis(Axis(0)) else {
            return vec![];
        };

        let mut scored: Vec<WeightedTerm> = vectorizer
            .feature_names()
            .iter()
            .zip(averages.iter())
            .filter(|(_, &w)| w > 0.0)
            .map(|(term, &weight)| WeightedTerm {
                term: term.clone(),
                weight,
            })
            .collect();

        // feature names are already sorted, so a stable sort keeps ties alphabetical
        scored.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.config.top_terms);
        scored
    }

    /// Label for one cluster given its member titles
    pub fn label<S: AsRef<str>>(&self, cluster_id: usize, titles: &[S]) -> String {
        let terms = self.top_terms(titles);
        if terms.is_empty() {
            return fallback_label(cluster_id);
        }
        terms
            .iter()
            .map(|t| t.term.as_str())
            .collect::<Vec<_>>()
            .join(&self.config.label_separator)
    }

    /// One label per cluster id in [0, k)
    ///
    /// `assignments[i]` is the cluster of `titles[i]`.
    pub fn label_all<S: AsRef<str>>(&self, titles: &[S], assignments: &[usize], k: usize) -> ClusterLabels {
        (0..k)
            .map(|cluster_id| {
                let members: Vec<&str> = titles
                    .iter()
                    .zip(assignments)
                    .filter(|(_, &c)| c == cluster_id)
                    .map(|(t, _)| t.as_ref())
                    .collect();
                self.label(cluster_id, &members)
            })
            .collect()
    }
}
