//! Result assembly: vectorize -> group -> label -> reshape
//!
//! Pure function of (query, patents, research, config). Works on an owned
//! copy of the records; `cluster_id` is written onto that copy only.

use ndarray::Array2;

use crate::cluster::kmeans::{KMeans, KMeansFit};
use crate::cluster::labeler::{fallback_label, ClusterLabeler, ClusterLabels};
use crate::config::ClusterConfig;
use crate::text::TfidfVectorizer;
use crate::types::{GroupedOutput, ItemType, LabeledGroup, ResultSet, CLUSTERS_KEY, QUERY_KEY};
use crate::{console_debug, console_warn};

/// Intermediate result of the grouping pass, before reshaping
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    /// Cluster id per record, patents first then research
    pub assignments: Vec<usize>,
    pub labels: ClusterLabels,
    pub inertia: f64,
}

impl ClusterAssignment {
    pub fn n_clusters(&self) -> usize {
        self.labels.len()
    }
}

/// Group and label the titles of `results`
///
/// Returns `None` when there are no records. Titles are read patents first,
/// then research; row i of the assignment is record i of that order.
pub fn assign_clusters(results: &ResultSet, config: &ClusterConfig) -> Option<ClusterAssignment> {
    let titles: Vec<&str> = results.iter_all().map(|r| r.title.as_str()).collect();
    let k = config.effective_k(titles.len());
    if k == 0 {
        return None;
    }

    // global fit drives assignment
    let mut vectorizer = TfidfVectorizer::new(config.stop_words);
    let features = vectorizer.fit_transform(&titles);

    let kmeans = KMeans::from_config(&ClusterConfig {
        num_clusters: k,
        ..config.clone()
    });
    // 1 <= k <= n here, so fit cannot fail
    let fit = fit_or_single_cluster(&kmeans, &features);

    // per-cluster refit drives labels
    let labels = ClusterLabeler::new(config).label_all(&titles, &fit.labels, k);

    console_debug!(
        "[assembler] {} records -> {} clusters (vocab {}, inertia {:.4})",
        titles.len(),
        k,
        vectorizer.feature_names().len(),
        fit.inertia
    );

    Some(ClusterAssignment {
        assignments: fit.labels,
        labels,
        inertia: fit.inertia,
    })
}

/// Cluster a retrieval result into labeled groups
///
/// Each record lands in the bucket named by its own `item_type`, not by the
/// list it arrived in: a research record passed in `similar_patents` comes
/// back under `similar_research`.
pub fn cluster_results(results: &ResultSet, config: &ClusterConfig) -> GroupedOutput {
    let Some(assignment) = assign_clusters(results, config) else {
        return GroupedOutput::empty(results.query.clone());
    };

    let display = display_labels(&assignment.labels);

    let mut records = results.clone();
    let (patent_ids, research_ids) = assignment
        .assignments
        .split_at(records.similar_patents.len());
    for (record, &cid) in records.similar_patents.iter_mut().zip(patent_ids) {
        record.cluster_id = Some(cid);
    }
    for (record, &cid) in records.similar_research.iter_mut().zip(research_ids) {
        record.cluster_id = Some(cid);
    }

    // one group per unique label, in cluster-id order of first appearance
    let mut groups: Vec<LabeledGroup> = Vec::new();
    let mut group_of_cluster: Vec<usize> = Vec::with_capacity(display.len());
    for (cluster_id, label) in display.iter().enumerate() {
        match groups.iter().position(|g| &g.label == label) {
            Some(existing) => {
                groups[existing].cluster_ids.push(cluster_id);
                group_of_cluster.push(existing);
            }
            None => {
                groups.push(LabeledGroup::new(label.clone(), cluster_id));
                group_of_cluster.push(groups.len() - 1);
            }
        }
    }

    let ResultSet {
        query,
        similar_patents,
        similar_research,
    } = records;
    for record in similar_patents.into_iter().chain(similar_research) {
        let Some(cid) = record.cluster_id else { continue };
        let group = &mut groups[group_of_cluster[cid]];
        match record.item_type {
            ItemType::Patent => group.similar_patents.push(record),
            ItemType::Research => group.similar_research.push(record),
        }
    }

    GroupedOutput { query, groups }
}

/// Labels as rendered in the output map, with reserved keys disambiguated
fn display_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .map(|(cluster_id, label)| {
            if label == QUERY_KEY || label == CLUSTERS_KEY {
                format!("{} / {}", label, fallback_label(cluster_id))
            } else {
                label.clone()
            }
        })
        .collect()
}

/// Run `kmeans`, or put every row in cluster 0 if the fit is rejected
fn fit_or_single_cluster(kmeans: &KMeans, features: &Array2<f64>) -> KMeansFit {
    match kmeans.fit(features) {
        Ok(fit) => fit,
        Err(e) => {
            console_warn!(
                "[assembler] k-means rejected {} rows ({}); using one cluster",
                features.nrows(),
                e
            );
            KMeansFit {
                labels: vec![0; features.nrows()],
                centroids: Array2::zeros((1, features.ncols().max(1))),
                inertia: 0.0,
                iterations: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultRecord;

    #[test]
    fn test_display_labels_escape_reserved_keys() {
        let labels = vec!["query".to_string(), "laser".to_string(), "clusters".to_string()];
        assert_eq!(
            display_labels(&labels),
            vec!["query / Cluster_0", "laser", "clusters / Cluster_2"]
        );
    }

    #[test]
    fn test_assign_clusters_empty() {
        let results = ResultSet::new("q");
        assert!(assign_clusters(&results, &ClusterConfig::default()).is_none());
    }

    #[test]
    fn test_assignment_row_order_is_patents_then_research() {
        let mut results = ResultSet::new("q");
        results.push(ResultRecord::research(10, "radar signal processing"));
        results.push(ResultRecord::patent(1, "laser ranging"));
        results.push(ResultRecord::patent(2, "laser ranging"));

        let config = ClusterConfig::default().with_num_clusters(2);
        let assignment = assign_clusters(&results, &config).unwrap();
        assert_eq!(assignment.assignments.len(), 3);
        // the two identical patent titles are rows 0 and 1
        assert_eq!(assignment.assignments[0], assignment.assignments[1]);
        assert_ne!(assignment.assignments[0], assignment.assignments[2]);
        assert_eq!(assignment.n_clusters(), 2);
    }

    #[test]
    fn test_rejected_fit_degrades_to_one_cluster() {
        let features = Array2::<f64>::zeros((3, 2));
        let fit = fit_or_single_cluster(&KMeans::new(5), &features);
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert_eq!(fit.n_clusters(), 1);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let mut results = ResultSet::new("q");
        results.push(ResultRecord::patent(1, "laser ranging"));
        let before = results.clone();
        let _ = cluster_results(&results, &ClusterConfig::default());
        assert_eq!(results, before);
        assert!(results.similar_patents[0].cluster_id.is_none());
    }
}
