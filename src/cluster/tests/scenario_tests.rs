use crate::cluster::cluster_results;
use crate::config::ClusterConfig;
use crate::text::TermTokenizer;
use crate::types::{ResultRecord, ResultSet};
use std::collections::HashSet;

fn laser_detection_results() -> ResultSet {
    let mut set = ResultSet::new("laser detection");
    set.push(ResultRecord::patent(1, "laser ranging system").with_score(0.91));
    set.push(ResultRecord::patent(2, "laser detection method").with_score(0.88));
    set.push(ResultRecord::patent(3, "optical sensor array").with_score(0.74));
    set.push(ResultRecord::research(4, "radar signal processing").with_score(0.61));
    set.push(ResultRecord::research(5, "photonic sensor design").with_score(0.59));
    set
}

#[test]
fn test_laser_detection_two_clusters() {
    let set = laser_detection_results();
    let output = cluster_results(&set, &ClusterConfig::default().with_num_clusters(2));

    assert_eq!(output.query, "laser detection");
    assert_eq!(output.groups.len(), 2);

    // labels only use terms from the input titles
    let tokenizer = TermTokenizer::default();
    let vocabulary: HashSet<String> = set
        .iter_all()
        .flat_map(|r| tokenizer.tokenize(&r.title))
        .collect();
    for group in &output.groups {
        assert!(!group.label.starts_with("Cluster_"));
        let terms: Vec<&str> = group.label.split(" / ").collect();
        assert!(!terms.is_empty() && terms.len() <= 3);
        for term in terms {
            assert!(vocabulary.contains(term), "unexpected label term {:?}", term);
        }
    }

    // all five records, exactly once, in the right bucket type
    let mut patents: Vec<i64> = output
        .groups
        .iter()
        .flat_map(|g| g.similar_patents.iter().map(|r| r.doc_id))
        .collect();
    let mut research: Vec<i64> = output
        .groups
        .iter()
        .flat_map(|g| g.similar_research.iter().map(|r| r.doc_id))
        .collect();
    patents.sort_unstable();
    research.sort_unstable();
    assert_eq!(patents, vec![1, 2, 3]);
    assert_eq!(research, vec![4, 5]);
}

#[test]
fn test_laser_titles_share_a_cluster() {
    let set = laser_detection_results();
    let output = cluster_results(&set, &ClusterConfig::default().with_num_clusters(2));

    let laser_group = output
        .groups
        .iter()
        .find(|g| g.similar_patents.iter().any(|r| r.doc_id == 1))
        .unwrap();
    assert!(laser_group.similar_patents.iter().any(|r| r.doc_id == 2));
    assert!(laser_group.label.split(" / ").any(|t| t == "laser"));
}

#[test]
fn test_scenario_is_deterministic() {
    let set = laser_detection_results();
    let config = ClusterConfig::default().with_num_clusters(2);
    let first = cluster_results(&set, &config).to_json();
    for _ in 0..3 {
        assert_eq!(cluster_results(&set, &config).to_json(), first);
    }
}
