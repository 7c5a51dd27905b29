//! Core data structures: retrieved records, result sets and grouped output.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Output key carrying the query string
pub const QUERY_KEY: &str = "query";
/// Output key used when there are no clusters
pub const CLUSTERS_KEY: &str = "clusters";

// =============================================================================
// Records
// =============================================================================

/// Kind of retrieved document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Patent,
    Research,
}

impl ItemType {
    /// Parse the index's type tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "patent" => Some(Self::Patent),
            "research" => Some(Self::Research),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patent => "patent",
            Self::Research => "research",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scored document returned by retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub doc_id: i64,
    pub title: String,
    pub score: f64,
    pub source: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub publication_date: String,
    /// Set once by the assembler; never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<usize>,
}

impl ResultRecord {
    pub fn new(doc_id: i64, title: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            doc_id,
            title: title.into(),
            score: 0.0,
            source: String::new(),
            item_type,
            publication_date: String::new(),
            cluster_id: None,
        }
    }

    pub fn patent(doc_id: i64, title: impl Into<String>) -> Self {
        Self::new(doc_id, title, ItemType::Patent)
    }

    pub fn research(doc_id: i64, title: impl Into<String>) -> Self {
        Self::new(doc_id, title, ItemType::Research)
    }

    /// Builder: set similarity score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Retrieval output split by item type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub query: String,
    #[serde(default)]
    pub similar_patents: Vec<ResultRecord>,
    #[serde(default)]
    pub similar_research: Vec<ResultRecord>,
}

impl ResultSet {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Total record count across both types
    pub fn len(&self) -> usize {
        self.similar_patents.len() + self.similar_research.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Patents then research, the row order of the feature matrix
    pub fn iter_all(&self) -> impl Iterator<Item = &ResultRecord> {
        self.similar_patents.iter().chain(self.similar_research.iter())
    }

    /// Append a record to the bucket matching its type
    pub fn push(&mut self, record: ResultRecord) {
        match record.item_type {
            ItemType::Patent => self.similar_patents.push(record),
            ItemType::Research => self.similar_research.push(record),
        }
    }
}

// =============================================================================
// Grouped Output
// =============================================================================

/// Records sharing one display label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledGroup {
    pub label: String,
    /// Cluster ids rendered under this label (more than one on a label collision)
    pub cluster_ids: Vec<usize>,
    pub similar_patents: Vec<ResultRecord>,
    pub similar_research: Vec<ResultRecord>,
}

impl LabeledGroup {
    pub fn new(label: impl Into<String>, cluster_id: usize) -> Self {
        Self {
            label: label.into(),
            cluster_ids: vec![cluster_id],
            similar_patents: Vec::new(),
            similar_research: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.similar_patents.len() + self.similar_research.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clustered search result
///
/// Serializes to `{"query": Q, "<label>": {"similar_patents": [..],
/// "similar_research": [..]}, ..}`, or `{"query": Q, "clusters": {}}` when
/// there is nothing to group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedOutput {
    pub query: String,
    pub groups: Vec<LabeledGroup>,
}

impl GroupedOutput {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            groups: Vec::new(),
        }
    }

    pub fn group(&self, label: &str) -> Option<&LabeledGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    /// Total records across all groups
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(LabeledGroup::len).sum()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Serialize)]
struct Bucket<'a> {
    similar_patents: &'a [ResultRecord],
    similar_research: &'a [ResultRecord],
}

impl Serialize for GroupedOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len().max(1) + 1))?;
        map.serialize_entry(QUERY_KEY, &self.query)?;
        if self.groups.is_empty() {
            map.serialize_entry(CLUSTERS_KEY, &serde_json::Map::new())?;
        }
        for group in &self.groups {
            let bucket = Bucket {
                similar_patents: &group.similar_patents,
                similar_research: &group.similar_research,
            };
            map.serialize_entry(&group.label, &bucket)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_type_tags() {
        assert_eq!(ItemType::from_tag("patent"), Some(ItemType::Patent));
        assert_eq!(ItemType::from_tag("research"), Some(ItemType::Research));
        assert_eq!(ItemType::from_tag("article"), None);
        assert_eq!(ItemType::Research.to_string(), "research");
    }

    #[test]
    fn test_record_serializes_type_field() {
        let mut record = ResultRecord::patent(7, "laser ranging system").with_score(0.9);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "patent");
        assert!(value.get("cluster_id").is_none());

        record.cluster_id = Some(1);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["cluster_id"], 1);
    }

    #[test]
    fn test_result_set_push_routes_by_type() {
        let mut set = ResultSet::new("q");
        set.push(ResultRecord::research(1, "a b"));
        set.push(ResultRecord::patent(2, "c d"));
        assert_eq!(set.similar_patents.len(), 1);
        assert_eq!(set.similar_research.len(), 1);
        let ids: Vec<i64> = set.iter_all().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_empty_output_shape() {
        let output = GroupedOutput::empty("laser");
        assert_eq!(output.to_json(), json!({"query": "laser", "clusters": {}}));
    }

    #[test]
    fn test_grouped_output_shape() {
        let mut group = LabeledGroup::new("laser / ranging", 0);
        let mut record = ResultRecord::patent(1, "laser ranging");
        record.cluster_id = Some(0);
        group.similar_patents.push(record);

        let output = GroupedOutput {
            query: "laser".to_string(),
            groups: vec![group],
        };
        let value = output.to_json();
        assert_eq!(value["query"], "laser");
        assert!(value.get("clusters").is_none());
        let bucket = &value["laser / ranging"];
        assert_eq!(bucket["similar_patents"][0]["doc_id"], 1);
        assert_eq!(bucket["similar_patents"][0]["cluster_id"], 0);
        assert_eq!(bucket["similar_research"], json!([]));
    }
}
