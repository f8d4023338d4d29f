//! Specimen portal response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A portal record: NHash id, NIMP category and the raw field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub record: Map<String, Value>,
}

/// Body of the `info` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResponse {
    pub data: NodeRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub has_parent: Option<Vec<String>>,
    #[serde(default)]
    pub has_child: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub edges: Edges,
}

/// Body of the `ancestors` and `descendants` endpoints, keyed by NHash id
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphResponse {
    #[serde(default)]
    pub data: BTreeMap<String, GraphNode>,
}

impl GraphResponse {
    /// Parents recorded for a node of the graph
    pub fn parents_of(&self, nhash_id: &str) -> Option<Vec<String>> {
        self.data
            .get(nhash_id)
            .and_then(|node| node.edges.has_parent.clone())
    }
}

/// Optional donor search filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorQuery {
    pub donor_local_id: Option<String>,
    pub donor_nhash_id: Option<String>,
    pub age_of_death: Option<String>,
    pub ethnicity: Option<String>,
    pub race: Option<String>,
    pub sex: Option<String>,
    pub species: Option<String>,
}

impl DonorQuery {
    /// Filters that are set, in a fixed order
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        [
            ("donor_local_id", &self.donor_local_id),
            ("donor_nhash_id", &self.donor_nhash_id),
            ("age_of_death", &self.age_of_death),
            ("ethnicity", &self.ethnicity),
            ("race", &self.race),
            ("sex", &self.sex),
            ("species", &self.species),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graph_response_parents() {
        let graph: GraphResponse = serde_json::from_value(json!({
            "data": {
                "LA-1": {"edges": {"has_parent": ["LI-1"]}},
                "DO-1": {"edges": {"has_parent": null}}
            }
        }))
        .unwrap();
        assert_eq!(graph.parents_of("LA-1"), Some(vec!["LI-1".to_string()]));
        assert_eq!(graph.parents_of("DO-1"), None);
        assert_eq!(graph.parents_of("missing"), None);
    }

    #[test]
    fn test_donor_query_params_skip_unset() {
        let query = DonorQuery {
            species: Some("NCBITaxon:10090".to_string()),
            sex: Some("2".to_string()),
            ..Default::default()
        };
        assert_eq!(query.params(), vec![("sex", "2"), ("species", "NCBITaxon:10090")]);
    }
}
