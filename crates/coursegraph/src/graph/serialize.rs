//! Conversion between [`CourseGraph`] and the node-link document.

use std::path::Path;

use tracing::{info, warn};

use super::CourseGraph;
use crate::error::{Error, Result};
use crate::persist::{read_json, write_json_atomic};
use crate::types::NodeLinkDocument;

impl CourseGraph {
    /// Node-link document for this graph.
    ///
    /// Nodes carry all of their attributes; links are `{source, target}` pairs.
    #[must_use]
    pub fn to_document(&self) -> NodeLinkDocument {
        NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: self.meta.clone(),
            nodes: self.nodes().cloned().collect(),
            links: self.links().collect(),
        }
    }

    /// Rebuild a graph from a node-link document.
    ///
    /// Node attributes are taken as-is; nothing is recomputed. Links whose
    /// endpoints are not nodes in the document are skipped.
    #[must_use]
    pub fn from_document(document: NodeLinkDocument) -> Self {
        let mut graph = Self::new();
        graph.meta = document.graph;
        for node in document.nodes {
            graph.add_node(node);
        }
        for link in &document.links {
            if !graph.add_edge(&link.source, &link.target) {
                warn!(
                    source = %link.source,
                    target = %link.target,
                    "Skipping link to a node missing from the document"
                );
            }
        }
        graph
    }

    /// Persist the graph as a node-link document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, &self.to_document())?;
        info!(
            path = %path.display(),
            nodes = self.node_count(),
            edges = self.edge_count(),
            "Saved graph"
        );
        Ok(())
    }

    /// Load a persisted node-link document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BaseDocument`] if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let document: NodeLinkDocument =
            read_json(path).map_err(|e| Error::base_document(path, e.to_string()))?;
        Ok(Self::from_document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, CourseNode, Link};
    use serde_json::{Map, Value};
    use tempfile::TempDir;

    fn node(code: &str, difficulty: f64) -> CourseNode {
        CourseNode {
            id: code.to_string(),
            title: format!("Course {code}"),
            description: "desc".to_string(),
            subject: code.split(' ').next().unwrap().to_string(),
            catalog_number: code.split(' ').nth(1).unwrap().to_string(),
            difficulty_score: difficulty,
            enjoyment_score: 6.4,
            comment_count: 3,
            confidence: Confidence::Medium,
            in_degree: 0,
            out_degree: 0,
            centrality: 0.1234,
            prerequisites: None,
            unlocks: None,
            score_source: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn document_lists_every_node_and_edge() {
        let mut graph = CourseGraph::new();
        graph.add_node(node("CS 2110", 6.0));
        graph.add_node(node("CS 3110", 7.2));
        graph.add_edge("CS 2110", "CS 3110");

        let doc = graph.to_document();

        assert!(doc.directed);
        assert!(!doc.multigraph);
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.links, vec![Link::new("CS 2110", "CS 3110")]);
    }

    #[test]
    fn document_json_uses_node_link_keys() {
        let mut graph = CourseGraph::new();
        graph.add_node(node("CS 2110", 6.0));

        let json = serde_json::to_value(graph.to_document()).unwrap();

        assert_eq!(json["nodes"][0]["id"], "CS 2110");
        assert_eq!(json["nodes"][0]["confidence"], "medium");
        assert!(json["links"].as_array().unwrap().is_empty());
        assert!(json["nodes"][0].get("unlocks").is_none());
    }

    #[test]
    fn dangling_links_are_skipped_on_load() {
        let doc = NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: Map::new(),
            nodes: vec![node("CS 2110", 6.0)],
            links: vec![Link::new("CS 1110", "CS 2110")],
        };

        let graph = CourseGraph::from_document(doc);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn save_and_load_preserve_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph_data.json");
        let mut graph = CourseGraph::new();
        graph.add_node(node("CS 2110", 6.0));
        graph.set_meta("built_at", "2025-09-01T00:00:00+00:00");

        graph.save(&path).unwrap();
        let loaded = CourseGraph::load(&path).unwrap();

        assert_eq!(
            loaded.meta().get("built_at"),
            Some(&Value::from("2025-09-01T00:00:00+00:00"))
        );
        assert_eq!(loaded.node("CS 2110"), graph.node("CS 2110"));
    }

    #[test]
    fn served_fields_and_unknown_fields_survive_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph_data.json");
        let mut rated = node("CS 3110", 3.9);
        rated.in_degree = 1;
        rated.out_degree = 1;
        rated.prerequisites = Some(vec!["CS 2110".to_string()]);
        rated.unlocks = Some(vec!["CS 4820".to_string()]);
        rated.score_source = Some("rating-overlay".to_string());
        rated.extra.insert("credits".to_string(), Value::from(4));
        rated
            .extra
            .insert("distribution".to_string(), serde_json::json!(["SMR-AS"]));
        let mut graph = CourseGraph::new();
        graph.add_node(node("CS 2110", 6.0));
        graph.add_node(rated);
        graph.add_edge("CS 2110", "CS 3110");

        graph.save(&path).unwrap();
        let loaded = CourseGraph::load(&path).unwrap();

        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.edge_count(), graph.edge_count());
        for original in graph.nodes() {
            assert_eq!(loaded.node(&original.id), Some(original), "{}", original.id);
        }
        let reloaded = loaded.node("CS 3110").unwrap();
        assert_eq!(reloaded.extra["credits"], Value::from(4));
        assert_eq!(reloaded.score_source.as_deref(), Some("rating-overlay"));
    }

    #[test]
    fn loading_malformed_document_is_base_document_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph_data.json");
        std::fs::write(&path, r#"{"links": []}"#).unwrap();

        assert!(matches!(
            CourseGraph::load(&path),
            Err(Error::BaseDocument { .. })
        ));
    }
}
