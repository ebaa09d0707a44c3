//! The course prerequisite graph.
//!
//! [`CourseGraph`] is a petgraph adjacency list plus a map from course code to
//! node index. Edges point from prerequisite to dependent course, so a node's
//! in-degree is its number of prerequisites and its out-degree the number of
//! courses it unlocks.
//!
//! The graph is a simple digraph: adding an edge that already exists is a
//! no-op. Cycles are allowed; nothing here walks the graph without a bound.

mod builder;
mod pagerank;
mod serialize;

pub use builder::{GraphBuilder, load_catalog, load_sentiment};

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::CentralityConfig;
use crate::types::{CourseNode, Link};

/// Directed prerequisite graph keyed by course code.
#[derive(Debug, Clone, Default)]
pub struct CourseGraph {
    graph: DiGraph<CourseNode, ()>,
    node_map: HashMap<String, NodeIndex>,
    meta: Map<String, Value>,
}

/// Aggregate numbers describing a built graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSummary {
    /// Number of courses
    pub nodes: usize,
    /// Number of prerequisite edges
    pub edges: usize,
    /// Mean number of prerequisites per course
    pub avg_in_degree: f64,
    /// Mean number of unlocked courses per course
    pub avg_out_degree: f64,
}

impl CourseGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. A node with the same code replaces the attributes of the
    /// existing one and keeps its edges.
    ///
    /// Returns `true` if the code was not present before.
    pub fn add_node(&mut self, node: CourseNode) -> bool {
        if let Some(&idx) = self.node_map.get(&node.id) {
            self.graph[idx] = node;
            return false;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_map.insert(id, idx);
        true
    }

    /// Add an edge `prerequisite -> course`.
    ///
    /// Returns `false` without touching the graph if either endpoint is not a
    /// node. Adding an edge that already exists is allowed and changes nothing.
    pub fn add_edge(&mut self, prerequisite: &str, course: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.node_map.get(prerequisite), self.node_map.get(course))
        else {
            return false;
        };
        self.graph.update_edge(from, to, ());
        true
    }

    /// Whether a course code is a node.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.node_map.contains_key(code)
    }

    /// Node attributes for a course code.
    #[must_use]
    pub fn node(&self, code: &str) -> Option<&CourseNode> {
        self.node_map.get(code).map(|&idx| &self.graph[idx])
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &CourseNode> {
        self.graph.node_weights()
    }

    /// All edges as `(prerequisite, course)` links, in insertion order.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.graph.edge_references().map(|edge| {
            Link::new(
                self.graph[edge.source()].id.clone(),
                self.graph[edge.target()].id.clone(),
            )
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct prerequisites of a course.
    #[must_use]
    pub fn prerequisites_of(&self, code: &str) -> Vec<&str> {
        self.neighbors(code, Direction::Incoming)
    }

    /// Courses that list `code` as a direct prerequisite.
    #[must_use]
    pub fn unlocks_of(&self, code: &str) -> Vec<&str> {
        self.neighbors(code, Direction::Outgoing)
    }

    /// Graph-level metadata carried into the node-link document.
    #[must_use]
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Set a graph-level metadata entry.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.meta.insert(key.into(), value.into());
    }

    /// Node, edge and average degree counts.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        let nodes = self.node_count();
        let edges = self.edge_count();
        // Every edge adds one to some in-degree and one to some out-degree.
        #[allow(clippy::cast_precision_loss)]
        let avg = if nodes == 0 {
            0.0
        } else {
            edges as f64 / nodes as f64
        };
        GraphSummary {
            nodes,
            edges,
            avg_in_degree: avg,
            avg_out_degree: avg,
        }
    }

    /// Recompute in/out degree and centrality on every node from the edges
    /// currently in the graph.
    ///
    /// Centrality falls back to 0.0 everywhere if PageRank cannot produce a
    /// result.
    pub fn refresh_metrics(&mut self, centrality: &CentralityConfig) {
        let ranks = match pagerank::page_rank(&self.graph, centrality) {
            Ok(ranks) => Some(ranks),
            Err(e) => {
                warn!(error = %e, "Could not calculate PageRank - using default values");
                None
            }
        };

        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            let in_degree = self.graph.edges_directed(idx, Direction::Incoming).count();
            let out_degree = self.graph.edges_directed(idx, Direction::Outgoing).count();
            let rank = ranks
                .as_ref()
                .map_or(0.0, |ranks| round_to(ranks[idx.index()], 4));

            let node = &mut self.graph[idx];
            node.in_degree = in_degree;
            node.out_degree = out_degree;
            node.centrality = rank;
        }
    }

    fn neighbors(&self, code: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(code) else {
            return Vec::new();
        };
        let mut found: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].id.as_str())
            .collect();
        // petgraph yields neighbours newest-edge first
        found.reverse();
        found
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
