//! PageRank by power iteration.
//!
//! Uniform teleport vector, and the rank held by nodes without outgoing edges
//! is spread uniformly over all nodes each step. Convergence is reached when
//! the L1 change between iterations drops below `node_count * tolerance`.

use petgraph::Direction;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::config::CentralityConfig;

/// Why PageRank produced no result.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum CentralityError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("damping factor {0} is outside [0, 1]")]
    InvalidDamping(f64),

    #[error("power iteration did not converge within {0} iterations")]
    NoConvergence(usize),

    #[error("rank vector became non-finite")]
    NonFinite,
}

/// Rank of every node, indexed by `NodeIndex::index()`. Ranks sum to 1.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn page_rank<N, E>(
    graph: &DiGraph<N, E>,
    config: &CentralityConfig,
) -> Result<Vec<f64>, CentralityError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(CentralityError::EmptyGraph);
    }
    let alpha = config.damping;
    if !(0.0..=1.0).contains(&alpha) {
        return Err(CentralityError::InvalidDamping(alpha));
    }

    let uniform = 1.0 / n as f64;
    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.edges_directed(idx, Direction::Outgoing).count())
        .collect();

    let mut rank = vec![uniform; n];
    for _ in 0..config.max_iterations {
        let last = rank;
        let dangling_mass: f64 = alpha
            * last
                .iter()
                .zip(&out_degree)
                .filter(|&(_, &deg)| deg == 0)
                .map(|(r, _)| r)
                .sum::<f64>();

        let base = dangling_mass * uniform + (1.0 - alpha) * uniform;
        rank = vec![base; n];
        for edge in graph.edge_references() {
            let from = edge.source().index();
            rank[edge.target().index()] += alpha * last[from] / out_degree[from] as f64;
        }

        if rank.iter().any(|r| !r.is_finite()) {
            return Err(CentralityError::NonFinite);
        }

        let err: f64 = rank.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if err < n as f64 * config.tolerance {
            return Ok(rank);
        }
    }

    Err(CentralityError::NoConvergence(config.max_iterations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(n: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
        let mut graph = DiGraph::new();
        let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
        for &(a, b) in edges {
            graph.update_edge(nodes[a], nodes[b], ());
        }
        graph
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn empty_graph_is_an_error() {
        let graph = graph_from(0, &[]);

        assert_eq!(
            page_rank(&graph, &CentralityConfig::default()),
            Err(CentralityError::EmptyGraph)
        );
    }

    #[test]
    fn isolated_nodes_share_rank_equally() {
        let ranks = page_rank(&graph_from(4, &[]), &CentralityConfig::default()).unwrap();

        assert!(ranks.iter().all(|&r| close(r, 0.25)));
    }

    #[test]
    fn ranks_sum_to_one() {
        let graph = graph_from(5, &[(0, 1), (1, 2), (2, 0), (3, 2), (4, 4)]);

        let ranks = page_rank(&graph, &CentralityConfig::default()).unwrap();

        assert!(close(ranks.iter().sum::<f64>(), 1.0));
    }

    #[test]
    fn two_node_chain_matches_closed_form() {
        // a -> b, b dangling. Fixed point of
        //   a = 0.15/2 + 0.85 * b/2
        //   b = 0.15/2 + 0.85 * b/2 + 0.85 * a
        let ranks = page_rank(&graph_from(2, &[(0, 1)]), &CentralityConfig::default()).unwrap();

        assert!(close(ranks[0], 0.3509), "a = {}", ranks[0]);
        assert!(close(ranks[1], 0.6491), "b = {}", ranks[1]);
    }

    #[test]
    fn cycles_converge() {
        let graph = graph_from(3, &[(0, 1), (1, 2), (2, 0)]);

        let ranks = page_rank(&graph, &CentralityConfig::default()).unwrap();

        assert!(ranks.iter().all(|&r| close(r, 1.0 / 3.0)));
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let config = CentralityConfig {
            max_iterations: 1,
            ..CentralityConfig::default()
        };

        assert_eq!(
            page_rank(&graph_from(3, &[(0, 1), (1, 2)]), &config),
            Err(CentralityError::NoConvergence(1))
        );
    }

    #[test]
    fn out_of_range_damping_is_rejected() {
        let config = CentralityConfig {
            damping: 1.5,
            ..CentralityConfig::default()
        };

        assert!(matches!(
            page_rank(&graph_from(2, &[(0, 1)]), &config),
            Err(CentralityError::InvalidDamping(_))
        ));
    }
}
