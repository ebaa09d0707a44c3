//! Batch construction of the base graph from the scraped catalog.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::CourseGraph;
use crate::config::CentralityConfig;
use crate::error::{Error, Result};
use crate::persist::{read_json, read_optional_json};
use crate::resolver::PrerequisiteResolver;
use crate::types::{CatalogCourse, CatalogFile, CourseNode, SentimentMap, SentimentRecord};

/// Progress is logged every this many courses.
const PROGRESS_INTERVAL: usize = 50;

/// Builds a [`CourseGraph`] from catalog records and base sentiment.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    resolver: PrerequisiteResolver,
    centrality: CentralityConfig,
}

impl GraphBuilder {
    /// Create a builder.
    #[must_use]
    pub fn new(resolver: PrerequisiteResolver, centrality: CentralityConfig) -> Self {
        Self {
            resolver,
            centrality,
        }
    }

    /// Build the graph.
    ///
    /// One node per catalog record; courses missing from `sentiment` get the
    /// neutral record. Prerequisite codes that are not nodes are dropped.
    /// Degrees and centrality are computed from the edges actually added.
    #[must_use]
    pub fn build(&self, courses: &[CatalogCourse], sentiment: &SentimentMap) -> CourseGraph {
        let mut graph = CourseGraph::new();
        let neutral = SentimentRecord::neutral();
        let total = courses.len();

        info!(courses = total, "Building graph");

        for (i, course) in courses.iter().enumerate() {
            let record = sentiment.get(&course.course_id).unwrap_or(&neutral);
            if !graph.add_node(CourseNode::from_catalog(course, record)) {
                debug!(course = %course.course_id, "Duplicate catalog record replaces earlier one");
            }
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Added {}/{} nodes...", i + 1, total);
            }
        }
        info!(nodes = graph.node_count(), "Added course nodes");

        let mut dropped = 0usize;
        for (i, course) in courses.iter().enumerate() {
            if !course.prerequisites.trim().is_empty() {
                for prereq in self.resolver.resolve(&course.prerequisites) {
                    if !graph.add_edge(&prereq, &course.course_id) {
                        debug!(
                            course = %course.course_id,
                            prerequisite = %prereq,
                            "Dropping prerequisite outside the catalog"
                        );
                        dropped += 1;
                    }
                }
            }
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("  Processed {}/{} prerequisites...", i + 1, total);
            }
        }
        info!(
            edges = graph.edge_count(),
            dropped, "Added prerequisite edges"
        );

        graph.refresh_metrics(&self.centrality);

        graph.set_meta("built_at", Utc::now().to_rfc3339());
        graph.set_meta("node_count", graph.node_count());
        graph.set_meta("edge_count", graph.edge_count());

        let summary = graph.summary();
        info!(
            nodes = summary.nodes,
            edges = summary.edges,
            avg_in_degree = %format!("{:.2}", summary.avg_in_degree),
            avg_out_degree = %format!("{:.2}", summary.avg_out_degree),
            "Graph summary"
        );

        graph
    }
}

/// Load the course catalog.
///
/// # Errors
///
/// The catalog is the one mandatory build input: a missing, unreadable or
/// malformed file is [`Error::Catalog`].
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogCourse>> {
    let file: CatalogFile = read_json(path).map_err(|e| Error::catalog(path, e.to_string()))?;
    let courses = file.into_courses();
    info!(path = %path.display(), courses = courses.len(), "Loaded course catalog");
    Ok(courses)
}

/// Load the base sentiment map.
///
/// Never fails: a missing or malformed file means every course gets neutral
/// sentiment.
#[must_use]
pub fn load_sentiment(path: &Path) -> SentimentMap {
    match read_optional_json::<SentimentMap>(path) {
        Ok(Some(map)) => {
            info!(path = %path.display(), courses = map.len(), "Loaded sentiment scores");
            map
        }
        Ok(None) => {
            warn!(path = %path.display(), "Sentiment file not found - using neutral sentiment scores");
            SentimentMap::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable sentiment file - using neutral sentiment scores");
            SentimentMap::new()
        }
    }
}
