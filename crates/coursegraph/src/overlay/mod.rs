//! Overlay merge: the served view of the graph.
//!
//! The persisted base graph is combined at read time with up to two optional
//! overlays, in this order:
//!
//! 1. **Rating overlay**: a non-null `avg_difficulty` / `avg_enjoyment`
//!    replaces the node's base score. Nodes changed this way are tagged
//!    `score_source = "rating-overlay"`.
//! 2. **Prerequisite overlay**: replaces the graph's edges for the served view.
//!    Each node gets `prerequisites`, `unlocks` and degrees computed from the
//!    overlay, and `links` is rebuilt from it.
//!
//! Only nodes present in the base document are touched, and the base document
//! on disk is never written. A missing or malformed overlay is reported as an
//! [`OverlayWarning`] and merging continues without it. Without a prerequisite
//! overlay every node is served with empty `prerequisites`/`unlocks` and zero
//! degrees, and the base `links` are kept.

mod cache;

pub use cache::CachedDocument;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::DataConfig;
use crate::error::{Error, OverlayKind, OverlayWarning, Result};
use crate::types::{
    CourseNode, Link, NodeLinkDocument, PrerequisiteOverlay, RATING_OVERLAY_SOURCE, RatingOverlay,
};

/// A served document plus any overlay problems met while building it.
#[derive(Debug, Clone)]
pub struct ServedGraph {
    /// The annotated node-link document
    pub document: NodeLinkDocument,
    /// Overlays that were skipped, and why
    pub warnings: Vec<OverlayWarning>,
}

/// Serves the annotated graph, caching the base document and overlays between
/// requests.
#[derive(Debug)]
pub struct OverlayMergeEngine {
    base: CachedDocument<NodeLinkDocument>,
    ratings: Option<CachedDocument<RatingOverlay>>,
    prerequisites: Option<CachedDocument<PrerequisiteOverlay>>,
}

impl OverlayMergeEngine {
    /// Engine reading the base graph from `base_path`, with no overlays.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base: CachedDocument::new(base_path),
            ratings: None,
            prerequisites: None,
        }
    }

    /// Engine using the data file locations from configuration.
    #[must_use]
    pub fn from_config(data: &DataConfig) -> Self {
        Self::new(data.graph_path())
            .with_ratings(data.ratings_path())
            .with_prerequisites(data.prerequisites_path())
    }

    /// Read the rating overlay from `path`.
    #[must_use]
    pub fn with_ratings(mut self, path: impl Into<PathBuf>) -> Self {
        self.ratings = Some(CachedDocument::new(path));
        self
    }

    /// Read the prerequisite overlay from `path`.
    #[must_use]
    pub fn with_prerequisites(mut self, path: impl Into<PathBuf>) -> Self {
        self.prerequisites = Some(CachedDocument::new(path));
        self
    }

    /// Build the served graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BaseDocument`] if the base graph is missing or
    /// malformed. Overlay problems never fail the call.
    pub fn serve(&mut self) -> Result<ServedGraph> {
        let base = self.base()?;

        let mut warnings = Vec::new();
        let ratings = load_overlay(self.ratings.as_mut(), OverlayKind::Ratings, &mut warnings);
        let prerequisites = load_overlay(
            self.prerequisites.as_mut(),
            OverlayKind::Prerequisites,
            &mut warnings,
        );

        let document = merge_overlays(&base, ratings.as_deref(), prerequisites.as_deref());
        Ok(ServedGraph { document, warnings })
    }

    /// The persisted base document, without overlays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BaseDocument`] if the base graph is missing or
    /// malformed.
    pub fn base(&mut self) -> Result<Arc<NodeLinkDocument>> {
        match self.base.get() {
            Ok(Some(base)) => Ok(base),
            Ok(None) => Err(Error::base_document(
                self.base.path(),
                "not found; run the graph build first",
            )),
            Err(e) => Err(Error::base_document(self.base.path(), e.to_string())),
        }
    }

    /// Current rating overlay, if present and readable.
    pub fn ratings(&mut self) -> Option<Arc<RatingOverlay>> {
        let mut ignored = Vec::new();
        load_overlay(self.ratings.as_mut(), OverlayKind::Ratings, &mut ignored)
    }

    /// Drop every cached document so the next call re-reads all files.
    pub fn reload(&mut self) {
        self.base.invalidate();
        if let Some(ratings) = &mut self.ratings {
            ratings.invalidate();
        }
        if let Some(prerequisites) = &mut self.prerequisites {
            prerequisites.invalidate();
        }
        info!("Cached graph documents invalidated");
    }
}

fn load_overlay<T: DeserializeOwned>(
    cache: Option<&mut CachedDocument<T>>,
    kind: OverlayKind,
    warnings: &mut Vec<OverlayWarning>,
) -> Option<Arc<T>> {
    let cache = cache?;
    match cache.get() {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!(path = %cache.path().display(), "No {kind} file");
            None
        }
        Err(e) => {
            let warning = OverlayWarning::new(kind, cache.path(), e.to_string());
            warn!("Ignoring {warning}");
            warnings.push(warning);
            None
        }
    }
}

/// Merge overlays onto a copy of `base`.
#[must_use]
pub fn merge_overlays(
    base: &NodeLinkDocument,
    ratings: Option<&RatingOverlay>,
    prerequisites: Option<&PrerequisiteOverlay>,
) -> NodeLinkDocument {
    let mut document = base.clone();

    if let Some(ratings) = ratings {
        let overridden = apply_ratings(&mut document.nodes, ratings);
        debug!(overridden, "Applied rating overlay");
    }

    match prerequisites {
        Some(overlay) => apply_prerequisites(&mut document, overlay),
        None => {
            for node in &mut document.nodes {
                set_edges(node, Vec::new(), Vec::new());
            }
        }
    }

    document
}

/// Replace base scores with rating averages. Returns the number of nodes
/// changed.
pub fn apply_ratings(nodes: &mut [CourseNode], ratings: &RatingOverlay) -> usize {
    let mut overridden = 0;
    for node in nodes {
        let Some(record) = ratings.get(&node.id) else {
            continue;
        };
        let mut changed = false;
        if let Some(difficulty) = record.avg_difficulty {
            node.difficulty_score = difficulty;
            changed = true;
        }
        if let Some(enjoyment) = record.avg_enjoyment {
            node.enjoyment_score = enjoyment;
            changed = true;
        }
        if changed {
            node.score_source = Some(RATING_OVERLAY_SOURCE.to_string());
            overridden += 1;
        }
    }
    overridden
}

/// Annotate nodes and rebuild `links` from a prerequisite overlay.
///
/// Per-node lists are taken from the overlay verbatim. Links are only emitted
/// between nodes that exist in the document.
pub fn apply_prerequisites(document: &mut NodeLinkDocument, overlay: &PrerequisiteOverlay) {
    let mut unlocks: HashMap<&str, Vec<String>> = HashMap::new();
    for (course, prereqs) in overlay.iter() {
        for prereq in prereqs {
            unlocks
                .entry(prereq.as_str())
                .or_default()
                .push(course.to_string());
        }
    }

    for node in &mut document.nodes {
        let prereqs = overlay.get(&node.id).map(<[String]>::to_vec).unwrap_or_default();
        let unlocked = unlocks.get(node.id.as_str()).cloned().unwrap_or_default();
        set_edges(node, prereqs, unlocked);
    }

    let known: HashSet<&str> = document.nodes.iter().map(|n| n.id.as_str()).collect();
    let known = &known;
    let links: Vec<Link> = overlay
        .iter()
        .filter(|(course, _)| known.contains(course))
        .flat_map(|(course, prereqs)| {
            prereqs
                .iter()
                .filter(move |prereq| known.contains(prereq.as_str()))
                .map(move |prereq| Link::new(prereq.as_str(), course))
        })
        .collect();
    debug!(links = links.len(), "Rebuilt links from prerequisite overlay");
    document.links = links;
}

fn set_edges(node: &mut CourseNode, prerequisites: Vec<String>, unlocks: Vec<String>) {
    node.in_degree = prerequisites.len();
    node.out_degree = unlocks.len();
    node.prerequisites = Some(prerequisites);
    node.unlocks = Some(unlocks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, RatingRecord};
    use serde_json::Map;

    fn node(code: &str) -> CourseNode {
        CourseNode {
            id: code.to_string(),
            title: format!("Course {code}"),
            description: String::new(),
            subject: "CS".to_string(),
            catalog_number: code[3..].to_string(),
            difficulty_score: 4.0,
            enjoyment_score: 6.0,
            comment_count: 5,
            confidence: Confidence::Medium,
            in_degree: 9,
            out_degree: 9,
            centrality: 0.2,
            prerequisites: None,
            unlocks: None,
            score_source: None,
            extra: Map::new(),
        }
    }

    fn base() -> NodeLinkDocument {
        NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: Map::new(),
            nodes: vec![node("CS 2110"), node("CS 3110"), node("CS 4820")],
            links: vec![Link::new("CS 2110", "CS 4820")],
        }
    }

    #[test]
    fn rating_with_only_difficulty_keeps_base_enjoyment() {
        let ratings = RatingOverlay::from([(
            "CS 3110".to_string(),
            RatingRecord {
                avg_difficulty: Some(3.9),
                ..RatingRecord::default()
            },
        )]);

        let served = merge_overlays(&base(), Some(&ratings), None);

        let node = &served.nodes[1];
        assert!((node.difficulty_score - 3.9).abs() < f64::EPSILON);
        assert!((node.enjoyment_score - 6.0).abs() < f64::EPSILON);
        assert_eq!(node.score_source.as_deref(), Some(RATING_OVERLAY_SOURCE));
        assert_eq!(served.nodes[0].score_source, None);
    }

    #[test]
    fn rating_entry_without_averages_changes_nothing() {
        let ratings = RatingOverlay::from([("CS 2110".to_string(), RatingRecord::default())]);
        let mut nodes = base().nodes;

        assert_eq!(apply_ratings(&mut nodes, &ratings), 0);
        assert_eq!(nodes[0].score_source, None);
    }

    #[test]
    fn rating_for_unknown_course_is_ignored() {
        let ratings = RatingOverlay::from([(
            "MATH 1920".to_string(),
            RatingRecord {
                avg_enjoyment: Some(1.0),
                ..RatingRecord::default()
            },
        )]);

        let served = merge_overlays(&base(), Some(&ratings), None);

        assert_eq!(served.nodes.len(), 3);
        assert!(served.nodes.iter().all(|n| n.score_source.is_none()));
    }

    #[test]
    fn prerequisite_overlay_rebuilds_links_and_degrees() {
        let overlay: PrerequisiteOverlay = [
            ("CS 3110", vec!["CS 2110".to_string()]),
            ("CS 4820", vec!["CS 3110".to_string()]),
        ]
        .into_iter()
        .collect();

        let served = merge_overlays(&base(), None, Some(&overlay));

        assert_eq!(
            served.links,
            vec![
                Link::new("CS 2110", "CS 3110"),
                Link::new("CS 3110", "CS 4820")
            ]
        );
        let middle = &served.nodes[1];
        assert_eq!(middle.unlocks.as_deref(), Some(&["CS 4820".to_string()][..]));
        assert_eq!(middle.prerequisites.as_deref(), Some(&["CS 2110".to_string()][..]));
        assert_eq!((middle.in_degree, middle.out_degree), (1, 1));
        let root = &served.nodes[0];
        assert_eq!((root.in_degree, root.out_degree), (0, 1));
    }

    #[test]
    fn overlay_links_to_unknown_courses_are_not_served() {
        let overlay: PrerequisiteOverlay =
            [("CS 3110", vec!["CS 1110".to_string(), "CS 2110".to_string()])]
                .into_iter()
                .collect();

        let served = merge_overlays(&base(), None, Some(&overlay));

        assert_eq!(served.links, vec![Link::new("CS 2110", "CS 3110")]);
        assert_eq!(served.nodes[1].in_degree, 2);
    }

    #[test]
    fn without_prerequisite_overlay_edges_fields_are_empty() {
        let served = merge_overlays(&base(), None, None);

        for node in &served.nodes {
            assert_eq!(node.prerequisites.as_deref(), Some(&[][..]));
            assert_eq!(node.unlocks.as_deref(), Some(&[][..]));
            assert_eq!((node.in_degree, node.out_degree), (0, 0));
            assert!((node.centrality - 0.2).abs() < f64::EPSILON);
        }
        assert_eq!(served.links, base().links);
    }

    #[test]
    fn merge_does_not_touch_base() {
        let base = base();
        let ratings = RatingOverlay::from([(
            "CS 2110".to_string(),
            RatingRecord {
                avg_difficulty: Some(1.0),
                avg_enjoyment: Some(1.0),
                professors: Vec::new(),
            },
        )]);

        let _ = merge_overlays(&base, Some(&ratings), Some(&PrerequisiteOverlay::new()));

        assert_eq!(base, self::base());
    }
}
