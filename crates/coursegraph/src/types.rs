//! Core data types for the course graph.
//!
//! Everything here maps one-to-one onto a JSON document the pipeline reads or
//! writes: the scraped catalog, the base sentiment map, the node-link graph
//! document and the two optional overlays.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Neutral difficulty/enjoyment score used when no signal exists.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Score source tag set on nodes whose scores came from the rating overlay.
pub const RATING_OVERLAY_SOURCE: &str = "rating-overlay";

// ============================================================================
// Catalog
// ============================================================================

/// A course record as produced by the catalog scraper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCourse {
    /// Normalized course code, e.g. "CS 2110"
    pub course_id: String,
    /// Subject, e.g. "CS"
    pub subject: String,
    /// Catalog number, e.g. "2110"
    pub catalog_number: String,
    /// Course title
    pub title: String,
    /// Long description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Free-text prerequisite clause
    #[serde(default, deserialize_with = "null_as_default")]
    pub prerequisites: String,
    /// Instructor names
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructors: Vec<String>,
    /// Roster the record was scraped from, e.g. "FA25"
    #[serde(default, deserialize_with = "null_as_default")]
    pub semester: String,
}

/// On-disk catalog layout. The scraper wraps the list in `{"courses": [...]}`;
/// a bare array is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CatalogFile {
    Wrapped { courses: Vec<CatalogCourse> },
    Bare(Vec<CatalogCourse>),
}

impl CatalogFile {
    pub(crate) fn into_courses(self) -> Vec<CatalogCourse> {
        match self {
            Self::Wrapped { courses } | Self::Bare(courses) => courses,
        }
    }
}

// ============================================================================
// Sentiment
// ============================================================================

/// How much review volume backs a sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// No reviews; the score is the neutral default
    #[default]
    None,
    /// One or two reviews
    Low,
    /// Three to nine reviews
    Medium,
    /// Ten or more reviews
    High,
}

impl Confidence {
    /// Tier for a given review count.
    #[must_use]
    pub fn from_comment_count(count: u32) -> Self {
        match count {
            0 => Self::None,
            1..=2 => Self::Low,
            3..=9 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Lowercase label as it appears in documents.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base sentiment signal for one course, on a 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    /// Perceived difficulty
    #[serde(default = "neutral_score")]
    pub difficulty: f64,
    /// Perceived enjoyment
    #[serde(default = "neutral_score")]
    pub enjoyment: f64,
    /// Number of forum comments behind the scores
    #[serde(default)]
    pub comment_count: u32,
    /// Confidence tier
    #[serde(default)]
    pub confidence: Confidence,
}

impl SentimentRecord {
    /// The neutral record used for courses with no forum signal.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            difficulty: NEUTRAL_SCORE,
            enjoyment: NEUTRAL_SCORE,
            comment_count: 0,
            confidence: Confidence::None,
        }
    }
}

impl Default for SentimentRecord {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Course code to base sentiment.
pub type SentimentMap = HashMap<String, SentimentRecord>;

/// A single forum comment attached to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumComment {
    /// Comment body; empty when the scraper recorded none
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// Course code to the forum comments that mention it.
pub type ForumComments = HashMap<String, Vec<ForumComment>>;

// ============================================================================
// Node-link document
// ============================================================================

/// A course node in the node-link document.
///
/// The overlay fields (`prerequisites`, `unlocks`, `score_source`) are only
/// present on served documents. Unknown fields are kept in `extra` so a
/// document round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseNode {
    /// Course code
    pub id: String,
    /// Course title
    #[serde(default)]
    pub title: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Subject, e.g. "CS"
    #[serde(default)]
    pub subject: String,
    /// Catalog number, e.g. "2110"
    #[serde(default)]
    pub catalog_number: String,
    /// Difficulty on a 0-10 scale
    #[serde(default = "neutral_score")]
    pub difficulty_score: f64,
    /// Enjoyment on a 0-10 scale
    #[serde(default = "neutral_score")]
    pub enjoyment_score: f64,
    /// Forum comments behind the base scores
    #[serde(default)]
    pub comment_count: u32,
    /// Confidence tier of the base scores
    #[serde(default)]
    pub confidence: Confidence,
    /// Number of prerequisites
    #[serde(default)]
    pub in_degree: usize,
    /// Number of courses this one unlocks
    #[serde(default)]
    pub out_degree: usize,
    /// PageRank centrality, rounded to 4 decimals
    #[serde(default)]
    pub centrality: f64,
    /// Prerequisite codes (served documents only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    /// Codes this course is a prerequisite of (served documents only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocks: Option<Vec<String>>,
    /// Where the served scores came from, when not the base sentiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_source: Option<String>,
    /// Fields this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CourseNode {
    /// Build a node from a catalog record and its base sentiment.
    ///
    /// Structural metrics start at zero and are filled in by the builder.
    #[must_use]
    pub fn from_catalog(course: &CatalogCourse, sentiment: &SentimentRecord) -> Self {
        Self {
            id: course.course_id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            subject: course.subject.clone(),
            catalog_number: course.catalog_number.clone(),
            difficulty_score: sentiment.difficulty,
            enjoyment_score: sentiment.enjoyment,
            comment_count: sentiment.comment_count,
            confidence: sentiment.confidence,
            in_degree: 0,
            out_degree: 0,
            centrality: 0.0,
            prerequisites: None,
            unlocks: None,
            score_source: None,
            extra: Map::new(),
        }
    }
}

/// A directed prerequisite edge: `source` must be taken before `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    /// Prerequisite course code
    pub source: String,
    /// Dependent course code
    pub target: String,
}

impl Link {
    /// Create a new link.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Portable node-link graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    /// Always true for prerequisite graphs
    #[serde(default = "default_true")]
    pub directed: bool,
    /// Always false: parallel edges collapse
    #[serde(default)]
    pub multigraph: bool,
    /// Graph-level metadata
    #[serde(default)]
    pub graph: Map<String, Value>,
    /// Course nodes
    pub nodes: Vec<CourseNode>,
    /// Prerequisite edges
    #[serde(default)]
    pub links: Vec<Link>,
}

// ============================================================================
// Overlays
// ============================================================================

/// Aggregated rating data for one instructor of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorRating {
    /// Instructor name
    pub name: String,
    /// Overall rating, 1-5
    pub rating: f64,
    /// Difficulty, 1-5
    pub difficulty: f64,
    /// Percentage of students who would take the instructor again
    #[serde(default)]
    pub would_take_again: Option<f64>,
    /// Number of ratings behind the aggregate
    #[serde(default)]
    pub num_ratings: u32,
}

/// Rating overlay entry for one course.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingRecord {
    /// Average difficulty, overrides the base score when present
    #[serde(default)]
    pub avg_difficulty: Option<f64>,
    /// Average enjoyment, overrides the base score when present
    #[serde(default)]
    pub avg_enjoyment: Option<f64>,
    /// Per-instructor ratings, in source order
    #[serde(default, deserialize_with = "null_as_default")]
    pub professors: Vec<ProfessorRating>,
}

/// Course code to rating overlay entry.
pub type RatingOverlay = HashMap<String, RatingRecord>;

/// Course code to prerequisite codes, in document order.
///
/// Document order is kept so the served `links` and `unlocks` lists come out
/// in the same order the overlay lists them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrerequisiteOverlay {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl PrerequisiteOverlay {
    /// Create an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prerequisite list for a course. A repeated code replaces the
    /// earlier list but keeps its position.
    pub fn insert(&mut self, code: impl Into<String>, prerequisites: Vec<String>) {
        let code = code.into();
        if let Some(&pos) = self.index.get(&code) {
            self.entries[pos].1 = prerequisites;
        } else {
            self.index.insert(code.clone(), self.entries.len());
            self.entries.push((code, prerequisites));
        }
    }

    /// Prerequisites listed for a course.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&[String]> {
        self.index
            .get(code)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(code, prereqs)| (code.as_str(), prereqs.as_slice()))
    }

    /// Number of courses with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the overlay has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for PrerequisiteOverlay {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        let mut overlay = Self::new();
        for (code, prereqs) in iter {
            overlay.insert(code, prereqs);
        }
        overlay
    }
}

impl Serialize for PrerequisiteOverlay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de> Deserialize<'de> for PrerequisiteOverlay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OverlayVisitor;

        impl<'de> Visitor<'de> for OverlayVisitor {
            type Value = PrerequisiteOverlay;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of course codes to prerequisite code arrays")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut overlay = PrerequisiteOverlay::new();
                while let Some((code, prereqs)) = map.next_entry::<String, Vec<String>>()? {
                    overlay.insert(code, prereqs);
                }
                Ok(overlay)
            }
        }

        deserializer.deserialize_map(OverlayVisitor)
    }
}

// ============================================================================
// serde helpers
// ============================================================================

fn neutral_score() -> f64 {
    NEUTRAL_SCORE
}

fn default_true() -> bool {
    true
}

/// Scrapers write `null` for absent text fields.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
