//! Per-course signal lookups and prompt context formatting.
//!
//! Lookups read the *base* graph for forum sentiment, so a score overridden by
//! the rating overlay in the served view is still reported under its own
//! source here.

use std::collections::HashMap;
use std::fmt::Write;

use crate::types::{CourseNode, NodeLinkDocument, RatingOverlay, RatingRecord, SentimentRecord};

/// Read-only view over the base graph and the rating overlay.
#[derive(Debug)]
pub struct CourseLookup<'a> {
    nodes: HashMap<&'a str, &'a CourseNode>,
    ratings: Option<&'a RatingOverlay>,
}

impl<'a> CourseLookup<'a> {
    /// Index `base` by course code.
    #[must_use]
    pub fn new(base: &'a NodeLinkDocument, ratings: Option<&'a RatingOverlay>) -> Self {
        Self {
            nodes: base.nodes.iter().map(|n| (n.id.as_str(), n)).collect(),
            ratings,
        }
    }

    /// Base node for a course.
    #[must_use]
    pub fn course(&self, code: &str) -> Option<&'a CourseNode> {
        self.nodes.get(code).copied()
    }

    /// Forum sentiment for a course, only if at least one comment backs it.
    ///
    /// The neutral default carried by unreviewed courses is not a signal and
    /// is reported as `None`.
    #[must_use]
    pub fn forum_sentiment(&self, code: &str) -> Option<SentimentRecord> {
        let node = self.course(code)?;
        if node.comment_count == 0 {
            return None;
        }
        Some(SentimentRecord {
            difficulty: node.difficulty_score,
            enjoyment: node.enjoyment_score,
            comment_count: node.comment_count,
            confidence: node.confidence,
        })
    }

    /// Rating overlay entry for a course.
    #[must_use]
    pub fn ratings(&self, code: &str) -> Option<&'a RatingRecord> {
        self.ratings?.get(code)
    }

    /// Context block for the given courses, for inclusion in a prompt.
    ///
    /// Courses with nothing to report are skipped. Returns an empty string when
    /// no course has any data.
    #[must_use]
    pub fn format_context<S: AsRef<str>>(&self, codes: &[S]) -> String {
        codes
            .iter()
            .filter_map(|code| self.format_course(code.as_ref()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_course(&self, code: &str) -> Option<String> {
        let mut lines = Vec::new();

        if let Some(node) = self.course(code).filter(|n| !n.title.is_empty()) {
            lines.push(format!("  Title: {}", node.title));
        }

        if let Some(sentiment) = self.forum_sentiment(code) {
            lines.push(format!(
                "  Forum reviews: Difficulty {:.1}/10, Enjoyment {:.1}/10 ({} reviews, {} confidence)",
                sentiment.difficulty,
                sentiment.enjoyment,
                sentiment.comment_count,
                sentiment.confidence
            ));
        }

        for prof in self.ratings(code).map_or(&[][..], |r| r.professors.as_slice()) {
            let mut line = format!(
                "  Instructor rating: Prof. {}, {:.1}/5 rating, {:.1}/5 difficulty",
                prof.name, prof.rating, prof.difficulty
            );
            if let Some(again) = prof.would_take_again {
                let _ = write!(line, ", {again:.1}% would take again");
            }
            let _ = write!(line, " ({} ratings)", prof.num_ratings);
            lines.push(line);
        }

        if lines.is_empty() {
            None
        } else {
            Some(format!("[{code}]\n{}", lines.join("\n")))
        }
    }
}
