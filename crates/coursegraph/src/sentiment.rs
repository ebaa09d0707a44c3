//! Base sentiment scoring from forum comments.
//!
//! Produces the sentiment map the graph builder embeds on every node:
//!
//! - **Difficulty** averages the weights of difficulty keywords found in each
//!   comment, over comments that mention any, and maps `[-2, 2]` onto `[0, 10]`.
//! - **Enjoyment** averages the VADER compound score of every comment and maps
//!   `[-1, 1]` onto `[0, 10]`.
//! - **Confidence** is a tier of the comment count.

use std::path::Path;

use tracing::{debug, info, warn};
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::persist::read_optional_json;
use crate::types::{Confidence, ForumComment, ForumComments, SentimentMap, SentimentRecord};

/// Keyword weights; positive means harder. Matched as substrings of the
/// lowercased comment.
const DIFFICULTY_KEYWORDS: &[(&str, f64)] = &[
    ("hard", 1.5),
    ("difficult", 1.5),
    ("challenging", 1.3),
    ("tough", 1.4),
    ("impossible", 2.0),
    ("brutal", 1.8),
    ("easy", -1.5),
    ("simple", -1.3),
    ("manageable", -1.0),
    ("straightforward", -1.2),
    ("trivial", -1.5),
];

/// Difficulty weight of one comment, in `[-2, 2]`. Zero when no keyword occurs.
#[must_use]
pub fn comment_difficulty(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let weights: Vec<f64> = DIFFICULTY_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|&(_, weight)| weight)
        .collect();

    if weights.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let count = weights.len() as f64;
        weights.iter().sum::<f64>() / count
    }
}

/// Enjoyment polarity of one comment: the VADER compound score, in `[-1, 1]`.
#[must_use]
pub fn comment_polarity(text: &str) -> f64 {
    compound(&SentimentIntensityAnalyzer::new(), text)
}

fn compound(analyzer: &SentimentIntensityAnalyzer, text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    analyzer
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
        .clamp(-1.0, 1.0)
}

/// Sentiment record for one course's comments.
#[must_use]
pub fn score_comments(comments: &[ForumComment]) -> SentimentRecord {
    if comments.is_empty() {
        return SentimentRecord::neutral();
    }

    let difficulties: Vec<f64> = comments
        .iter()
        .map(|c| comment_difficulty(&c.text))
        .filter(|&d| d != 0.0)
        .collect();
    let analyzer = SentimentIntensityAnalyzer::new();
    let polarities: Vec<f64> = comments
        .iter()
        .map(|c| compound(&analyzer, &c.text))
        .collect();

    let avg_difficulty = mean(&difficulties);
    let avg_enjoyment = mean(&polarities);

    let count = u32::try_from(comments.len()).unwrap_or(u32::MAX);
    SentimentRecord {
        difficulty: round1(((avg_difficulty + 2.0) * 2.5).clamp(0.0, 10.0)),
        enjoyment: round1(((avg_enjoyment + 1.0) * 5.0).clamp(0.0, 10.0)),
        comment_count: count,
        confidence: Confidence::from_comment_count(count),
    }
}

/// Sentiment records for every course with comments.
#[must_use]
pub fn score_all(comments: &ForumComments) -> SentimentMap {
    let scores: SentimentMap = comments
        .iter()
        .map(|(course, comments)| {
            debug!(course = %course, comments = comments.len(), "Scoring course");
            (course.clone(), score_comments(comments))
        })
        .collect();

    let tier_count =
        |tier: Confidence| scores.values().filter(|s| s.confidence == tier).count();
    info!(
        courses = scores.len(),
        high = tier_count(Confidence::High),
        medium = tier_count(Confidence::Medium),
        low = tier_count(Confidence::Low),
        "Scored forum sentiment"
    );
    scores
}

/// Load forum comments. A missing or malformed file yields no comments.
#[must_use]
pub fn load_comments(path: &Path) -> ForumComments {
    match read_optional_json::<ForumComments>(path) {
        Ok(Some(comments)) => {
            info!(path = %path.display(), courses = comments.len(), "Loaded forum comments");
            comments
        }
        Ok(None) => {
            warn!(path = %path.display(), "Comments file not found - all courses keep neutral scores");
            ForumComments::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable comments file - all courses keep neutral scores");
            ForumComments::new()
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
