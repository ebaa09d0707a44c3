//! Deterministic pattern-based resolution.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::ResolveStrategy;
use crate::error::Result;

/// Subject (2-4 uppercase letters), whitespace, 4 digit catalog number.
static COURSE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,4})\s+(\d{4})\b").expect("valid regex"));

/// Scans text for `SUBJECT NNNN` patterns. Always available, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexStrategy;

impl RegexStrategy {
    /// Every course code in `text`, normalized, deduplicated, in order of
    /// first appearance.
    #[must_use]
    pub fn resolve_codes(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        COURSE_CODE_RE
            .captures_iter(text)
            .map(|caps| format!("{} {}", &caps[1], &caps[2]))
            .filter(|code| seen.insert(code.clone()))
            .collect()
    }
}

impl ResolveStrategy for RegexStrategy {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn can_attempt(&self) -> bool {
        true
    }

    fn resolve(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.resolve_codes(text))
    }
}
