//! Prerequisite resolution: free-text clause to normalized course codes.
//!
//! Resolution runs an ordered chain of [`ResolveStrategy`] implementations and
//! ends in the deterministic [`RegexStrategy`], which cannot fail. A strategy
//! that cannot run (no backend configured) is skipped without being called; a
//! strategy that errors hands over to the next one. Nothing a strategy does
//! ever reaches the caller as an error.
//!
//! ```
//! use coursegraph::resolver::PrerequisiteResolver;
//!
//! let resolver = PrerequisiteResolver::regex_only();
//! let codes = resolver.resolve("CS 2110 and (MATH 1920 or MATH 1910)");
//! assert_eq!(codes, ["CS 2110", "MATH 1920", "MATH 1910"]);
//! ```

mod completion;
mod gemini;
mod pattern;

pub use completion::{CompletionStrategy, TextCompletion, extract_json_array};
pub use gemini::GeminiClient;
pub use pattern::RegexStrategy;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::CompletionConfig;
use crate::error::Result;

/// One way of turning prerequisite text into course codes.
pub trait ResolveStrategy {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Whether this strategy is usable at all. Strategies that return `false`
    /// are skipped without calling [`resolve`](Self::resolve).
    fn can_attempt(&self) -> bool;

    /// Resolve `text` into normalized course codes.
    ///
    /// # Errors
    ///
    /// Any error means "try the next strategy".
    fn resolve(&self, text: &str) -> Result<Vec<String>>;
}

/// Ordered strategy chain with an infallible regex fallback.
pub struct PrerequisiteResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    fallback: RegexStrategy,
}

impl PrerequisiteResolver {
    /// Resolver with the given primary strategies, tried in order before the
    /// regex fallback.
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self {
            strategies,
            fallback: RegexStrategy,
        }
    }

    /// Resolver that only uses the regex fallback.
    #[must_use]
    pub fn regex_only() -> Self {
        Self::new(Vec::new())
    }

    /// Resolver backed by the configured text-completion service.
    ///
    /// Falls back to [`regex_only`](Self::regex_only) behaviour when the
    /// backend is disabled, has no API key, or its HTTP client cannot be built.
    #[must_use]
    pub fn from_config(config: &CompletionConfig) -> Self {
        if !config.enabled {
            debug!("Text completion disabled - using regex resolution");
            return Self::regex_only();
        }

        match GeminiClient::from_config(config) {
            Ok(Some(client)) => Self::new(vec![Box::new(CompletionStrategy::new(client))]),
            Ok(None) => {
                warn!(
                    env = %config.api_key_env,
                    "Text completion API key not configured - using regex fallback"
                );
                Self::regex_only()
            }
            Err(e) => {
                warn!(error = %e, "Could not create text completion client - using regex fallback");
                Self::regex_only()
            }
        }
    }

    /// Resolve a prerequisite clause into deduplicated, normalized course codes
    /// in order of first appearance.
    ///
    /// Empty or whitespace-only text resolves to an empty list without
    /// consulting any strategy.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        for strategy in &self.strategies {
            if !strategy.can_attempt() {
                continue;
            }
            match strategy.resolve(text) {
                Ok(codes) => return dedup_in_order(codes),
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "Prerequisite resolution failed, trying next strategy"
                    );
                }
            }
        }

        self.fallback.resolve_codes(text)
    }
}

impl Default for PrerequisiteResolver {
    fn default() -> Self {
        Self::regex_only()
    }
}

impl std::fmt::Debug for PrerequisiteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("PrerequisiteResolver")
            .field("strategies", &names)
            .finish_non_exhaustive()
    }
}

/// Normalize a loosely formatted course code to `SUBJECT NNNN`.
///
/// Returns `None` for anything that is not a 2-4 letter subject followed by a
/// 4 digit number.
#[must_use]
pub fn normalize_code(raw: &str) -> Option<String> {
    static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*([A-Za-z]{2,4})\s*(\d{4})\s*$").expect("valid regex")
    });

    let caps = CODE_RE.captures(raw)?;
    Some(format!("{} {}", caps[1].to_ascii_uppercase(), &caps[2]))
}

fn dedup_in_order(codes: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .into_iter()
        .filter(|code| seen.insert(code.clone()))
        .collect()
}
