//! Resolution through a text-completion backend.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{ResolveStrategy, normalize_code};
use crate::error::{Error, Result};

/// A request/response text-completion capability.
///
/// Implementations must bound how long a call may block; a timeout is just
/// another error.
pub trait TextCompletion {
    /// Complete `prompt`, returning the raw response text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, or an unusable response.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Asks a [`TextCompletion`] backend for a JSON array of course codes.
pub struct CompletionStrategy<C> {
    backend: Option<C>,
}

impl<C: TextCompletion> CompletionStrategy<C> {
    /// Strategy using `backend`.
    pub fn new(backend: C) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Strategy with no backend. [`can_attempt`](ResolveStrategy::can_attempt)
    /// reports `false`.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }
}

impl<C: TextCompletion> ResolveStrategy for CompletionStrategy<C> {
    fn name(&self) -> &'static str {
        "completion"
    }

    fn can_attempt(&self) -> bool {
        self.backend.is_some()
    }

    fn resolve(&self, text: &str) -> Result<Vec<String>> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| Error::Completion("no backend configured".to_string()))?;

        let response = backend.complete(&build_prompt(text))?;
        let items = extract_json_array(&response)?;

        let codes: Vec<String> = items.iter().filter_map(|item| normalize_code(item)).collect();
        debug!(
            returned = items.len(),
            accepted = codes.len(),
            "Completion resolved prerequisites"
        );
        Ok(codes)
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Extract all course codes from this prerequisite text.\n\
         Return ONLY a JSON array of course code strings. Nothing else.\n\
         \n\
         Example input: \"CS 2110 and (MATH 1920 or MATH 1910)\"\n\
         Example output: [\"CS 2110\", \"MATH 1920\", \"MATH 1910\"]\n\
         \n\
         Input: {text}\n\
         Output:"
    )
}

/// Pull the bracketed JSON array out of a completion response and keep its
/// string elements, trimmed. Non-string elements are ignored.
///
/// The match runs from the first `[` to the last `]`, so prose or code fences
/// around the array are tolerated.
///
/// # Errors
///
/// Returns [`Error::Completion`] if the response contains no array, or the
/// bracketed text is not a JSON array.
pub fn extract_json_array(response: &str) -> Result<Vec<String>> {
    static ARRAY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

    let found = ARRAY_RE
        .find(response)
        .ok_or_else(|| Error::Completion("response contains no JSON array".to_string()))?;

    let value: Value = serde_json::from_str(found.as_str())
        .map_err(|e| Error::Completion(format!("malformed JSON array: {e}")))?;

    let Value::Array(items) = value else {
        return Err(Error::Completion("bracketed text is not an array".to_string()));
    };

    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .map(|s| s.trim().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PrerequisiteResolver;

    struct Canned(&'static str);

    impl TextCompletion for Canned {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Down;

    impl TextCompletion for Down {
        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::Completion("connection refused".to_string()))
        }
    }

    #[test]
    fn extracts_array_wrapped_in_code_fence() {
        let response = "```json\n[\"CS 2110\", \"MATH 1920\"]\n```";

        assert_eq!(
            extract_json_array(response).unwrap(),
            vec!["CS 2110", "MATH 1920"]
        );
    }

    #[test]
    fn ignores_non_string_elements() {
        let items = extract_json_array(r#"[" CS 2110 ", 42, null, {"a": 1}]"#).unwrap();

        assert_eq!(items, vec!["CS 2110"]);
    }

    #[test]
    fn response_without_array_is_an_error() {
        assert!(extract_json_array("I could not find any course codes.").is_err());
    }

    #[test]
    fn malformed_array_is_an_error() {
        assert!(extract_json_array("[\"CS 2110\", ").is_err());
        assert!(extract_json_array("[CS 2110]").is_err());
    }

    #[test]
    fn completion_codes_are_normalized_and_filtered() {
        let strategy = CompletionStrategy::new(Canned(r#"["cs 2110", "MATH1920", "Calculus"]"#));

        assert_eq!(
            strategy.resolve("whatever").unwrap(),
            vec!["CS 2110", "MATH 1920"]
        );
    }

    #[test]
    fn completion_result_wins_over_regex() {
        let resolver = PrerequisiteResolver::new(vec![Box::new(CompletionStrategy::new(
            Canned(r#"["CS 3110"]"#),
        ))]);

        assert_eq!(resolver.resolve("CS 2110 or equivalent"), vec!["CS 3110"]);
    }

    #[test]
    fn backend_failure_falls_back_to_regex() {
        let resolver =
            PrerequisiteResolver::new(vec![Box::new(CompletionStrategy::new(Down))]);

        assert_eq!(resolver.resolve("CS 2110 or equivalent"), vec!["CS 2110"]);
    }

    #[test]
    fn garbage_response_falls_back_to_regex() {
        let resolver = PrerequisiteResolver::new(vec![Box::new(CompletionStrategy::new(
            Canned("Sure! The prerequisites are CS 2110."),
        ))]);

        assert_eq!(resolver.resolve("CS 2110 or equivalent"), vec!["CS 2110"]);
    }

    #[test]
    fn unavailable_strategy_cannot_attempt() {
        let strategy: CompletionStrategy<Down> = CompletionStrategy::unavailable();

        assert!(!strategy.can_attempt());
    }

    #[test]
    fn prompt_embeds_input_text() {
        let prompt = build_prompt("CS 4410 and CS 3410");

        assert!(prompt.contains("Input: CS 4410 and CS 3410"));
        assert!(prompt.ends_with("Output:"));
    }
}
