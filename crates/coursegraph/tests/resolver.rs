//! Prerequisite resolution through the public strategy chain.

use std::cell::Cell;
use std::rc::Rc;

use coursegraph::resolver::{CompletionStrategy, PrerequisiteResolver, TextCompletion};
use coursegraph::{Error, Result};
use proptest::prelude::*;
use rstest::rstest;

/// Completion backend that returns a fixed response and counts calls.
struct Scripted {
    response: std::result::Result<&'static str, &'static str>,
    calls: Rc<Cell<usize>>,
}

impl TextCompletion for Scripted {
    fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.response
            .map(str::to_string)
            .map_err(|e| Error::Completion(e.to_string()))
    }
}

fn resolver_with(
    response: std::result::Result<&'static str, &'static str>,
) -> (PrerequisiteResolver, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let backend = Scripted {
        response,
        calls: Rc::clone(&calls),
    };
    let resolver = PrerequisiteResolver::new(vec![Box::new(CompletionStrategy::new(backend))]);
    (resolver, calls)
}

#[test]
fn regex_fallback_resolves_mixed_clause() {
    let resolver = PrerequisiteResolver::regex_only();

    let codes = resolver.resolve("CS 2110 and (MATH 1920 or MATH 1910)");

    assert_eq!(codes, ["CS 2110", "MATH 1920", "MATH 1910"]);
}

#[test]
fn completion_answer_is_used_when_well_formed() {
    let (resolver, calls) =
        resolver_with(Ok("Sure! ```json\n[\"cs 3110\", \"CS3110\", \"ORIE 3500\"]\n```"));

    let codes = resolver.resolve("One of CS 3110 or a probability course");

    assert_eq!(codes, ["CS 3110", "ORIE 3500"]);
    assert_eq!(calls.get(), 1);
}

#[rstest]
#[case::transport_error(Err("timed out"))]
#[case::no_array(Ok("I could not find any course codes."))]
#[case::broken_json(Ok("[\"CS 2110\", "))]
fn failing_completion_falls_back_to_regex(
    #[case] response: std::result::Result<&'static str, &'static str>,
) {
    let (resolver, calls) = resolver_with(response);

    let codes = resolver.resolve("Prerequisite: CS 2110 or equivalent");

    assert_eq!(codes, ["CS 2110"]);
    assert_eq!(calls.get(), 1);
}

#[test]
fn unavailable_backend_is_never_called() {
    struct Unreachable;
    impl TextCompletion for Unreachable {
        fn complete(&self, _prompt: &str) -> Result<String> {
            panic!("backend without configuration must not be called");
        }
    }

    let resolver = PrerequisiteResolver::new(vec![Box::new(
        CompletionStrategy::<Unreachable>::unavailable(),
    )]);

    assert_eq!(resolver.resolve("MATH 2940"), ["MATH 2940"]);
}

#[rstest]
#[case::empty("")]
#[case::whitespace("   \n\t ")]
fn blank_text_skips_every_strategy(#[case] text: &str) {
    let (resolver, calls) = resolver_with(Ok("[\"CS 1110\"]"));

    assert!(resolver.resolve(text).is_empty());
    assert_eq!(calls.get(), 0);
}

proptest! {
    #[test]
    fn text_without_course_codes_resolves_to_nothing(text in "[a-z ,.;()]{0,80}") {
        let resolver = PrerequisiteResolver::regex_only();
        prop_assert!(resolver.resolve(&text).is_empty());
    }

    #[test]
    fn resolved_codes_are_unique_and_normalized(
        codes in proptest::collection::vec(("[A-Z]{2,4}", 1000u32..10000), 0..8)
    ) {
        let text = codes
            .iter()
            .map(|(subject, number)| format!("{subject} {number}"))
            .collect::<Vec<_>>()
            .join(" or ");

        let resolved = PrerequisiteResolver::regex_only().resolve(&text);

        let mut seen = std::collections::HashSet::new();
        for code in &resolved {
            prop_assert!(seen.insert(code.clone()), "duplicate {}", code);
            let (subject, number) = code.split_once(' ').unwrap();
            prop_assert!(subject.chars().all(|c| c.is_ascii_uppercase()));
            prop_assert_eq!(number.len(), 4);
        }
        prop_assert_eq!(resolved.len(), codes.iter().collect::<std::collections::HashSet<_>>().len());
    }
}
