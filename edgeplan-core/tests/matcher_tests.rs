//! Parameterised route matching tests for `edgeplan-core`.

use edgeplan_core::matcher::{classify, covers, Relation};
use edgeplan_core::RoutePattern;
use rstest::rstest;

// ---------------------------------------------------------------------------
// covers
// ---------------------------------------------------------------------------

#[rstest]
#[case("*foo*", "xfooy", true)]
#[case("*foo*", "foo", true)]
#[case("*foo*", "xfoy", false)]
#[case("*foo", "xfoo", true)]
#[case("*foo", "fooy", false)]
#[case("foo*", "fooy", true)]
#[case("foo*", "xfoo", false)]
#[case("foo", "foo", true)]
#[case("foo", "fooy", false)]
#[case("https://api.example.com/*", "api.example.com/v1", true)]
#[case("api.example.com/*", "http://api.example.com/v1", true)]
#[case("api.example.com/v1", "api.example.com/*", false)]
fn covers_cases(#[case] covering: &str, #[case] candidate: &str, #[case] expected: bool) {
    assert_eq!(covers(covering, candidate), expected, "covers({covering}, {candidate})");
}

#[rstest]
#[case("foo")]
#[case("foo*")]
#[case("*foo")]
#[case("*foo*")]
#[case("https://a.com/x")]
fn covers_is_reflexive(#[case] pattern: &str) {
    assert!(covers(pattern, pattern));
}

#[test]
fn covers_is_directional() {
    assert!(covers("a.com/*", "a.com/v1"));
    assert!(!covers("a.com/v1", "a.com/*"));
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

#[rstest]
#[case("foo", "foo", Relation::Exact)]
#[case("api.example.com/*", "api.example.com/v1", Relation::Subset)]
#[case("api.example.com/v1", "api.example.com/*", Relation::Superset)]
#[case("a.com/x", "b.com/y", Relation::Disjoint)]
fn classify_cases(#[case] theirs: &str, #[case] ours: &str, #[case] expected: Relation) {
    assert_eq!(
        classify(&RoutePattern::from(theirs), &RoutePattern::from(ours)),
        expected
    );
}

#[test]
fn exact_is_distinct_from_mutual_coverage() {
    // Both cover each other, but only byte equality is an exact match.
    let theirs = RoutePattern::from("https://a.com/x");
    let ours = RoutePattern::from("a.com/x");
    assert!(covers(theirs.as_str(), ours.as_str()));
    assert!(covers(ours.as_str(), theirs.as_str()));
    assert_eq!(classify(&theirs, &ours), Relation::Subset);
}
