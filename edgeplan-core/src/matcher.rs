//! Route pattern matching, emulating the edge platform's four match modes.
//!
//! | Pattern        | Matches a path that ...      |
//! |----------------|------------------------------|
//! | `*text*`       | contains `text`              |
//! | `*text`        | ends with `text`             |
//! | `text*`        | starts with `text`           |
//! | `text`         | equals `text`                |
//!
//! A leading `http://` or `https://` is never part of the match.

use crate::types::RoutePattern;

/// A pattern with scheme and wildcard markers split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape<'a> {
    text: &'a str,
    leading: bool,
    trailing: bool,
}

impl<'a> Shape<'a> {
    fn parse(pattern: &'a str) -> Self {
        let text = strip_scheme(pattern);
        let (text, leading) = match text.strip_prefix('*') {
            Some(rest) => (rest, true),
            None => (text, false),
        };
        let (text, trailing) = match text.strip_suffix('*') {
            Some(rest) => (rest, true),
            None => (text, false),
        };
        Shape {
            text,
            leading,
            trailing,
        }
    }
}

fn strip_scheme(pattern: &str) -> &str {
    pattern
        .strip_prefix("http://")
        .or_else(|| pattern.strip_prefix("https://"))
        .unwrap_or(pattern)
}

/// `true` when `covering` matches `candidate` treated as a concrete path.
///
/// The candidate's own wildcard markers are stripped and ignored. Not
/// symmetric: `covers(a, b)` and `covers(b, a)` answer different questions.
pub fn covers(covering: &str, candidate: &str) -> bool {
    let pattern = Shape::parse(covering);
    let path = Shape::parse(candidate).text;
    match (pattern.leading, pattern.trailing) {
        // TODO: confirm substring semantics for `*text*` against the edge
        // platform's published route matching rules.
        (true, true) => path.contains(pattern.text),
        (true, false) => path.ends_with(pattern.text),
        (false, true) => path.starts_with(pattern.text),
        (false, false) => path == pattern.text,
    }
}

/// Relationship of a new route to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Byte-for-byte identical patterns.
    Exact,
    /// The existing route covers the new one.
    Subset,
    /// The new route covers the existing one.
    Superset,
    /// Neither covers the other.
    Disjoint,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Exact => "exact",
            Relation::Subset => "covered-by",
            Relation::Superset => "covers",
            Relation::Disjoint => "disjoint",
        }
    }
}

/// Classify `ours` (a new route) against `theirs` (an existing route).
///
/// Existing coverage is checked before reverse coverage, so two patterns
/// that cover each other without being identical count as [`Relation::Subset`].
pub fn classify(theirs: &RoutePattern, ours: &RoutePattern) -> Relation {
    if theirs == ours {
        Relation::Exact
    } else if covers(theirs.as_str(), ours.as_str()) {
        Relation::Subset
    } else if covers(ours.as_str(), theirs.as_str()) {
        Relation::Superset
    } else {
        Relation::Disjoint
    }
}
