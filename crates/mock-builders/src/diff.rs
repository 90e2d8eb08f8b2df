//! Human-readable descriptions of failed matches.

use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::fmt::{Display, Write};

use crate::matcher::Matcher;

const PREDICATE_MISMATCH: &str = "doesn't match function matcher";

/// Describe why `actual` failed `expected` on one dimension.
///
/// Produces `"<method> <url> <dimension> differ\n<diff>"`, where the diff is a
/// line diff of the pretty-printed JSON values. Predicates cannot be diffed
/// and get a fixed message instead.
pub fn describe(
    dimension: impl Display,
    method: impl Display,
    url: &str,
    expected: &Matcher,
    actual: &Value,
) -> String {
    let difference = match expected {
        Matcher::Predicate(_) => PREDICATE_MISMATCH.to_string(),
        Matcher::Exact(value) => json_diff(value, actual),
    };
    format!("{method} {url} {dimension} differ\n{difference}")
}

/// Line diff between two JSON values, `-` for expected and `+` for received.
pub fn json_diff(expected: &Value, actual: &Value) -> String {
    let expected = pretty(expected);
    let actual = pretty(actual);

    let mut out = String::from("- Expected\n+ Received\n\n");
    let diff = TextDiff::from_lines(&expected, &actual);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        let _ = write!(out, "{sign} {}", change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out.truncate(out.trim_end_matches('\n').len());
    out
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
