//! Matcher values and their evaluation.
//!
//! A [`Matcher`] is either a literal JSON value or a predicate over the actual
//! value. How a literal is compared depends on the [`Dimension`] it guards:
//! headers use containment, everything else uses strict deep equality.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::deep_equals::{is_equal, is_match, lowercase_keys};

/// Predicate function over an actual value.
pub type MatcherFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Expected shape of one request dimension.
#[derive(Clone)]
pub enum Matcher {
    /// Literal value compared by deep equality or containment
    Exact(Value),
    /// User predicate; its return value is authoritative
    Predicate(MatcherFn),
}

impl Matcher {
    /// Literal matcher from anything convertible into a JSON value.
    pub fn exact(value: impl Into<Value>) -> Self {
        Matcher::Exact(value.into())
    }

    /// Literal matcher from a serializable value (e.g. a typed body struct).
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Matcher::Exact(serde_json::to_value(value)?))
    }

    /// Predicate matcher.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(f))
    }

    /// The literal expected value, if this is not a predicate.
    pub fn expected(&self) -> Option<&Value> {
        match self {
            Matcher::Exact(value) => Some(value),
            Matcher::Predicate(_) => None,
        }
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Matcher::Predicate(_))
    }

    /// Evaluate against an actual value.
    pub fn evaluate(&self, mode: MatchMode, actual: &Value) -> bool {
        match self {
            Matcher::Predicate(f) => f(actual),
            Matcher::Exact(expected) => match mode {
                MatchMode::Exact => is_equal(expected, actual),
                MatchMode::Contains => is_match(actual, expected),
            },
        }
    }

    /// Same matcher with literal keys lower-cased. Predicates are unchanged.
    pub fn with_lowercase_keys(&self) -> Matcher {
        match self {
            Matcher::Exact(value) => Matcher::Exact(lowercase_keys(value)),
            Matcher::Predicate(f) => Matcher::Predicate(Arc::clone(f)),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(<fn>)"),
        }
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Matcher::Exact(value)
    }
}

/// Evaluate an optional matcher. An absent matcher accepts any value.
pub fn evaluate(matcher: Option<&Matcher>, mode: MatchMode, actual: &Value) -> bool {
    matcher.map_or(true, |m| m.evaluate(mode, actual))
}

/// How a literal matcher is compared with the actual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Full structural equality
    Exact,
    /// Every expected key present with an equal value; extra keys ignored
    Contains,
}

/// One axis of request matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Headers,
    SearchParams,
    Body,
    Variables,
}

impl Dimension {
    /// Comparison mode used for literal matchers on this dimension.
    pub fn mode(self) -> MatchMode {
        match self {
            Dimension::Headers => MatchMode::Contains,
            Dimension::SearchParams | Dimension::Body | Dimension::Variables => MatchMode::Exact,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Headers => "headers",
            Dimension::SearchParams => "searchParams",
            Dimension::Body => "body",
            Dimension::Variables => "variables",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
