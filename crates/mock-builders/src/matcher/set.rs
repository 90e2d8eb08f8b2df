//! Aggregate of the matchers declared for one handler.

use super::evaluate::{Dimension, Matcher};

/// Optional matchers keyed by dimension.
///
/// REST handlers read `headers`, `search_params` and `body`; GraphQL handlers
/// read `headers` and `variables`. A missing matcher accepts any value.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    pub headers: Option<Matcher>,
    pub search_params: Option<Matcher>,
    pub body: Option<Matcher>,
    pub(crate) variables: Option<Matcher>,
}

impl MatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(mut self, matcher: impl Into<Matcher>) -> Self {
        self.headers = Some(matcher.into());
        self
    }

    pub fn search_params(mut self, matcher: impl Into<Matcher>) -> Self {
        self.search_params = Some(matcher.into());
        self
    }

    pub fn body(mut self, matcher: impl Into<Matcher>) -> Self {
        self.body = Some(matcher.into());
        self
    }

    /// Matchers for a GraphQL operation.
    pub(crate) fn for_operation(headers: Option<Matcher>, variables: Matcher) -> Self {
        MatcherSet {
            headers,
            search_params: None,
            body: None,
            variables: Some(variables),
        }
    }

    /// Fill in a header matcher only if none was declared.
    pub(crate) fn with_fallback_headers(mut self, headers: Option<Matcher>) -> Self {
        if self.headers.is_none() {
            self.headers = headers;
        }
        self
    }

    pub fn get(&self, dimension: Dimension) -> Option<&Matcher> {
        match dimension {
            Dimension::Headers => self.headers.as_ref(),
            Dimension::SearchParams => self.search_params.as_ref(),
            Dimension::Body => self.body.as_ref(),
            Dimension::Variables => self.variables.as_ref(),
        }
    }
}
