//! Per-request resolution pipeline.
//!
//! Checks run in a fixed order and stop at the first failing dimension:
//! headers, then search parameters, then body (REST) or variables (GraphQL).
//! Only the first failure is logged. The body is decoded last and only when a
//! body matcher is declared.

use serde_json::Value;

use crate::body::extract_body_content;
use crate::debug::DebugLog;
use crate::diff::describe;
use crate::error::Result;
use crate::matcher::{evaluate, lowercase_keys, Dimension, Matcher, MatcherSet};
use crate::request::MockRequest;

/// Resolution of one request against one handler's matchers.
pub struct Resolution<'a> {
    logger: &'a dyn DebugLog,
    /// REST method or GraphQL operation kind, as shown in diagnostics
    label: String,
    /// Handler URL or GraphQL operation name, as shown in diagnostics
    target: &'a str,
}

impl<'a> Resolution<'a> {
    pub fn new(logger: &'a dyn DebugLog, label: impl Into<String>, target: &'a str) -> Self {
        Resolution {
            logger,
            label: label.into(),
            target,
        }
    }

    /// Evaluate one dimension, logging a diff on failure.
    pub fn check(&self, dimension: Dimension, matcher: Option<&Matcher>, actual: &Value) -> bool {
        if evaluate(matcher, dimension.mode(), actual) {
            return true;
        }
        if let Some(expected) = matcher {
            self.logger.log_with(&|| {
                describe(dimension, &self.label, self.target, expected, actual)
            });
        }
        false
    }

    fn check_headers(&self, matcher: Option<&Matcher>, request: &MockRequest) -> bool {
        let Some(matcher) = matcher else {
            return true;
        };
        let actual = lowercase_keys(&request.header_entries());
        self.check(
            Dimension::Headers,
            Some(&matcher.with_lowercase_keys()),
            &actual,
        )
    }

    /// Run headers, search parameters and body checks for a REST request.
    pub async fn check_rest(&self, matchers: &MatcherSet, request: &MockRequest) -> Result<bool> {
        if !self.check_headers(matchers.headers.as_ref(), request) {
            return Ok(false);
        }

        if !self.check(
            Dimension::SearchParams,
            matchers.search_params.as_ref(),
            &request.search_params(),
        ) {
            return Ok(false);
        }

        if let Some(body) = matchers.body.as_ref() {
            let actual = extract_body_content(request).await?;
            if !self.check(Dimension::Body, Some(body), &actual) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Run headers and variables checks for a GraphQL operation.
    pub fn check_operation(
        &self,
        matchers: &MatcherSet,
        request: &MockRequest,
        variables: &Value,
    ) -> bool {
        self.check_headers(matchers.headers.as_ref(), request)
            && self.check(
                Dimension::Variables,
                matchers.get(Dimension::Variables),
                variables,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::NullLogger;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl DebugLog for Recorder {
        fn log(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    const URL: &str = "https://www.example.org/test";

    fn request() -> MockRequest {
        MockRequest::post("https://www.example.org/test?id=id-123")
            .unwrap()
            .with_header("AUTH", "token-123")
            .with_header("user-agent", "node-fetch/1.0")
            .with_json(&json!({"input": "Daniel"}))
    }

    #[tokio::test]
    async fn test_all_dimensions_pass() {
        let matchers = MatcherSet::new()
            .headers(json!({"Auth": "token-123"}))
            .search_params(json!({"id": "id-123"}))
            .body(json!({"input": "Daniel"}));

        let resolution = Resolution::new(&NullLogger, "POST", URL);
        assert!(resolution.check_rest(&matchers, &request()).await.unwrap());
    }

    #[tokio::test]
    async fn test_first_failure_short_circuits() {
        let logger = Recorder::default();
        let matchers = MatcherSet::new()
            .headers(json!({"auth": "other"}))
            .body(json!({"input": "Someone else"}));

        let resolution = Resolution::new(&logger, "POST", URL);
        assert!(!resolution.check_rest(&matchers, &request()).await.unwrap());

        let messages = logger.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("POST https://www.example.org/test headers differ"));
    }

    #[tokio::test]
    async fn test_search_params_are_exact() {
        let logger = Recorder::default();
        let matchers = MatcherSet::new().search_params(json!({}));

        let resolution = Resolution::new(&logger, "POST", URL);
        assert!(!resolution.check_rest(&matchers, &request()).await.unwrap());
        assert!(logger.messages()[0].contains("searchParams differ"));
    }

    #[tokio::test]
    async fn test_body_not_decoded_without_matcher() {
        // Malformed JSON is never read when no body matcher is declared
        let request = MockRequest::post(URL)
            .unwrap()
            .with_header("Content-Type", "application/json")
            .with_body("{broken");

        let resolution = Resolution::new(&NullLogger, "POST", URL);
        assert!(resolution
            .check_rest(&MatcherSet::new(), &request)
            .await
            .unwrap());

        let with_body = MatcherSet::new().body(json!({}));
        assert!(resolution.check_rest(&with_body, &request).await.is_err());
    }

    #[test]
    fn test_predicate_failure_message() {
        let logger = Recorder::default();
        let matchers = MatcherSet::for_operation(None, Matcher::predicate(|_| false));

        let resolution = Resolution::new(&logger, "query", "hello");
        assert!(!resolution.check_operation(&matchers, &request(), &json!({})));
        assert_eq!(
            logger.messages(),
            vec!["query hello variables differ\ndoesn't match function matcher".to_string()]
        );
    }

    #[test]
    fn test_operation_variables() {
        let matchers = MatcherSet::for_operation(
            Some(Matcher::exact(json!({"auth": "token-123"}))),
            Matcher::exact(json!({"id": "user-123"})),
        );
        let resolution = Resolution::new(&NullLogger, "query", "hello");

        assert!(resolution.check_operation(&matchers, &request(), &json!({"id": "user-123"})));
        assert!(!resolution.check_operation(&matchers, &request(), &json!({"id": "user-xyz"})));
    }
}
