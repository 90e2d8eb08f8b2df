//! Handler registrations and dispatch.
//!
//! A handler only reports whether it matched a request; [`HandlerList`] tries
//! handlers in registration order and stops at the first match.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::config::{OnCalled, RequestHandlerOptions};
use crate::debug::DebugLog;
use crate::error::Result;
use crate::matcher::MatcherSet;
use crate::request::MockRequest;
use crate::response::MockResponse;

/// Result of resolving a request against one handler.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Yield to the next handler
    NoMatch,
    Matched(MockResponse),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    pub fn response(&self) -> Option<&MockResponse> {
        match self {
            MatchOutcome::Matched(response) => Some(response),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn into_response(self) -> Option<MockResponse> {
        match self {
            MatchOutcome::Matched(response) => Some(response),
            MatchOutcome::NoMatch => None,
        }
    }
}

/// A mock handler as seen by the dispatcher.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Short description used in logs, e.g. `POST https://api/test`.
    fn info(&self) -> String;

    async fn run(&self, request: &MockRequest) -> Result<MatchOutcome>;
}

/// State shared by REST and GraphQL handlers: matchers, callback, logger and
/// transport options. Everything except the `once` flag is fixed at creation.
pub(crate) struct Registration {
    pub(crate) matchers: MatcherSet,
    pub(crate) logger: Arc<dyn DebugLog>,
    on_called: Option<OnCalled>,
    options: RequestHandlerOptions,
    used: AtomicBool,
}

impl Registration {
    pub(crate) fn new(
        matchers: MatcherSet,
        logger: Arc<dyn DebugLog>,
        on_called: Option<OnCalled>,
        options: RequestHandlerOptions,
    ) -> Self {
        Registration {
            matchers,
            logger,
            on_called,
            options,
            used: AtomicBool::new(false),
        }
    }

    /// A `once` handler that has already responded.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.options.once && self.used.load(Ordering::Acquire)
    }

    /// Record a successful match and fire `onCalled`.
    ///
    /// Returns `false` if a concurrent request claimed a `once` handler first.
    pub(crate) async fn claim(&self) -> bool {
        if self.options.once && self.used.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(on_called) = &self.on_called {
            on_called.call().await;
        }
        true
    }
}

/// Ordered collection of handlers; the first match wins.
#[derive(Default, Clone)]
pub struct HandlerList {
    handlers: Vec<Arc<dyn RequestHandler>>,
}

impl HandlerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<H: RequestHandler + 'static>(&mut self, handler: H) -> &mut Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn with<H: RequestHandler + 'static>(mut self, handler: H) -> Self {
        self.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Resolve a request against each handler in order.
    pub async fn dispatch(&self, request: &MockRequest) -> Result<MatchOutcome> {
        for handler in &self.handlers {
            let outcome = handler.run(request).await?;
            if outcome.is_match() {
                trace!("{} matched {} {}", handler.info(), request.method(), request.url());
                return Ok(outcome);
            }
        }
        Ok(MatchOutcome::NoMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::NullLogger;
    use hyper::StatusCode;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct Fixed {
        name: &'static str,
        respond: bool,
    }

    #[async_trait]
    impl RequestHandler for Fixed {
        fn info(&self) -> String {
            self.name.to_string()
        }

        async fn run(&self, _request: &MockRequest) -> Result<MatchOutcome> {
            Ok(if self.respond {
                MatchOutcome::Matched(MockResponse::json(&json!({"from": self.name})))
            } else {
                MatchOutcome::NoMatch
            })
        }
    }

    fn registration(once: bool, counter: Arc<AtomicUsize>) -> Registration {
        Registration::new(
            MatcherSet::new(),
            Arc::new(NullLogger),
            Some(OnCalled::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            RequestHandlerOptions { once },
        )
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let list = HandlerList::new()
            .with(Fixed { name: "first", respond: false })
            .with(Fixed { name: "second", respond: true })
            .with(Fixed { name: "third", respond: true });

        let request = MockRequest::get("https://www.example.org/").unwrap();
        let outcome = list.dispatch(&request).await.unwrap();
        let response = outcome.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body_bytes(), r#"{"from":"second"}"#);
    }

    #[tokio::test]
    async fn test_empty_list_yields_no_match() {
        let list = HandlerList::new();
        assert!(list.is_empty());
        let request = MockRequest::get("https://www.example.org/").unwrap();
        assert_eq!(list.dispatch(&request).await.unwrap(), MatchOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_claim_fires_on_called_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registration = registration(false, Arc::clone(&counter));

        assert!(registration.claim().await);
        assert!(registration.claim().await);
        assert!(!registration.is_exhausted());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_once_claims_a_single_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registration = registration(true, Arc::clone(&counter));

        assert!(!registration.is_exhausted());
        assert!(registration.claim().await);
        assert!(registration.is_exhausted());
        assert!(!registration.claim().await);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
