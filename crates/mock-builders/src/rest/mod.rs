//! REST handler factory.
//!
//! ```no_run
//! use mock_builders::{FactoryOptions, HandlerOptions, MatcherSet, MockResponse, RestHandlersFactory};
//! use serde_json::json;
//!
//! # fn main() -> mock_builders::Result<()> {
//! let rest = RestHandlersFactory::new(FactoryOptions::new("https://api.example.org").with_debug(true));
//! let handler = rest.post(
//!     "/users",
//!     MatcherSet::new()
//!         .headers(json!({"auth": "token-123"}))
//!         .body(json!({"name": "Daniel"})),
//!     MockResponse::json(&json!({"id": "user-123"})),
//!     HandlerOptions::new(),
//! )?;
//! # Ok(())
//! # }
//! ```

mod url;

pub use url::{create_full_url, UrlPattern};

use async_trait::async_trait;
use hyper::Method;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{FactoryOptions, HandlerOptions};
use crate::debug::{debug_logger, DebugLog};
use crate::error::Result;
use crate::handler::{MatchOutcome, Registration, RequestHandler};
use crate::matcher::MatcherSet;
use crate::pipeline::Resolution;
use crate::request::MockRequest;
use crate::response::MockResponse;

/// Everything a response producer gets to see.
#[derive(Debug, Clone)]
pub struct ResolverInfo {
    /// Independent copy of the matched request
    pub request: MockRequest,
    /// Path parameters captured by `:name` segments
    pub params: HashMap<String, String>,
}

/// Produces the response for a matched REST request.
#[async_trait]
pub trait Respond: Send + Sync {
    async fn respond(&self, info: ResolverInfo) -> MockResponse;
}

#[async_trait]
impl<F> Respond for F
where
    F: Fn(ResolverInfo) -> MockResponse + Send + Sync,
{
    async fn respond(&self, info: ResolverInfo) -> MockResponse {
        (self)(info)
    }
}

#[async_trait]
impl Respond for MockResponse {
    async fn respond(&self, _info: ResolverInfo) -> MockResponse {
        self.clone()
    }
}

/// Builds REST handlers rooted at a base URL.
#[derive(Clone)]
pub struct RestHandlersFactory {
    options: FactoryOptions,
    logger: Arc<dyn DebugLog>,
}

impl RestHandlersFactory {
    pub fn new(options: FactoryOptions) -> Self {
        let logger = debug_logger(&options.url, options.debug);
        RestHandlersFactory { options, logger }
    }

    pub fn get(
        &self,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        self.handler(Method::GET, path, matchers, response, options)
    }

    pub fn post(
        &self,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        self.handler(Method::POST, path, matchers, response, options)
    }

    pub fn put(
        &self,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        self.handler(Method::PUT, path, matchers, response, options)
    }

    pub fn patch(
        &self,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        self.handler(Method::PATCH, path, matchers, response, options)
    }

    pub fn options(
        &self,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        self.handler(Method::OPTIONS, path, matchers, response, options)
    }

    pub fn delete(
        &self,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        self.handler(Method::DELETE, path, matchers, response, options)
    }

    fn handler(
        &self,
        method: Method,
        path: &str,
        matchers: MatcherSet,
        response: impl Respond + 'static,
        options: HandlerOptions,
    ) -> Result<RestHandler> {
        let full_url = create_full_url(&self.options.url, path);
        let pattern = UrlPattern::compile(&full_url)?;
        let request_options = self.options.request_options(options.request);
        let registration = Registration::new(
            matchers.with_fallback_headers(options.headers),
            Arc::clone(&self.logger),
            options.on_called,
            request_options,
        );

        Ok(RestHandler {
            method,
            full_url,
            pattern,
            registration,
            response: Box::new(response),
        })
    }
}

/// A REST mock bound to a method and URL.
pub struct RestHandler {
    method: Method,
    full_url: String,
    pattern: UrlPattern,
    registration: Registration,
    response: Box<dyn Respond>,
}

impl RestHandler {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.full_url
    }
}

#[async_trait]
impl RequestHandler for RestHandler {
    fn info(&self) -> String {
        format!("{} {}", self.method, self.full_url)
    }

    async fn run(&self, request: &MockRequest) -> Result<MatchOutcome> {
        if request.method() != self.method {
            return Ok(MatchOutcome::NoMatch);
        }
        let Some(params) = self.pattern.matches(request.uri()) else {
            return Ok(MatchOutcome::NoMatch);
        };
        if self.registration.is_exhausted() {
            return Ok(MatchOutcome::NoMatch);
        }

        let resolution = Resolution::new(
            self.registration.logger.as_ref(),
            self.method.as_str(),
            &self.full_url,
        );
        if !resolution
            .check_rest(&self.registration.matchers, request)
            .await?
        {
            return Ok(MatchOutcome::NoMatch);
        }

        if !self.registration.claim().await {
            return Ok(MatchOutcome::NoMatch);
        }

        let info = ResolverInfo {
            request: request.clone(),
            params,
        };
        Ok(MatchOutcome::Matched(self.response.respond(info).await))
    }
}
