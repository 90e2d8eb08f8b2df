//! GraphQL handler factory.
//!
//! Handlers are bound to an endpoint URL and route on the operation carried
//! by the request:
//! - `query` and `mutation` handlers match by operation kind and name
//! - `operation` handlers match any query or mutation, on variables alone
//!
//! Once routed, variables are compared by strict deep equality.

mod name;
mod operation;

pub use name::{display_name, name_from_text, resolve_name, OperationDocument, OperationKind, OperationName};
pub use operation::{parse_operation, OperationDescriptor};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::{FactoryOptions, HandlerOptions};
use crate::debug::{debug_logger, DebugLog};
use crate::error::Result;
use crate::handler::{MatchOutcome, Registration, RequestHandler};
use crate::matcher::{Matcher, MatcherSet};
use crate::pipeline::Resolution;
use crate::request::MockRequest;
use crate::response::MockResponse;
use crate::rest::UrlPattern;

/// Response payload of a GraphQL handler.
#[derive(Clone)]
pub enum ResultProvider {
    Static(Value),
    /// Computed from the matched variables
    Dynamic(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
}

impl ResultProvider {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        ResultProvider::Dynamic(Arc::new(f))
    }

    pub fn provide(&self, variables: &Value) -> Value {
        match self {
            ResultProvider::Static(value) => value.clone(),
            ResultProvider::Dynamic(f) => f(variables),
        }
    }
}

impl From<Value> for ResultProvider {
    fn from(value: Value) -> Self {
        ResultProvider::Static(value)
    }
}

impl fmt::Debug for ResultProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultProvider::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ResultProvider::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// Which operations a handler routes to.
#[derive(Debug, Clone)]
enum Route {
    Named { kind: OperationKind, name: NameRoute },
    AnyOperation,
}

#[derive(Debug, Clone)]
enum NameRoute {
    Exact(String),
    Pattern(Regex),
}

impl Route {
    fn accepts(&self, operation: &OperationDescriptor) -> bool {
        match self {
            Route::AnyOperation => true,
            Route::Named { kind, name } => {
                if *kind != operation.kind {
                    return false;
                }
                // Anonymous operations only reach `operation` handlers
                let Some(actual) = operation.name.as_deref() else {
                    return false;
                };
                match name {
                    NameRoute::Exact(expected) => expected == actual,
                    NameRoute::Pattern(regex) => regex.is_match(actual),
                }
            }
        }
    }

    /// Label and target shown in diff messages.
    fn diagnostics(&self, display: &str) -> (String, String) {
        match self {
            Route::Named { kind, .. } => (kind.to_string(), display.to_string()),
            Route::AnyOperation => ("operation".to_string(), "(anonymous)".to_string()),
        }
    }
}

/// Builds GraphQL handlers bound to one endpoint.
#[derive(Clone)]
pub struct GraphQlHandlersFactory {
    options: FactoryOptions,
    link: UrlPattern,
    logger: Arc<dyn DebugLog>,
}

impl GraphQlHandlersFactory {
    pub fn new(options: FactoryOptions) -> Result<Self> {
        let link = UrlPattern::compile(&options.url)?;
        let logger = debug_logger(&options.url, options.debug);
        Ok(GraphQlHandlersFactory {
            options,
            link,
            logger,
        })
    }

    pub fn query(
        &self,
        name: impl Into<OperationName>,
        expected_variables: impl Into<Matcher>,
        result: impl Into<ResultProvider>,
        options: HandlerOptions,
    ) -> Result<GraphQlHandler> {
        self.named(OperationKind::Query, name.into(), expected_variables.into(), result.into(), options)
    }

    pub fn mutation(
        &self,
        name: impl Into<OperationName>,
        expected_variables: impl Into<Matcher>,
        result: impl Into<ResultProvider>,
        options: HandlerOptions,
    ) -> Result<GraphQlHandler> {
        self.named(OperationKind::Mutation, name.into(), expected_variables.into(), result.into(), options)
    }

    /// Handler for any query or mutation, matched on variables only.
    ///
    /// Factory-level request handler defaults do not apply here; only the
    /// options passed in do.
    pub fn operation(
        &self,
        expected_variables: impl Into<Matcher>,
        result: impl Into<ResultProvider>,
        options: HandlerOptions,
    ) -> GraphQlHandler {
        let registration = Registration::new(
            MatcherSet::for_operation(options.headers, expected_variables.into()),
            Arc::clone(&self.logger),
            options.on_called,
            options.request.unwrap_or_default(),
        );
        GraphQlHandler {
            link: self.link.clone(),
            route: Route::AnyOperation,
            display: "(anonymous)".to_string(),
            registration,
            result: result.into(),
        }
    }

    fn named(
        &self,
        kind: OperationKind,
        name: OperationName,
        expected_variables: Matcher,
        result: ResultProvider,
        options: HandlerOptions,
    ) -> Result<GraphQlHandler> {
        let display = display_name(&name);
        let route = match name {
            OperationName::Pattern(regex) => NameRoute::Pattern(regex),
            other => NameRoute::Exact(resolve_name(kind, &other)?),
        };

        let registration = Registration::new(
            MatcherSet::for_operation(options.headers, expected_variables),
            Arc::clone(&self.logger),
            options.on_called,
            self.options.request_options(options.request),
        );
        Ok(GraphQlHandler {
            link: self.link.clone(),
            route: Route::Named { kind, name: route },
            display,
            registration,
            result,
        })
    }
}

/// A GraphQL mock bound to an endpoint and operation.
pub struct GraphQlHandler {
    link: UrlPattern,
    route: Route,
    display: String,
    registration: Registration,
    result: ResultProvider,
}

#[async_trait]
impl RequestHandler for GraphQlHandler {
    fn info(&self) -> String {
        match &self.route {
            Route::Named { kind, .. } => format!("{} {} ({})", kind, self.display, self.link.as_str()),
            Route::AnyOperation => format!("all operations ({})", self.link.as_str()),
        }
    }

    async fn run(&self, request: &MockRequest) -> Result<MatchOutcome> {
        if self.link.matches(request.uri()).is_none() {
            return Ok(MatchOutcome::NoMatch);
        }
        let Some(operation) = parse_operation(request)? else {
            return Ok(MatchOutcome::NoMatch);
        };
        if !self.route.accepts(&operation) || self.registration.is_exhausted() {
            return Ok(MatchOutcome::NoMatch);
        }

        let (label, target) = self.route.diagnostics(&self.display);
        let resolution = Resolution::new(self.registration.logger.as_ref(), label, &target);
        if !resolution.check_operation(&self.registration.matchers, request, &operation.variables) {
            return Ok(MatchOutcome::NoMatch);
        }

        if !self.registration.claim().await {
            return Ok(MatchOutcome::NoMatch);
        }

        let body = self.result.provide(&operation.variables);
        Ok(MatchOutcome::Matched(MockResponse::json(&body)))
    }
}
