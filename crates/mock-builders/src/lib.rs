//! Request matchers and mock handler builders for HTTP and GraphQL tests.
//!
//! Handlers declare *which* request they respond to (method and path, or
//! GraphQL operation, plus optional header, search-parameter, body and
//! variable matchers) and *what* to respond with. Matching is structural:
//! headers use case-insensitive containment, everything else uses strict deep
//! equality, and any dimension can use a predicate instead.
//!
//! # Example
//!
//! ```no_run
//! use mock_builders::{
//!     FactoryOptions, GraphQlHandlersFactory, HandlerList, HandlerOptions, MockRequest,
//! };
//! use serde_json::json;
//!
//! # async fn run() -> mock_builders::Result<()> {
//! let graphql = GraphQlHandlersFactory::new(FactoryOptions::new("https://api.example.org/graphql"))?;
//! let handlers = HandlerList::new().with(graphql.query(
//!     "hello",
//!     json!({"id": "user-123"}),
//!     json!({"data": {"hello": "world"}}),
//!     HandlerOptions::new(),
//! )?);
//!
//! let request = MockRequest::post("https://api.example.org/graphql")?.with_json(&json!({
//!     "query": "query hello($id: ID!) { hello(id: $id) }",
//!     "variables": {"id": "user-123"}
//! }));
//! let outcome = handlers.dispatch(&request).await?;
//! assert!(outcome.is_match());
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod config;
pub mod debug;
pub mod diff;
pub mod error;
pub mod graphql;
pub mod handler;
pub mod matcher;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod rest;

pub use body::{extract_body_content, BodyEncoding, BodySource};
pub use config::{FactoryOptions, HandlerOptions, OnCalled, RequestHandlerOptions};
pub use debug::{debug_logger, ConsoleDebugLog, DebugLog, NullLogger};
pub use error::{BuilderError, Result};
pub use graphql::{
    GraphQlHandler, GraphQlHandlersFactory, OperationDocument, OperationKind, OperationName,
    ResultProvider,
};
pub use handler::{HandlerList, MatchOutcome, RequestHandler};
pub use matcher::{Dimension, MatchMode, Matcher, MatcherSet};
pub use request::MockRequest;
pub use response::{MockResponse, ResponseBuilder};
pub use rest::{ResolverInfo, Respond, RestHandler, RestHandlersFactory};
