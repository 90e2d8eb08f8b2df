//! Error types for handler construction and request resolution.
//!
//! A request that simply does not satisfy a matcher is not an error: handlers
//! report it as [`MatchOutcome::NoMatch`](crate::handler::MatchOutcome). The
//! variants here cover caller misconfiguration and malformed request payloads.

use crate::graphql::OperationKind;

/// Errors raised while building handlers or resolving a request against one.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("{0} not found in document")]
    OperationNotFound(OperationKind),

    #[error("{0} document has no name")]
    UnnamedOperation(OperationKind),

    #[error("Invalid GraphQL document: {0}")]
    InvalidDocument(String),

    #[error("Invalid URL pattern '{pattern}': {source}")]
    InvalidUrlPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),

    #[error("Failed to decode JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode form data: {0}")]
    Form(#[from] multer::Error),

    #[error("Failed to read body: {0}")]
    Body(String),
}

pub type Result<T, E = BuilderError> = std::result::Result<T, E>;
