//! Operation names: literals, patterns and parsed documents.

use graphql_parser::query::{parse_query, Definition, Document, OperationDefinition};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BuilderError, Result};

static QUERY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)query\s+([a-zA-Z0-9]+)").expect("valid regex"));
static MUTATION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mutation\s+([a-zA-Z0-9]+)").expect("valid regex"));

const UNNAMED_OPERATION: &str = "<unnamed operation>";

/// Kind of GraphQL operation a handler responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed GraphQL document.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDocument {
    document: Document<'static, String>,
}

impl OperationDocument {
    pub fn parse(source: &str) -> Result<Self> {
        let document = parse_query::<String>(source)
            .map_err(|e| BuilderError::InvalidDocument(e.to_string()))?
            .into_static();
        Ok(OperationDocument { document })
    }

    pub(crate) fn definitions(&self) -> &[Definition<'static, String>] {
        &self.document.definitions
    }
}

/// How a handler identifies the operation it responds to.
#[derive(Debug, Clone)]
pub enum OperationName {
    /// A bare name or the full text of an operation
    Literal(String),
    /// Tested against the operation name
    Pattern(Regex),
    /// The first operation of the matching kind supplies the name
    Document(OperationDocument),
}

impl From<&str> for OperationName {
    fn from(value: &str) -> Self {
        OperationName::Literal(value.to_string())
    }
}

impl From<String> for OperationName {
    fn from(value: String) -> Self {
        OperationName::Literal(value)
    }
}

impl From<Regex> for OperationName {
    fn from(value: Regex) -> Self {
        OperationName::Pattern(value)
    }
}

impl From<OperationDocument> for OperationName {
    fn from(value: OperationDocument) -> Self {
        OperationName::Document(value)
    }
}

/// Extract an operation name from text.
///
/// Full operation text such as `query viewerQuery { ... }` yields
/// `viewerQuery`; anything else is taken as the name itself.
pub fn name_from_text(kind: OperationKind, text: &str) -> String {
    let pattern = match kind {
        OperationKind::Query => &QUERY_NAME,
        OperationKind::Mutation => &MUTATION_NAME,
    };
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or_else(|| text.to_string(), |m| m.as_str().to_string())
}

/// Resolve the canonical name of an operation.
///
/// Documents fail with [`BuilderError::OperationNotFound`] when they have no
/// operation of `kind`, and [`BuilderError::UnnamedOperation`] when that
/// operation has no name.
///
/// Literal text that parses as a GraphQL document resolves like a document;
/// anything else goes through [`name_from_text`].
pub fn resolve_name(kind: OperationKind, name: &OperationName) -> Result<String> {
    match name {
        OperationName::Literal(text) => match OperationDocument::parse(text) {
            Ok(document) => document_name(kind, &document),
            Err(_) => Ok(name_from_text(kind, text)),
        },
        OperationName::Pattern(regex) => Ok(regex.as_str().to_string()),
        OperationName::Document(document) => document_name(kind, document),
    }
}

fn document_name(kind: OperationKind, document: &OperationDocument) -> Result<String> {
    let operation = document
        .definitions()
        .iter()
        .find_map(|definition| match (kind, definition) {
            (OperationKind::Query, Definition::Operation(OperationDefinition::Query(query))) => {
                Some(query.name.as_ref())
            }
            (
                OperationKind::Mutation,
                Definition::Operation(OperationDefinition::Mutation(mutation)),
            ) => Some(mutation.name.as_ref()),
            _ => None,
        })
        .ok_or(BuilderError::OperationNotFound(kind))?;
    operation
        .cloned()
        .ok_or(BuilderError::UnnamedOperation(kind))
}

/// Name shown in diagnostics for a handler.
pub fn display_name(name: &OperationName) -> String {
    match name {
        OperationName::Literal(text) => text.clone(),
        OperationName::Pattern(regex) => regex.as_str().to_string(),
        OperationName::Document(document) => document
            .definitions()
            .iter()
            .find_map(definition_name)
            .unwrap_or(UNNAMED_OPERATION)
            .to_string(),
    }
}

fn definition_name<'a>(definition: &'a Definition<'static, String>) -> Option<&'a str> {
    match definition {
        Definition::Operation(OperationDefinition::Query(q)) => q.name.as_deref(),
        Definition::Operation(OperationDefinition::Mutation(m)) => m.name.as_deref(),
        Definition::Operation(OperationDefinition::Subscription(s)) => s.name.as_deref(),
        Definition::Operation(OperationDefinition::SelectionSet(_)) => None,
        Definition::Fragment(f) => Some(f.name.as_str()),
    }
}
