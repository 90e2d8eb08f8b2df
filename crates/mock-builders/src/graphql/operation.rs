//! Extraction of the GraphQL operation carried by a request.

use graphql_parser::query::{Definition, OperationDefinition};
use hyper::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::name::{OperationDocument, OperationKind};
use crate::error::Result;
use crate::matcher::parse_query_string;
use crate::request::MockRequest;

/// The operation a GraphQL request asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub kind: OperationKind,
    /// `None` for anonymous operations
    pub name: Option<String>,
    /// Always an object; missing or `null` variables become `{}`
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlPayload {
    query: Option<String>,
    #[serde(default)]
    variables: Option<Value>,
    operation_name: Option<String>,
}

/// Parse the operation from a `POST` JSON payload or `GET` query string.
///
/// Returns `Ok(None)` for requests that are not GraphQL requests and for
/// subscriptions. A request whose `query` is not a valid document fails with
/// [`BuilderError::InvalidDocument`](crate::BuilderError::InvalidDocument).
pub fn parse_operation(request: &MockRequest) -> Result<Option<OperationDescriptor>> {
    let Some(payload) = read_payload(request) else {
        return Ok(None);
    };
    let Some(query) = payload.query else {
        return Ok(None);
    };

    let document = OperationDocument::parse(&query)?;
    let Some((kind, name)) = select_operation(&document, payload.operation_name.as_deref()) else {
        return Ok(None);
    };

    let variables = match payload.variables {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(variables) => variables,
    };

    Ok(Some(OperationDescriptor {
        kind,
        name,
        variables,
    }))
}

fn read_payload(request: &MockRequest) -> Option<GraphQlPayload> {
    if request.method() == Method::POST {
        return serde_json::from_slice(&request.body_bytes())
            .map_err(|e| debug!("Ignoring non-GraphQL POST body: {}", e))
            .ok();
    }

    if request.method() == Method::GET {
        let params = parse_query_string(request.uri().query());
        let text = |key: &str| params.get(key).and_then(Value::as_str).map(str::to_string);

        let variables = match text("variables") {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .map_err(|e| debug!("Ignoring GraphQL GET request with invalid variables: {}", e))
                    .ok()?,
            ),
            None => None,
        };
        return Some(GraphQlPayload {
            query: text("query"),
            variables,
            operation_name: text("operationName"),
        });
    }

    None
}

fn select_operation(
    document: &OperationDocument,
    operation_name: Option<&str>,
) -> Option<(OperationKind, Option<String>)> {
    let selected = document.definitions().iter().find_map(|definition| {
        let Definition::Operation(operation) = definition else {
            return None;
        };
        let name = match operation {
            OperationDefinition::Query(q) => q.name.as_deref(),
            OperationDefinition::Mutation(m) => m.name.as_deref(),
            OperationDefinition::Subscription(s) => s.name.as_deref(),
            OperationDefinition::SelectionSet(_) => None,
        };
        match operation_name {
            Some(wanted) if name != Some(wanted) => None,
            _ => Some((operation, name)),
        }
    })?;

    let (operation, name) = selected;
    let kind = match operation {
        OperationDefinition::Query(_) | OperationDefinition::SelectionSet(_) => OperationKind::Query,
        OperationDefinition::Mutation(_) => OperationKind::Mutation,
        OperationDefinition::Subscription(_) => {
            warn!(
                "GraphQL subscription {} cannot be mocked, ignoring",
                name.unwrap_or("(anonymous)")
            );
            return None;
        }
    };
    Some((kind, name.map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuilderError;
    use serde_json::json;

    const ENDPOINT: &str = "https://www.example.org/graphql";

    fn post(payload: Value) -> MockRequest {
        MockRequest::post(ENDPOINT).unwrap().with_json(&payload)
    }

    #[test]
    fn test_post_query_with_variables() {
        let request = post(json!({
            "query": "query hello($id: ID!) { hello(id: $id) }",
            "variables": {"id": "user-123"}
        }));

        let operation = parse_operation(&request).unwrap().unwrap();
        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(operation.name.as_deref(), Some("hello"));
        assert_eq!(operation.variables, json!({"id": "user-123"}));
    }

    #[test]
    fn test_missing_or_null_variables_are_empty() {
        let missing = post(json!({"query": "mutation setHello { setHello }"}));
        let operation = parse_operation(&missing).unwrap().unwrap();
        assert_eq!(operation.kind, OperationKind::Mutation);
        assert_eq!(operation.variables, json!({}));

        let null = post(json!({"query": "query hello { hello }", "variables": null}));
        assert_eq!(parse_operation(&null).unwrap().unwrap().variables, json!({}));
    }

    #[test]
    fn test_operation_name_selects_definition() {
        let request = post(json!({
            "query": "query first { a } mutation second { b }",
            "operationName": "second"
        }));
        let operation = parse_operation(&request).unwrap().unwrap();
        assert_eq!(operation.kind, OperationKind::Mutation);
        assert_eq!(operation.name.as_deref(), Some("second"));

        let unknown = post(json!({"query": "query first { a }", "operationName": "missing"}));
        assert_eq!(parse_operation(&unknown).unwrap(), None);
    }

    #[test]
    fn test_shorthand_is_anonymous_query() {
        let operation = parse_operation(&post(json!({"query": "{ hello }"})))
            .unwrap()
            .unwrap();
        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(operation.name, None);
    }

    #[test]
    fn test_get_request() {
        let request = MockRequest::get(
            "https://www.example.org/graphql?query=query%20hello%20%7B%20hello%20%7D&variables=%7B%22id%22%3A%221%22%7D",
        )
        .unwrap();
        let operation = parse_operation(&request).unwrap().unwrap();
        assert_eq!(operation.name.as_deref(), Some("hello"));
        assert_eq!(operation.variables, json!({"id": "1"}));
    }

    #[test]
    fn test_non_graphql_requests() {
        let not_json = MockRequest::post(ENDPOINT).unwrap().with_body("plain text");
        assert_eq!(parse_operation(&not_json).unwrap(), None);

        let no_query = post(json!({"hello": "world"}));
        assert_eq!(parse_operation(&no_query).unwrap(), None);

        let put = MockRequest::new(Method::PUT, ENDPOINT)
            .unwrap()
            .with_json(&json!({"query": "{ a }"}));
        assert_eq!(parse_operation(&put).unwrap(), None);
    }

    #[test]
    fn test_subscription_is_ignored() {
        let request = post(json!({"query": "subscription onHello { hello }"}));
        assert_eq!(parse_operation(&request).unwrap(), None);
    }

    #[test]
    fn test_invalid_document_propagates() {
        let request = post(json!({"query": "query {"}));
        assert!(matches!(
            parse_operation(&request),
            Err(BuilderError::InvalidDocument(_))
        ));
    }
}
