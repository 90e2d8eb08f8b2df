//! Body content extraction.
//!
//! Decodes a request or response body into a JSON mapping based on its
//! `Content-Type`:
//! - `application/json` and vendor JSON types (`application/x-amz-json-1.1`,
//!   `application/vnd.api+json`, ...) are parsed as JSON
//! - `multipart/form-data` and `application/x-www-form-urlencoded` become a
//!   flat key/value mapping
//! - anything else yields an empty mapping, so a body matcher against such
//!   content never matches (no diagnostic is produced for this case)

use async_trait::async_trait;
use bytes::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;
use serde_json::{Map, Value};
use std::convert::Infallible;
use tracing::debug;

use crate::error::Result;
use crate::matcher::parse_form_pairs;
use crate::request::MockRequest;

/// Anything exposing headers and a re-readable body.
#[async_trait]
pub trait BodySource: Send + Sync {
    fn headers(&self) -> &HeaderMap;

    /// An independent copy of the body.
    fn body_bytes(&self) -> Bytes;

    /// Decode the body as JSON.
    async fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body_bytes())?)
    }

    /// Decode the body as form data, preserving field order.
    async fn form_data(&self) -> Result<Vec<(String, String)>> {
        let content_type = content_type(self.headers()).unwrap_or_default();
        decode_form(content_type, self.body_bytes()).await
    }
}

#[async_trait]
impl BodySource for MockRequest {
    fn headers(&self) -> &HeaderMap {
        MockRequest::headers(self)
    }

    fn body_bytes(&self) -> Bytes {
        MockRequest::body_bytes(self)
    }
}

/// Wire encoding of a body, as far as matching is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
    Unsupported,
}

impl BodyEncoding {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyEncoding::Unsupported;
        };

        // Custom JSON types, e.g. application/x-amz-json-1.1
        if content_type == "application/json"
            || content_type
                .strip_prefix("application/")
                .is_some_and(|subtype| subtype.contains("json"))
        {
            return BodyEncoding::Json;
        }

        if content_type.starts_with("multipart/form-data")
            || content_type.starts_with("application/x-www-form-urlencoded")
        {
            return BodyEncoding::Form;
        }

        BodyEncoding::Unsupported
    }
}

/// Decode a body into a mapping according to its content type.
pub async fn extract_body_content<S>(source: &S) -> Result<Value>
where
    S: BodySource + ?Sized,
{
    match BodyEncoding::from_content_type(content_type(source.headers())) {
        BodyEncoding::Json => source.json().await,
        BodyEncoding::Form => {
            let fields = source.form_data().await?;
            // Later duplicates overwrite earlier ones
            let map: Map<String, Value> = fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            Ok(Value::Object(map))
        }
        BodyEncoding::Unsupported => Ok(Value::Object(Map::new())),
    }
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

async fn decode_form(content_type: &str, body: Bytes) -> Result<Vec<(String, String)>> {
    if content_type.starts_with("multipart/form-data") {
        return decode_multipart(content_type, body).await;
    }
    Ok(parse_form_pairs(&String::from_utf8_lossy(&body)))
}

async fn decode_multipart(content_type: &str, body: Bytes) -> Result<Vec<(String, String)>> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            debug!("Skipping multipart field without a name");
            continue;
        };
        fields.push((name, field.text().await?));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuilderError;
    use serde_json::json;

    fn post() -> MockRequest {
        MockRequest::post("https://www.example.org/test").unwrap()
    }

    #[test]
    fn test_encoding_detection() {
        use BodyEncoding::*;
        assert_eq!(BodyEncoding::from_content_type(Some("application/json")), Json);
        assert_eq!(
            BodyEncoding::from_content_type(Some("application/json; charset=utf-8")),
            Json
        );
        assert_eq!(
            BodyEncoding::from_content_type(Some("application/x-amz-json-1.1")),
            Json
        );
        assert_eq!(
            BodyEncoding::from_content_type(Some("application/vnd.api+json")),
            Json
        );
        assert_eq!(
            BodyEncoding::from_content_type(Some("multipart/form-data; boundary=abc")),
            Form
        );
        assert_eq!(
            BodyEncoding::from_content_type(Some("application/x-www-form-urlencoded")),
            Form
        );
        assert_eq!(BodyEncoding::from_content_type(Some("text/plain")), Unsupported);
        assert_eq!(BodyEncoding::from_content_type(Some("text/json")), Unsupported);
        assert_eq!(BodyEncoding::from_content_type(None), Unsupported);
    }

    #[tokio::test]
    async fn test_json_body() {
        let request = post()
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"input":"Daniel"}"#);

        let body = extract_body_content(&request).await.unwrap();
        assert_eq!(body, json!({"input": "Daniel"}));
    }

    #[tokio::test]
    async fn test_body_is_re_readable() {
        let request = post()
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"input":"Daniel"}"#);

        let first = extract_body_content(&request).await.unwrap();
        let second = extract_body_content(&request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let request = post()
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("input=Daniel&greeting=hello+world&input=Dan");

        let body = extract_body_content(&request).await.unwrap();
        assert_eq!(body, json!({"input": "Dan", "greeting": "hello world"}));
    }

    #[tokio::test]
    async fn test_multipart_body() {
        let payload = concat!(
            "--X-BOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"input\"\r\n",
            "\r\n",
            "Daniel\r\n",
            "--X-BOUNDARY--\r\n",
        );
        let request = post()
            .with_header("Content-Type", "multipart/form-data; boundary=X-BOUNDARY")
            .with_body(payload);

        let body = extract_body_content(&request).await.unwrap();
        assert_eq!(body, json!({"input": "Daniel"}));
    }

    #[tokio::test]
    async fn test_unsupported_body_is_empty_mapping() {
        let request = post()
            .with_header("Content-Type", "text/plain")
            .with_body("input=Daniel");

        let body = extract_body_content(&request).await.unwrap();
        assert_eq!(body, json!({}));

        let no_type = post().with_body("anything");
        assert_eq!(extract_body_content(&no_type).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_malformed_json_propagates() {
        let request = post()
            .with_header("Content-Type", "application/json")
            .with_body("{not json");

        let err = extract_body_content(&request).await.unwrap_err();
        assert!(matches!(err, BuilderError::Json(_)));
    }
}
