//! Read-only view of an inbound request.
//!
//! The body is held as an immutable [`Bytes`] buffer, so every handler that
//! inspects it decodes its own copy and no reader ever consumes it for the
//! others.

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE, HOST};
use hyper::{HeaderMap, Method, Uri};
use serde_json::{Map, Value};
use std::fmt::Display;

use crate::error::{BuilderError, Result};
use crate::matcher::parse_query_string;

/// Request descriptor handed to handlers.
#[derive(Debug, Clone)]
pub struct MockRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl MockRequest {
    /// Create a request with no headers and an empty body.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let uri: Uri = url.parse()?;
        Ok(MockRequest {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        })
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: &str) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Append a header. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body, adding `Content-Type: application/json` unless a
    /// content type is already present.
    pub fn with_json(mut self, value: &Value) -> Self {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        self.body = Bytes::from(value.to_string());
        self
    }

    /// Build from any `hyper` request, collecting its body into memory.
    ///
    /// Servers receive origin-form targets such as `/test`; those are made
    /// absolute from the `Host` header, with the scheme taken from
    /// `X-Forwarded-Proto` when present and `http` otherwise.
    pub async fn from_http<B>(req: hyper::Request<B>) -> Result<Self>
    where
        B: Body,
        B::Error: Display,
    {
        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| BuilderError::Body(e.to_string()))?
            .to_bytes();

        let uri = absolute_uri(parts.uri, &parts.headers)?;

        Ok(MockRequest {
            method: parts.method,
            uri,
            headers: parts.headers,
            body,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Full request URL as text.
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes. Cloning is cheap and never consumes the request.
    pub fn body_bytes(&self) -> Bytes {
        self.body.clone()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Headers as a JSON mapping of lower-cased name to value. Repeated
    /// headers are joined with `", "`.
    pub fn header_entries(&self) -> Value {
        Value::Object(header_map_to_object(&self.headers))
    }

    /// Search parameters as a JSON mapping; the last value wins on duplicates.
    pub fn search_params(&self) -> Value {
        Value::Object(parse_query_string(self.uri.query()))
    }
}

pub(crate) fn header_map_to_object(headers: &HeaderMap) -> Map<String, Value> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), Value::String(joined))
        })
        .collect()
}

fn absolute_uri(uri: Uri, headers: &HeaderMap) -> Result<Uri> {
    if uri.authority().is_some() {
        return Ok(uri);
    }
    let Some(host) = headers.get(HOST).and_then(|v| v.to_str().ok()) else {
        return Ok(uri);
    };
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or(uri.scheme_str())
        .unwrap_or("http");
    let target = uri.path_and_query().map_or("/", |p| p.as_str());
    Ok(format!("{scheme}://{host}{target}").parse()?)
}
