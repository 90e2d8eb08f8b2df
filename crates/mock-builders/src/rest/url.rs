//! URL joining and URL patterns.

use hyper::Uri;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{BuilderError, Result};

/// Join a base URL and a path with exactly one `/` between them.
///
/// An empty path yields the base URL unchanged.
pub fn create_full_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Compiled handler URL.
///
/// Supports `:name` path parameters, `*` wildcards and an optional trailing
/// slash. A pattern with a scheme and host also requires the same origin.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    origin: Option<String>,
    path: Regex,
}

impl UrlPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        // Query and fragment are not part of routing
        let trimmed = pattern
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let (origin, path) = split_origin(trimmed);
        let mut regex = String::from("^");
        for (i, segment) in path.split('/').enumerate() {
            if i > 0 {
                regex.push('/');
            }
            regex.push_str(&segment_regex(segment));
        }
        if regex.ends_with('/') {
            regex.pop();
        }
        regex.push_str("/?$");

        let path = Regex::new(&regex).map_err(|source| BuilderError::InvalidUrlPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(UrlPattern {
            source: pattern.to_string(),
            origin: origin.map(str::to_ascii_lowercase),
            path,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a request URI, returning the captured path parameters.
    pub fn matches(&self, uri: &Uri) -> Option<HashMap<String, String>> {
        if let Some(origin) = &self.origin {
            let actual = match (uri.scheme_str(), uri.authority()) {
                (Some(scheme), Some(authority)) => format!("{scheme}://{authority}"),
                _ => return None,
            };
            if !actual.eq_ignore_ascii_case(origin) {
                return None;
            }
        }

        let captures = self.path.captures(uri.path())?;
        let params = self
            .path
            .capture_names()
            .flatten()
            .filter_map(|name| {
                let value = captures.name(name)?.as_str();
                let decoded = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((name.to_string(), decoded))
            })
            .collect();
        Some(params)
    }
}

fn split_origin(url: &str) -> (Option<&str>, &str) {
    let Some(scheme_end) = url.find("://") else {
        return (None, url);
    };
    let rest = &url[scheme_end + 3..];
    match rest.find('/') {
        Some(path_start) => {
            let split = scheme_end + 3 + path_start;
            (Some(&url[..split]), &url[split..])
        }
        None => (Some(url), "/"),
    }
}

fn segment_regex(segment: &str) -> String {
    if let Some(name) = segment.strip_prefix(':') {
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return format!("(?P<{name}>[^/]+)");
        }
    }
    segment
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}
