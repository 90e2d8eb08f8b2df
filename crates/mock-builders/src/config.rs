//! Factory and handler options.
//!
//! [`FactoryOptions`] can be built in code or loaded from YAML:
//!
//! ```yaml
//! url: https://api.example.org/graphql
//! debug: true
//! defaultRequestHandlerOptions:
//!   once: false
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;
use hyper::Uri;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use crate::matcher::Matcher;

/// Options passed through to request routing rather than matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestHandlerOptions {
    /// Respond to at most one matching request.
    pub once: bool,
}

/// Options shared by every handler a factory creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryOptions {
    /// Base URL for REST handlers, or the endpoint for GraphQL handlers.
    pub url: String,

    /// Log a diff whenever a handler rejects a request.
    #[serde(default)]
    pub debug: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_request_handler_options: Option<RequestHandlerOptions>,
}

impl FactoryOptions {
    pub fn new(url: impl Into<String>) -> Self {
        FactoryOptions {
            url: url.into(),
            debug: false,
            default_request_handler_options: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_default_request_handler_options(mut self, options: RequestHandlerOptions) -> Self {
        self.default_request_handler_options = Some(options);
        self
    }

    /// Parse and validate options from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        let options: FactoryOptions = serde_yaml::from_str(contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Load and validate options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.url.trim().is_empty() {
            anyhow::bail!("Factory url must not be empty");
        }

        let uri: Uri = self
            .url
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid factory url '{}': {}", self.url, e))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            anyhow::bail!(
                "Factory url '{}' must be absolute (e.g. https://api.example.org)",
                self.url
            );
        }

        Ok(())
    }

    /// Handler options with the factory defaults filled in.
    pub(crate) fn request_options(&self, overrides: Option<RequestHandlerOptions>) -> RequestHandlerOptions {
        overrides
            .or(self.default_request_handler_options)
            .unwrap_or_default()
    }
}

/// Callback fired when a handler matches, before the response is produced.
#[derive(Clone)]
pub struct OnCalled(Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>);

impl OnCalled {
    /// Synchronous callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        OnCalled(Arc::new(move || {
            f();
            futures::future::ready(()).boxed()
        }))
    }

    /// Asynchronous callback; resolution waits for it to complete.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        OnCalled(Arc::new(move || f().boxed()))
    }

    pub async fn call(&self) {
        (self.0)().await
    }
}

impl fmt::Debug for OnCalled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnCalled(<fn>)")
    }
}

/// Per-handler options.
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    pub on_called: Option<OnCalled>,
    pub headers: Option<Matcher>,
    /// Overrides the factory's `default_request_handler_options` when set.
    pub request: Option<RequestHandlerOptions>,
}

impl HandlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_called<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_called = Some(OnCalled::new(f));
        self
    }

    pub fn on_called_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_called = Some(OnCalled::future(f));
        self
    }

    pub fn headers(mut self, matcher: impl Into<Matcher>) -> Self {
        self.headers = Some(matcher.into());
        self
    }

    pub fn once(mut self) -> Self {
        self.request = Some(RequestHandlerOptions { once: true });
        self
    }
}
