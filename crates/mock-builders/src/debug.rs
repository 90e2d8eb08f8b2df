//! Debug logging for failed matches.
//!
//! The logger is chosen once per factory: [`ConsoleDebugLog`] when debug mode
//! is on, [`NullLogger`] otherwise. Messages are built lazily so the no-op
//! logger never pays for a diff.

use std::sync::Arc;
use tracing::debug;

/// Sink for resolution diagnostics.
pub trait DebugLog: Send + Sync {
    fn log(&self, message: &str);

    /// Log a message built on demand.
    fn log_with(&self, message: &dyn Fn() -> String) {
        self.log(&message());
    }
}

/// Emits `tracing` debug events prefixed with the factory URL.
#[derive(Debug, Clone)]
pub struct ConsoleDebugLog {
    url: String,
}

impl ConsoleDebugLog {
    pub fn new(url: impl Into<String>) -> Self {
        ConsoleDebugLog { url: url.into() }
    }
}

impl DebugLog for ConsoleDebugLog {
    fn log(&self, message: &str) {
        debug!("[mock-builders] {{{}}} - {}", self.url, message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl DebugLog for NullLogger {
    fn log(&self, _message: &str) {}

    fn log_with(&self, _message: &dyn Fn() -> String) {}
}

/// Select the logger for a factory.
pub fn debug_logger(url: &str, enabled: bool) -> Arc<dyn DebugLog> {
    if enabled {
        Arc::new(ConsoleDebugLog::new(url))
    } else {
        Arc::new(NullLogger)
    }
}
