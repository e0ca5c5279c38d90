//! Pluggable diagnostics sink.

use std::sync::Arc;

/// Destination for host-facing diagnostics.
///
/// The session reports connection attempts, received messages, emitted events
/// and failures through this trait, but only while logging is enabled in the
/// [`SessionConfig`](super::SessionConfig).
pub trait Logger: Send + Sync + 'static {
    /// Records an informational diagnostic.
    fn info(&self, message: &str);

    /// Records an error diagnostic.
    fn error(&self, message: &str);
}

/// Default [`Logger`] that forwards to [`tracing`] under the `paro` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "paro", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "paro", "{message}");
    }
}

impl<F> Logger for F
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    fn info(&self, message: &str) {
        self(LogLevel::Info, message)
    }

    fn error(&self, message: &str) {
        self(LogLevel::Error, message)
    }
}

/// Severity passed to closure-based loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

pub(crate) fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}
