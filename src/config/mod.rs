//! Session configuration.
//!
//! A [`SessionConfig`] bundles the data settings (endpoint, mount id, keepalive
//! interval, logging switch) with the host-supplied capabilities (logger and
//! hooks). The data half can be loaded from JSON through [`Settings`].
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use paro::config::SessionConfig;
//!
//! let config = SessionConfig::default()
//!     .with_endpoint("ws://127.0.0.1:1234")
//!     .with_mount_id("app")
//!     .with_keepalive_interval(Duration::from_secs(30));
//!
//! assert_eq!(config.endpoint(), "ws://127.0.0.1:1234");
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod logger;

pub use logger::{LogLevel, Logger, TracingLogger};

use crate::hooks::Hooks;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080";

/// Mount element id used when none is configured.
pub const DEFAULT_MOUNT_ID: &str = "paro-application";

/// Keepalive interval used when none is configured (60 s).
pub const DEFAULT_KEEPALIVE_INTERVAL_MS: u64 = 60_000;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The serializable part of a session configuration.
///
/// Every key is optional; missing keys take their defaults.
///
/// ```json
/// {
///   "endpoint": "ws://127.0.0.1:8080",
///   "mount_id": "paro-application",
///   "keepalive_interval_ms": 60000,
///   "logging": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub endpoint: String,
    pub mount_id: String,
    pub keepalive_interval_ms: u64,
    pub logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            mount_id: DEFAULT_MOUNT_ID.to_owned(),
            keepalive_interval_ms: DEFAULT_KEEPALIVE_INTERVAL_MS,
            logging: true,
        }
    }
}

/// Everything a [`Session`](crate::session::Session) needs to run.
///
/// Built once by the host before calling
/// [`Session::initialize`](crate::session::Session::initialize). Each
/// connection captures its own copy at initialization, so later changes only
/// apply to connections opened afterwards.
#[derive(Clone)]
pub struct SessionConfig {
    endpoint: String,
    mount_id: String,
    keepalive_interval: Duration,
    logging: bool,
    logger: Arc<dyn Logger>,
    hooks: Hooks,
}

impl SessionConfig {
    /// Builds a configuration from loaded [`Settings`] with the default logger
    /// and no hooks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the settings fail [`validate`](Self::validate).
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let config = Self {
            endpoint: settings.endpoint,
            mount_id: settings.mount_id,
            keepalive_interval: Duration::from_millis(settings.keepalive_interval_ms),
            logging: settings.logging,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses settings from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        Self::from_settings(settings)
    }

    /// Reads and parses a JSON settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    /// Sets the WebSocket endpoint address.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the id of the element whose content is replaced by render payloads.
    #[must_use]
    pub fn with_mount_id(mut self, mount_id: impl Into<String>) -> Self {
        self.mount_id = mount_id.into();
        self
    }

    /// Sets the period between keepalive probes.
    #[must_use]
    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Enables or disables diagnostics through the [`Logger`].
    #[must_use]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Replaces the diagnostics sink.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Logger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Installs the host hook set.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    pub fn keepalive_interval(&self) -> Duration {
        self.keepalive_interval
    }

    pub fn logging(&self) -> bool {
        self.logging
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Returns the data half of this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            endpoint: self.endpoint.clone(),
            mount_id: self.mount_id.clone(),
            keepalive_interval_ms: u64::try_from(self.keepalive_interval.as_millis())
                .unwrap_or(u64::MAX),
            logging: self.logging,
        }
    }

    /// Checks that the configuration can drive a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint is not a `ws://` or
    /// `wss://` URL, the mount id is empty, or the keepalive interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(ConfigError::Invalid {
                field: "endpoint",
                reason: format!("expected a ws:// or wss:// URL, got {:?}", self.endpoint),
            });
        }
        if self.mount_id.is_empty() {
            return Err(ConfigError::Invalid {
                field: "mount_id",
                reason: "must not be empty".to_owned(),
            });
        }
        if self.keepalive_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "keepalive_interval",
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }

    pub(crate) fn log_info(&self, message: &str) {
        if self.logging {
            self.logger.info(message);
        }
    }

    pub(crate) fn log_error(&self, message: &str) {
        if self.logging {
            self.logger.error(message);
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            mount_id: DEFAULT_MOUNT_ID.to_owned(),
            keepalive_interval: Duration::from_millis(DEFAULT_KEEPALIVE_INTERVAL_MS),
            logging: true,
            logger: logger::default_logger(),
            hooks: Hooks::default(),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("endpoint", &self.endpoint)
            .field("mount_id", &self.mount_id)
            .field("keepalive_interval", &self.keepalive_interval)
            .field("logging", &self.logging)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
