//! The client session — connection lifecycle plus the public host surface.
//!
//! A [`Session`] owns the transport handle for the live connection. Hosts call
//! [`Session::initialize`] once to connect and [`Session::emit_event`] to push
//! event identifiers upstream. Every outcome is observed through
//! [`Hooks`](crate::hooks::Hooks) and the configured
//! [`Logger`](crate::config::Logger); none of the fire-and-forget operations
//! report back to the caller.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──initialize──▶ Connecting ──open──▶ Open ──close / error──▶ Closed
//!                          └──────────connect failed─────────────────▲
//! ```
//!
//! There is no reconnect: once a connection reaches `Closed` it stays there.
//! A fresh [`initialize`](Session::initialize) opens a new, independent
//! connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::config::{ConfigError, SessionConfig};
use crate::document::Document;
use crate::hooks::EmitEvent;
use crate::protocol::Outbound;

mod connection;

/// Errors surfaced by the fallible session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("websocket is not connected")]
    NotConnected,
}

/// Coarse lifecycle of a session's current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Sending half of the live connection, plus the configuration it captured.
#[derive(Clone)]
struct ConnectionHandle {
    id: u64,
    outbound: mpsc::UnboundedSender<Outbound>,
    config: Arc<SessionConfig>,
}

struct Shared {
    config: RwLock<Arc<SessionConfig>>,
    document: Arc<dyn Document>,
    handle: Mutex<Option<ConnectionHandle>>,
    state: watch::Sender<LifecycleState>,
    next_connection: AtomicU64,
}

/// A client session bridging a remote renderer and a local [`Document`].
///
/// Cloning is cheap; clones share the same connection.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use paro::config::SessionConfig;
/// use paro::document::MemoryDocument;
/// use paro::hooks::Hooks;
/// use paro::session::{LifecycleState, Session};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let document = Arc::new(MemoryDocument::with_element("paro-application"));
///     let config = SessionConfig::default()
///         .with_endpoint("ws://127.0.0.1:8080")
///         .with_hooks(Hooks::default().on_close(|e| println!("closed: {e:?}")));
///
///     let session = Session::new(config, document.clone())?;
///     session.initialize();
///     session.wait_for_state(LifecycleState::Open).await;
///     session.emit_event("increment");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// Creates an idle session rendering into `document`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: SessionConfig, document: Arc<dyn Document>) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state, _) = watch::channel(LifecycleState::Idle);
        Ok(Self {
            shared: Arc::new(Shared {
                config: RwLock::new(Arc::new(config)),
                document,
                handle: Mutex::new(None),
                state,
                next_connection: AtomicU64::new(0),
            }),
        })
    }

    /// Opens a connection to the configured endpoint in a background task.
    ///
    /// The connection captures the configuration current at this call. On
    /// open it fires `on_open`, sends a keepalive probe, and then probes again
    /// every keepalive interval until the connection closes. Connection
    /// failures are reported through `on_error` and `on_close`; nothing is
    /// retried.
    ///
    /// Calling this again opens a second, independent connection. The most
    /// recently opened one receives emitted events.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn initialize(&self) {
        let config = self.shared.config.read().clone();
        let id = self.shared.next_connection.fetch_add(1, Ordering::Relaxed);

        self.shared.state.send_if_modified(|state| {
            if *state == LifecycleState::Open {
                return false;
            }
            *state = LifecycleState::Connecting;
            true
        });

        tokio::spawn(connection::run(Arc::clone(&self.shared), config, id));
    }

    /// Sends `event_id` as the entire body of one outbound message.
    ///
    /// Before the connection is open (or after it closed) this only logs a
    /// diagnostic; the event is not queued.
    pub fn emit_event(&self, event_id: impl Into<String>) {
        let _ = self.try_emit_event(event_id);
    }

    /// Like [`emit_event`](Self::emit_event), but reports a missing connection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotConnected`] when no connection is open.
    pub fn try_emit_event(&self, event_id: impl Into<String>) -> Result<(), SessionError> {
        let event_id = event_id.into();
        let handle = self.shared.handle.lock().clone();
        // A closed mailbox means the connection task is gone but has not
        // released the slot yet.
        let Some(handle) = handle.filter(|handle| !handle.outbound.is_closed()) else {
            self.report_not_connected(&event_id);
            return Err(SessionError::NotConnected);
        };

        handle
            .config
            .log_info(&format!("[paro emit] emitting event '{event_id}'"));
        handle.config.hooks().emitted(&EmitEvent {
            event_id: event_id.clone(),
        });

        if let Err(mpsc::error::SendError(Outbound::Event(event_id))) =
            handle.outbound.send(Outbound::Event(event_id))
        {
            handle.config.log_error(&format!(
                "[paro emit] event '{event_id}' was not sent, the connection closed"
            ));
            return Err(SessionError::NotConnected);
        }
        Ok(())
    }

    fn report_not_connected(&self, event_id: &str) {
        self.config().log_error(&format!(
            "[paro emit] cannot emit '{event_id}' while the websocket is not connected"
        ));
    }

    /// Starts a clean close (code 1000) of the live connection.
    ///
    /// `on_close` fires once the peer acknowledges.
    pub fn close(&self) {
        let handle = self.shared.handle.lock().clone();
        match handle {
            Some(handle) => {
                let _ = handle.outbound.send(Outbound::Close);
            }
            None => self
                .config()
                .log_error("[paro close] nothing to close, the websocket is not connected"),
        }
    }

    /// Replaces the configuration used by future connections.
    ///
    /// A connection that is already open keeps the configuration it captured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] and keeps the old configuration if
    /// `config` fails validation.
    pub fn reconfigure(&self, config: SessionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.shared.config.write() = Arc::new(config);
        Ok(())
    }

    /// The configuration future connections will capture.
    pub fn config(&self) -> Arc<SessionConfig> {
        self.shared.config.read().clone()
    }

    pub fn state(&self) -> LifecycleState {
        *self.shared.state.borrow()
    }

    /// Returns `true` while a connection can accept emitted events.
    pub fn is_connected(&self) -> bool {
        self.shared.handle.lock().is_some()
    }

    /// Resolves once the session reaches `target`.
    pub async fn wait_for_state(&self, target: LifecycleState) {
        let mut rx = self.shared.state.subscribe();
        let _ = rx.wait_for(|state| *state == target).await;
    }
}
