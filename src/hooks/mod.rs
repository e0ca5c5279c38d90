//! Host hooks — optional observers of session lifecycle and traffic.
//!
//! Hooks run synchronously alongside the session's own handling. They observe;
//! they cannot veto a render, an emit, or a close. No session lock is held
//! while a hook runs, so a hook may call back into the session (for example,
//! emit an event from `on_open`).
//!
//! A hook that panics ends its connection: the session releases the
//! connection and moves to `Closed`, but `on_close` does not fire.
//!
//! # Examples
//!
//! ```
//! use paro::hooks::Hooks;
//!
//! let hooks = Hooks::default()
//!     .on_open(|event| println!("connected to {}", event.endpoint))
//!     .on_close(|event| println!("closed, clean={}", event.was_clean));
//!
//! assert!(hooks.has_open());
//! assert!(!hooks.has_error());
//! ```

use std::fmt;
use std::sync::Arc;

/// Close code reported when the transport dropped without a close handshake.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Delivered to `on_open` once the transport is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenEvent {
    pub endpoint: String,
}

/// Delivered to `on_message` for every inbound text payload, keepalive
/// acknowledgements included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub data: String,
}

/// Delivered to `on_close` when the connection ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    /// `true` when the peer completed a close handshake.
    pub was_clean: bool,
    /// Close code from the peer, or [`ABNORMAL_CLOSURE`] when unclean.
    pub code: u16,
    pub reason: String,
}

impl CloseEvent {
    pub(crate) fn clean(code: u16, reason: impl Into<String>) -> Self {
        Self {
            was_clean: true,
            code,
            reason: reason.into(),
        }
    }

    pub(crate) fn abnormal() -> Self {
        Self {
            was_clean: false,
            code: ABNORMAL_CLOSURE,
            reason: String::new(),
        }
    }
}

/// Delivered to `on_error` when the transport fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: String,
}

/// Delivered to `on_emit` just before an event identifier is sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitEvent {
    pub event_id: String,
}

/// A shared, type-erased hook callback.
pub type Hook<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

/// The five optional hook slots. An empty slot is a no-op.
#[derive(Clone, Default)]
pub struct Hooks {
    open: Option<Hook<OpenEvent>>,
    message: Option<Hook<MessageEvent>>,
    close: Option<Hook<CloseEvent>>,
    error: Option<Hook<ErrorEvent>>,
    emit: Option<Hook<EmitEvent>>,
}

impl Hooks {
    #[must_use]
    pub fn on_open(mut self, hook: impl Fn(&OpenEvent) + Send + Sync + 'static) -> Self {
        self.open = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_message(mut self, hook: impl Fn(&MessageEvent) + Send + Sync + 'static) -> Self {
        self.message = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_close(mut self, hook: impl Fn(&CloseEvent) + Send + Sync + 'static) -> Self {
        self.close = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&ErrorEvent) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_emit(mut self, hook: impl Fn(&EmitEvent) + Send + Sync + 'static) -> Self {
        self.emit = Some(Arc::new(hook));
        self
    }

    pub fn has_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    pub fn has_close(&self) -> bool {
        self.close.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_emit(&self) -> bool {
        self.emit.is_some()
    }

    pub(crate) fn opened(&self, event: &OpenEvent) {
        fire(&self.open, event);
    }

    pub(crate) fn message(&self, event: &MessageEvent) {
        fire(&self.message, event);
    }

    pub(crate) fn closed(&self, event: &CloseEvent) {
        fire(&self.close, event);
    }

    pub(crate) fn errored(&self, event: &ErrorEvent) {
        fire(&self.error, event);
    }

    pub(crate) fn emitted(&self, event: &EmitEvent) {
        fire(&self.emit, event);
    }
}

fn fire<E>(slot: &Option<Hook<E>>, event: &E) {
    if let Some(hook) = slot {
        hook(event);
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_open", &self.has_open())
            .field("on_message", &self.has_message())
            .field("on_close", &self.has_close())
            .field("on_error", &self.has_error())
            .field("on_emit", &self.has_emit())
            .finish()
    }
}
