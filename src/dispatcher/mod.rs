//! Inbound dispatch — applies server payloads to the mount element.

use std::sync::Arc;

use tracing::debug;

use crate::config::SessionConfig;
use crate::document::Document;
use crate::hooks::MessageEvent;
use crate::protocol::Inbound;

/// Outcome of dispatching a single payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Keepalive acknowledgement; nothing rendered.
    Acknowledged,
    /// The mount element now holds the payload.
    Rendered,
    /// The mount element was missing; the payload was dropped.
    Discarded,
}

/// Routes inbound text payloads for one connection.
///
/// Payloads are handled strictly in the order they are passed in; nothing is
/// buffered or reordered.
pub struct Dispatcher {
    config: Arc<SessionConfig>,
    document: Arc<dyn Document>,
}

impl Dispatcher {
    pub fn new(config: Arc<SessionConfig>, document: Arc<dyn Document>) -> Self {
        Self { config, document }
    }

    /// Handles one inbound payload.
    ///
    /// The `on_message` hook always fires first, acknowledgements included.
    /// Any payload other than the keepalive acknowledgement replaces the mount
    /// element's content verbatim.
    pub fn on_message(&self, payload: &str) -> Dispatch {
        self.config
            .log_info(&format!("[paro message] data received from server: {payload}"));
        self.config.hooks().message(&MessageEvent {
            data: payload.to_owned(),
        });

        let markup = match Inbound::classify(payload) {
            Inbound::KeepaliveAck => {
                debug!("keepalive acknowledged");
                return Dispatch::Acknowledged;
            }
            Inbound::Render(markup) => markup,
        };

        match self.document.replace_content(self.config.mount_id(), markup) {
            Ok(()) => {
                debug!(mount = %self.config.mount_id(), bytes = markup.len(), "rendered");
                Dispatch::Rendered
            }
            Err(e) => {
                self.config
                    .log_error(&format!("[paro message] {e}; markup will not be rendered"));
                Dispatch::Discarded
            }
        }
    }
}
