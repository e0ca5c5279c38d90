//! The per-connection task.
//!
//! One task owns the socket for the connection's whole life and is the only
//! writer. Emitted events arrive through the handle's mailbox, keepalive
//! probes through a local interval, inbound frames through the read half; all
//! three are multiplexed in one `select!` loop, so writes go out in the order
//! they were issued and the keepalive timer dies with the task.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use super::{ConnectionHandle, LifecycleState, Shared};
use crate::config::SessionConfig;
use crate::dispatcher::Dispatcher;
use crate::hooks::{CloseEvent, ErrorEvent, OpenEvent};
use crate::protocol::Outbound;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code reported when the peer's close frame carried no status.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Close code for a normal closure.
const NORMAL_CLOSURE: u16 = 1000;

pub(super) async fn run(shared: Arc<Shared>, config: Arc<SessionConfig>, id: u64) {
    let mut guard = ReleaseOnUnwind {
        shared: &shared,
        id,
        armed: true,
    };

    config.log_info(&format!(
        "[paro init] connecting to websocket via {}",
        config.endpoint()
    ));

    let socket = match connect_async(config.endpoint()).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            report_error(&config, &e);
            guard.armed = false;
            finish(&shared, &config, id, CloseEvent::abnormal());
            return;
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let probe = tx.clone();
    *shared.handle.lock() = Some(ConnectionHandle {
        id,
        outbound: tx,
        config: Arc::clone(&config),
    });

    shared.state.send_replace(LifecycleState::Open);

    config.log_info("[paro open] connection established");
    config.hooks().opened(&OpenEvent {
        endpoint: config.endpoint().to_owned(),
    });
    // Queued behind anything on_open emitted.
    let _ = probe.send(Outbound::Keepalive);
    drop(probe);

    let dispatcher = Dispatcher::new(Arc::clone(&config), Arc::clone(&shared.document));
    let close = drive(socket, rx, &dispatcher, &config).await;
    guard.armed = false;
    finish(&shared, &config, id, close);
}

/// Frees the handle slot if the task unwinds (a panicking hook) before `finish`.
///
/// Hooks are not called from here; `on_close` does not fire for a task that died.
struct ReleaseOnUnwind<'a> {
    shared: &'a Shared,
    id: u64,
    armed: bool,
}

impl Drop for ReleaseOnUnwind<'_> {
    fn drop(&mut self) {
        if self.armed && !release(self.shared, self.id) {
            self.shared.state.send_replace(LifecycleState::Closed);
        }
    }
}

/// Pumps the socket until it closes, returning how it closed.
async fn drive(
    socket: WsStream,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    dispatcher: &Dispatcher,
    config: &SessionConfig,
) -> CloseEvent {
    let (mut sink, mut stream) = socket.split();

    let period = config.keepalive_interval();
    let mut keepalive = time::interval_at(Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut closing = false;

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    dispatcher.on_message(text.as_str());
                }
                Some(Ok(Message::Close(frame))) => {
                    // Flushes the queued close reply; the peer may already be gone.
                    let _ = sink.close().await;
                    return match frame {
                        Some(frame) => {
                            CloseEvent::clean(u16::from(frame.code), frame.reason.as_str())
                        }
                        None => CloseEvent::clean(NO_STATUS_RECEIVED, ""),
                    };
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!(bytes = data.len(), "ignoring binary frame");
                }
                Some(Ok(_)) => {}
                Some(Err(tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake))) => {
                    return CloseEvent::abnormal();
                }
                Some(Err(e)) => {
                    report_error(config, &e);
                    return CloseEvent::abnormal();
                }
                None if closing => return CloseEvent::clean(NORMAL_CLOSURE, ""),
                None => return CloseEvent::abnormal(),
            },
            Some(message) = outbound.recv() => {
                if closing {
                    debug!(?message, "dropping message queued after close");
                } else {
                    closing = message == Outbound::Close;
                    if let Err(e) = sink.send(message.into_message()).await {
                        report_error(config, &e);
                        return CloseEvent::abnormal();
                    }
                }
            }
            _ = keepalive.tick(), if !closing => {
                debug!("sending keepalive probe");
                if let Err(e) = sink.send(Outbound::Keepalive.into_message()).await {
                    report_error(config, &e);
                    return CloseEvent::abnormal();
                }
            }
        }
    }
}

fn report_error(config: &SessionConfig, error: &tungstenite::Error) {
    let message = error.to_string();
    config.log_error(&format!("[paro error] {message}"));
    config.hooks().errored(&ErrorEvent { message });
}

/// Releases the handle slot (if this connection still owns it) and reports the close.
///
/// `Closed` is published after `on_close` has run, and only when no newer
/// connection holds the slot.
fn finish(shared: &Shared, config: &SessionConfig, id: u64, close: CloseEvent) {
    let superseded = release(shared, id);

    if close.was_clean {
        config.log_info(&format!(
            "[paro close] connection closed cleanly code={} reason={}",
            close.code, close.reason
        ));
    } else {
        config.log_info("[paro close] connection died");
    }
    config.hooks().closed(&close);

    if !superseded {
        shared.state.send_replace(LifecycleState::Closed);
    }
}

/// Clears the slot if this connection owns it. Returns `true` when a newer
/// connection still holds the slot.
fn release(shared: &Shared, id: u64) -> bool {
    let mut slot = shared.handle.lock();
    if slot.as_ref().is_some_and(|handle| handle.id == id) {
        *slot = None;
    }
    slot.is_some()
}
