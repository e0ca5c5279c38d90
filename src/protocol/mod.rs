//! Wire protocol — the handful of text messages exchanged with the renderer.
//!
//! | Direction | Body          | Meaning                                   |
//! |-----------|---------------|-------------------------------------------|
//! | out       | `ping`        | keepalive probe                           |
//! | out       | *event id*    | host event, body is the identifier verbatim |
//! | in        | `pong`        | keepalive acknowledgement, never rendered |
//! | in        | anything else | markup replacing the mount element        |
//!
//! There is no envelope, delimiter, or sub-protocol.

use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

/// Outbound keepalive probe.
pub const KEEPALIVE_PROBE: &str = "ping";

/// Inbound keepalive acknowledgement.
pub const KEEPALIVE_ACK: &str = "pong";

/// Classification of an inbound text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    KeepaliveAck,
    /// Pre-rendered markup; trusted and applied without escaping.
    Render(&'a str),
}

impl<'a> Inbound<'a> {
    /// Classifies a payload. Only an exact `pong` is an acknowledgement.
    ///
    /// ```
    /// use paro::protocol::Inbound;
    ///
    /// assert_eq!(Inbound::classify("pong"), Inbound::KeepaliveAck);
    /// assert_eq!(Inbound::classify("<p>pong</p>"), Inbound::Render("<p>pong</p>"));
    /// ```
    pub fn classify(payload: &'a str) -> Self {
        if payload == KEEPALIVE_ACK {
            Self::KeepaliveAck
        } else {
            Self::Render(payload)
        }
    }
}

/// A message queued for the socket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outbound {
    Keepalive,
    Event(String),
    Close,
}

impl Outbound {
    pub(crate) fn into_message(self) -> Message {
        match self {
            Self::Keepalive => Message::text(KEEPALIVE_PROBE),
            Self::Event(id) => Message::text(id),
            Self::Close => Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_pong_is_ack() {
        assert_eq!(Inbound::classify("pong"), Inbound::KeepaliveAck);
        assert_eq!(Inbound::classify("pong "), Inbound::Render("pong "));
        assert_eq!(Inbound::classify("PONG"), Inbound::Render("PONG"));
        assert_eq!(Inbound::classify(""), Inbound::Render(""));
    }

    #[test]
    fn ping_is_rendered_if_received() {
        assert_eq!(Inbound::classify("ping"), Inbound::Render("ping"));
    }

    #[test]
    fn event_body_is_identifier_verbatim() {
        let msg = Outbound::Event("click:42".to_owned()).into_message();
        assert_eq!(msg, Message::text("click:42"));
    }

    #[test]
    fn keepalive_message() {
        assert_eq!(Outbound::Keepalive.into_message(), Message::text("ping"));
    }

    #[test]
    fn close_is_normal_closure() {
        match Outbound::Close.into_message() {
            Message::Close(Some(frame)) => assert_eq!(u16::from(frame.code), 1000),
            other => panic!("expected close frame, got {other:?}"),
        }
    }
}
