//! # paro
//!
//! Client-side bridge for server-driven UIs. A [`Session`] keeps one WebSocket
//! open to a remote renderer, writes every markup fragment the server pushes
//! into a mount element of a [`Document`], and relays event identifiers from
//! the host back to the server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use paro::{Hooks, MemoryDocument, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let document = Arc::new(MemoryDocument::with_element("paro-application"));
//!     let config = SessionConfig::default()
//!         .with_endpoint("ws://127.0.0.1:8080")
//!         .with_hooks(Hooks::default().on_open(|_| println!("connected")));
//!
//!     let session = Session::new(config, document.clone())?;
//!     session.initialize();
//!     // later, from a click handler:
//!     session.emit_event("increment");
//!     Ok(())
//! }
//! ```
//!
//! The renderer is trusted: render payloads are applied verbatim.
//!
//! On the renderer side, [`EventRegistry`] maps the event identifiers embedded
//! in rendered markup back to callbacks on application state.

pub mod config;
pub mod dispatcher;
pub mod document;
pub mod hooks;
pub mod protocol;
pub mod registry;
pub mod session;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::{ConfigError, Logger, SessionConfig, Settings};
pub use document::{Document, MemoryDocument, MountError};
pub use hooks::{CloseEvent, EmitEvent, ErrorEvent, Hooks, MessageEvent, OpenEvent};
pub use registry::{EventRegistry, RegistryError};
pub use session::{LifecycleState, Session, SessionError};
