//! # myteam-chat
//!
//! Real-time per-project chat client for the myteam collaboration front-end.
//!
//! The hosting application mounts [`components::chat_panel::ChatPanel`] and
//! supplies the project id, the current user, the bearer token, and whether
//! chat is enabled for the viewer. Everything else — the WebSocket session,
//! reconnection, the bounded message buffer, and the history seed — lives in
//! this crate behind [`net::chat_client::ChatClient`].
//!
//! Browser-only code (sockets, HTTP, scrolling) is gated behind the
//! `hydrate` feature; the state and protocol modules are plain Rust and
//! carry the unit tests.

pub mod components;
pub mod net;
pub mod state;
pub mod util;
