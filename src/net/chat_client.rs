//! WebSocket chat client: session lifecycle, reconnection, and publishing.
//!
//! `ChatClient` is a standalone service object. The panel observes its
//! state snapshot and drives it through `enable`/`disable`/`send`; the
//! socket, the outbound channel, and the reconnect delay are owned here and
//! never shared across sessions.
//!
//! LIFECYCLE
//! =========
//! Every `enable`/`disable` bumps a session epoch. The connection loop, the
//! history fetch, and the reconnect sleep all re-check the epoch after each
//! await and exit silently once stale, so rapid enable/disable/enable
//! sequences from view navigation cannot orphan a socket, double-subscribe,
//! or apply a stale history fetch. Transport failures recover locally via
//! retry and are only ever visible as `Connecting`/`Closed` states.

#[cfg(test)]
#[path = "chat_client_test.rs"]
mod chat_client_test;

use std::sync::{Arc, Mutex, MutexGuard};

use futures::channel::mpsc::UnboundedSender;
use leptos::prelude::{ArcRwSignal, GetUntracked, Set};
#[cfg(any(test, feature = "hydrate"))]
use leptos::prelude::Update;

use crate::net::types::{Envelope, WireChatMessage, publish_destination};
use crate::state::auth::CurrentUser;
use crate::state::chat::{ChatState, ConnectionState};
use crate::util::sanitize::sanitize_outbound;
use crate::util::time::now_timestamp;

/// Fixed delay before the reconnection attempt scheduled after a drop.
/// No backoff, matching the product's observed behavior.
pub const RECONNECT_DELAY_MS: u64 = 5_000;

/// Consecutive connection attempts that may fail outright before the loop
/// stops retrying and the channel stays `Closed`.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Chat session service: owns the transport and exposes an observable
/// [`ChatState`] plus the `enable`/`disable`/`send` commands.
#[derive(Clone)]
pub struct ChatClient {
    state: ArcRwSignal<ChatState>,
    inner: Arc<Mutex<ClientInner>>,
}

#[derive(Default)]
struct ClientInner {
    /// Session generation; stale async tasks compare against it and exit.
    epoch: u64,
    /// The only sender for the active socket's outbound channel. Dropping
    /// it ends the socket's send task and with it the connection.
    outbound: Option<UnboundedSender<String>>,
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatClient {
    pub fn new() -> Self {
        Self {
            state: ArcRwSignal::new(ChatState::default()),
            inner: Arc::new(Mutex::new(ClientInner::default())),
        }
    }

    /// Observable session snapshot for the panel to project from.
    pub fn state(&self) -> ArcRwSignal<ChatState> {
        self.state.clone()
    }

    fn inner(&self) -> MutexGuard<'_, ClientInner> {
        self.inner.lock().expect("chat client lock poisoned")
    }

    #[cfg(any(test, feature = "hydrate"))]
    fn is_current(&self, epoch: u64) -> bool {
        self.inner().epoch == epoch
    }

    #[cfg(any(test, feature = "hydrate"))]
    fn set_connection(&self, epoch: u64, connection: ConnectionState) {
        if self.is_current(epoch) {
            self.state.update(|s| s.connection = connection);
        }
    }

    /// Open a channel session for `project_id`.
    ///
    /// No-op when that project is already `Connecting` or `Connected`, so
    /// repeated calls from prop-change effects cannot create a duplicate
    /// transport or subscription. Enabling a different project tears the
    /// previous session down and starts fresh.
    pub fn enable(&self, project_id: &str, token: &str, user: CurrentUser) {
        {
            let state = self.state.get_untracked();
            let same_session = state.project_id.as_deref() == Some(project_id);
            if same_session
                && matches!(
                    state.connection,
                    ConnectionState::Connecting | ConnectionState::Connected
                )
            {
                return;
            }
        }

        let epoch = {
            let mut inner = self.inner();
            inner.epoch += 1;
            inner.outbound = None;
            inner.epoch
        };
        self.state.set(ChatState::connecting(project_id, user));

        #[cfg(feature = "hydrate")]
        {
            let project = project_id.to_owned();
            let token = token.to_owned();
            leptos::task::spawn_local(history_task(
                self.clone(),
                epoch,
                project.clone(),
                token.clone(),
            ));
            leptos::task::spawn_local(session_loop(self.clone(), epoch, project, token));
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (epoch, token);
        }
    }

    /// Tear the session down: socket closed, pending reconnect invalidated,
    /// buffer discarded. Unconditional and safe to call repeatedly.
    pub fn disable(&self) {
        {
            let mut inner = self.inner();
            inner.epoch += 1;
            inner.outbound = None;
        }
        self.state.set(ChatState::default());
    }

    /// Publish `raw_text` as a TALK message on the active channel.
    ///
    /// Rejected while not `Connected` and when sanitizing leaves nothing to
    /// send. The message is *not* appended locally; it becomes visible when
    /// the server's broadcast echo re-enters through the router, and the
    /// buffer's dedup-by-last-entry rule keeps it single-appearance.
    pub fn send(&self, raw_text: &str) -> bool {
        let state = self.state.get_untracked();
        if !state.connection.can_send() {
            return false;
        }
        let (Some(project_id), Some(user)) = (state.project_id, state.current_user) else {
            return false;
        };

        let content = sanitize_outbound(raw_text);
        if content.is_empty() {
            return false;
        }

        let msg = WireChatMessage::talk(&user, &project_id, &content, &now_timestamp());
        let envelope = Envelope::Send {
            destination: publish_destination(&project_id),
            body: msg,
        };
        let Ok(json) = serde_json::to_string(&envelope) else {
            return false;
        };

        let inner = self.inner();
        match inner.outbound.as_ref() {
            Some(tx) => tx.unbounded_send(json).is_ok(),
            None => false,
        }
    }
}

/// Socket URL for a project channel. Auth rides in the query string because
/// the browser's upgrade request cannot carry headers.
pub fn chat_socket_url(ws_base: &str, project_id: &str, token: &str) -> String {
    format!("{ws_base}/api/chat?projectId={project_id}&token={token}")
}

#[cfg(feature = "hydrate")]
fn ws_base() -> String {
    let location = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default();
    let proto = if location.starts_with("https") { "wss" } else { "ws" };
    let host = web_sys::window()
        .and_then(|w| w.location().host().ok())
        .unwrap_or_else(|| "localhost:8484".to_owned());
    format!("{proto}://{host}")
}

/// One-shot history seed, spawned alongside the session loop on enable.
/// Applied only if the epoch and project still match by the time it lands.
#[cfg(feature = "hydrate")]
async fn history_task(client: ChatClient, epoch: u64, project_id: String, token: String) {
    let Some(history) = crate::net::api::fetch_recent_messages(&project_id, &token).await else {
        return;
    };
    if !client.is_current(epoch) {
        return;
    }
    client.state.update(|s| s.seed_history(&project_id, history));
}

/// How one socket lifetime ended.
#[cfg(feature = "hydrate")]
enum SessionEnd {
    /// Established, then dropped; schedule a reconnect.
    Dropped,
    /// Never delivered traffic; counts toward the give-up limit.
    Failed(String),
}

#[cfg(feature = "hydrate")]
async fn session_loop(client: ChatClient, epoch: u64, project_id: String, token: String) {
    let mut consecutive_failures: u32 = 0;

    loop {
        if !client.is_current(epoch) {
            return;
        }
        client.set_connection(epoch, ConnectionState::Connecting);

        match run_connection(&client, epoch, &project_id, &token).await {
            SessionEnd::Dropped => consecutive_failures = 0,
            SessionEnd::Failed(reason) => {
                consecutive_failures += 1;
                leptos::logging::warn!("chat: connection attempt failed: {reason}");
            }
        }

        if !client.is_current(epoch) {
            return;
        }
        client.set_connection(epoch, ConnectionState::Closed);

        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            leptos::logging::warn!(
                "chat: giving up after {consecutive_failures} failed connection attempts"
            );
            return;
        }

        // Single fixed-delay reconnect per drop. If the channel is disabled
        // while this sleeps, the epoch check above exits before any state
        // or socket is touched.
        gloo_timers::future::sleep(std::time::Duration::from_millis(RECONNECT_DELAY_MS)).await;
    }
}

/// Open the socket, subscribe to the project topic, and pump frames until
/// the connection ends.
#[cfg(feature = "hydrate")]
async fn run_connection(
    client: &ChatClient,
    epoch: u64,
    project_id: &str,
    token: &str,
) -> SessionEnd {
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    use crate::net::types::subscribe_topic;

    let url = chat_socket_url(&ws_base(), project_id, token);
    let ws = match WebSocket::open(&url) {
        Ok(ws) => ws,
        Err(e) => return SessionEnd::Failed(e.to_string()),
    };
    let (mut write, mut read) = ws.split();

    let (tx, mut rx) = futures::channel::mpsc::unbounded::<String>();
    {
        let mut inner = client.inner();
        if inner.epoch != epoch {
            return SessionEnd::Dropped;
        }
        inner.outbound = Some(tx);
    }
    client.set_connection(epoch, ConnectionState::Connected);

    let subscribe = Envelope::Subscribe {
        destination: subscribe_topic(project_id),
    };
    match serde_json::to_string(&subscribe) {
        Ok(json) => {
            if write.send(Message::Text(json)).await.is_err() {
                return SessionEnd::Failed("subscribe send failed".to_owned());
            }
        }
        Err(e) => return SessionEnd::Failed(e.to_string()),
    }

    let saw_traffic = std::cell::Cell::new(false);
    let had_error = std::cell::Cell::new(false);

    // Forward queued outbound messages to the socket.
    let send_task = async {
        while let Some(msg) = rx.next().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    };

    // Route inbound frames into the session buffer.
    let recv_task = async {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    saw_traffic.set(true);
                    if let Some(msg) = crate::net::router::route_frame(&text, project_id) {
                        client.state.update(|s| {
                            s.append_live(project_id, msg);
                        });
                    }
                }
                Ok(Message::Bytes(_)) => saw_traffic.set(true),
                Err(e) => {
                    had_error.set(true);
                    leptos::logging::warn!("chat: socket error: {e}");
                    break;
                }
            }
        }
    };

    // When either side finishes the connection is done; dropping the halves
    // closes the socket.
    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;

    {
        let mut inner = client.inner();
        if inner.epoch == epoch {
            inner.outbound = None;
        }
    }

    if had_error.get() && !saw_traffic.get() {
        SessionEnd::Failed("socket closed before any traffic".to_owned())
    } else {
        SessionEnd::Dropped
    }
}
