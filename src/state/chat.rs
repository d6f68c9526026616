//! Chat session state: the canonical message record, the bounded message
//! buffer, and the connection lifecycle the panel projects from.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `ChatState` is the local projection of one project channel. It is
//! replaced wholesale when a channel is enabled and discarded when the
//! channel is disabled; it never outlives the session that owns it.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::VecDeque;

use crate::net::types::{MessageType, WireChatMessage};
use crate::state::auth::CurrentUser;

/// Maximum number of messages retained per channel session. The oldest
/// entry is evicted first when a live append would exceed the cap.
pub const BUFFER_CAP: usize = 200;

/// A chat message in its canonical, render-ready shape.
///
/// Immutable once constructed: the buffer only ever inserts and evicts whole
/// records. Ids are normalized strings; `content` and `timestamp` are mapped
/// from the wire fields `messageContent` and `timestamp` at the decode step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: MessageType,
    pub project_id: String,
    pub sender_id: String,
    pub display_name: String,
    pub content: String,
    /// ISO-8601 timestamp as received; never reinterpreted after receipt.
    pub timestamp: String,
}

impl ChatMessage {
    /// Whether this message was sent by `user`, by normalized sender id.
    pub fn is_own(&self, user: &CurrentUser) -> bool {
        self.sender_id == user.user_id
    }

    /// ENTER/QUIT presence frames render as system rows, not bubbles.
    pub fn is_system(&self) -> bool {
        self.kind != MessageType::Talk
    }
}

impl From<WireChatMessage> for ChatMessage {
    fn from(wire: WireChatMessage) -> Self {
        // The history endpoint populates `senderName` but leaves
        // `displayName` empty, so fall back before giving up.
        let display_name = wire
            .display_name
            .filter(|n| !n.is_empty())
            .or(wire.sender_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "unknown".to_owned());

        Self {
            kind: wire.kind,
            project_id: wire.project_id,
            sender_id: wire.sender_id,
            display_name,
            content: wire.message_content,
            timestamp: wire.timestamp,
        }
    }
}

/// Ordered, bounded, deduplicating message buffer.
///
/// Insertion order is arrival order; the buffer is never re-sorted by
/// timestamp, so a history seed racing a live frame can leave it out of
/// chronological order. That matches the observed behavior of the product
/// and is deliberate.
#[derive(Clone, Debug, Default)]
pub struct MessageBuffer {
    messages: VecDeque<ChatMessage>,
}

impl MessageBuffer {
    /// Append a live message, dropping it if it duplicates the most recent
    /// entry by `(sender_id, timestamp, content)`. The single-entry window
    /// is what suppresses the server echo of a just-sent message; a full
    /// scan is neither needed nor wanted.
    ///
    /// Returns `true` if the message was appended.
    pub fn append(&mut self, msg: ChatMessage) -> bool {
        if let Some(last) = self.messages.back() {
            if last.sender_id == msg.sender_id
                && last.timestamp == msg.timestamp
                && last.content == msg.content
            {
                return false;
            }
        }
        self.messages.push_back(msg);
        if self.messages.len() > BUFFER_CAP {
            self.messages.pop_front();
        }
        true
    }

    /// Replace the entire buffer with a history seed. Anything already
    /// buffered — including a live frame that arrived before the history
    /// fetch resolved — is discarded.
    pub fn replace_all(&mut self, history: Vec<ChatMessage>) {
        self.messages = history.into_iter().collect();
        while self.messages.len() > BUFFER_CAP {
            self.messages.pop_front();
        }
    }

    /// Read-only view of the buffered messages in arrival order.
    pub fn snapshot(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// WebSocket connection lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; socket closed, nothing scheduled.
    #[default]
    Disabled,
    /// Session is active and the handshake is in progress.
    Connecting,
    /// Socket is open and subscribed to the project topic.
    Connected,
    /// Socket dropped while the session is still wanted; a reconnect may be
    /// pending, or retries may have been exhausted.
    Closed,
}

impl ConnectionState {
    /// Status line shown above the message list.
    pub fn status_label(self) -> &'static str {
        match self {
            Self::Disabled => "Chat is disabled.",
            Self::Connecting => "Connecting to chat...",
            Self::Connected => "Connected. Type a message.",
            Self::Closed => "Connection lost. Trying to reconnect...",
        }
    }

    /// Sending is only allowed while connected.
    pub fn can_send(self) -> bool {
        self == Self::Connected
    }
}

/// The active channel session: which project is joined, the connection
/// lifecycle, the viewer, and the message buffer. At most one is live per
/// panel; enabling a different project replaces it wholesale.
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    pub project_id: Option<String>,
    pub connection: ConnectionState,
    pub current_user: Option<CurrentUser>,
    pub buffer: MessageBuffer,
}

impl ChatState {
    /// Fresh `Connecting` session for `project_id`, empty buffer.
    pub fn connecting(project_id: &str, user: CurrentUser) -> Self {
        Self {
            project_id: Some(project_id.to_owned()),
            connection: ConnectionState::Connecting,
            current_user: Some(user),
            buffer: MessageBuffer::default(),
        }
    }

    fn is_active_for(&self, project_id: &str) -> bool {
        self.project_id.as_deref() == Some(project_id)
    }

    /// Seed the buffer from a resolved history fetch. Ignored when the fetch
    /// outlived its session: the channel was disabled mid-flight or the
    /// panel moved to a different project.
    pub fn seed_history(&mut self, project_id: &str, history: Vec<ChatMessage>) {
        if self.is_active_for(project_id) {
            self.buffer.replace_all(history);
        }
    }

    /// Append a live frame. Ignored for stale sessions; duplicates of the
    /// last entry are dropped by the buffer.
    pub fn append_live(&mut self, project_id: &str, msg: ChatMessage) -> bool {
        if self.is_active_for(project_id) {
            self.buffer.append(msg)
        } else {
            false
        }
    }
}
