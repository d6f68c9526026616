//! Inbound frame routing for the subscribed project topic.
//!
//! ERROR HANDLING
//! ==============
//! Malformed frames are dropped with a warning and the connection stays up;
//! structurally valid frames for the wrong project are dropped silently.
//! Nothing on this path is fatal.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use crate::net::types::{Envelope, WireChatMessage};
use crate::state::chat::ChatMessage;

/// Decode one inbound transport frame into a canonical message for the
/// active channel. Returns `None` for anything that should not reach the
/// buffer: unparseable frames, non-broadcast commands, invalid message
/// types, and frames scoped to another project.
pub fn route_frame(raw: &str, active_project_id: &str) -> Option<ChatMessage> {
    let envelope = match serde_json::from_str::<Envelope>(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            leptos::logging::warn!("chat: dropping unparseable frame: {e}");
            return None;
        }
    };

    let Envelope::Message { body, .. } = envelope else {
        // SUBSCRIBE/SEND are client-to-server verbs; seeing one inbound
        // means a confused peer, not an error worth surfacing.
        return None;
    };

    let wire = match serde_json::from_value::<WireChatMessage>(body) {
        Ok(wire) => wire,
        Err(e) => {
            leptos::logging::warn!("chat: dropping invalid message body: {e}");
            return None;
        }
    };

    // Ids are normalized to strings on decode, so this comparison holds
    // whether the transport sent `5` or `"5"`.
    if wire.project_id != active_project_id {
        return None;
    }

    Some(ChatMessage::from(wire))
}
