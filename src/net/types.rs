//! Wire-protocol DTOs for the chat channel.
//!
//! DESIGN
//! ======
//! These types mirror the server's chat VO so serde round-trips stay
//! lossless. The server serializes `projectId`/`senderId` as JSON numbers
//! while older client builds sent strings; ids are therefore accepted in
//! either form, normalized to strings locally, and re-emitted as integers
//! when they are digit-only so the server's integer fields keep parsing.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::auth::CurrentUser;

/// Message kind as carried on the wire.
///
/// Decode doubles as validation: a frame whose `type` is outside this set
/// fails deserialization and is dropped by the router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Talk,
    Enter,
    Quit,
}

/// A chat message as exchanged with the server, both directions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(
        deserialize_with = "deserialize_id",
        serialize_with = "serialize_id"
    )]
    pub project_id: String,
    #[serde(
        deserialize_with = "deserialize_id",
        serialize_with = "serialize_id"
    )]
    pub sender_id: String,
    /// Legacy name field; the history endpoint fills this one only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub message_content: String,
    /// ISO-8601; the server emits a zone-less `LocalDateTime` string.
    #[serde(default)]
    pub timestamp: String,
}

impl WireChatMessage {
    /// Build an outbound TALK message for the current user.
    pub fn talk(user: &CurrentUser, project_id: &str, content: &str, timestamp: &str) -> Self {
        Self {
            kind: MessageType::Talk,
            project_id: project_id.to_owned(),
            sender_id: user.user_id.clone(),
            sender_name: None,
            display_name: Some(user.display_name.clone()),
            message_content: content.to_owned(),
            timestamp: timestamp.to_owned(),
        }
    }
}

/// Transport framing over the plain WebSocket, replacing the broker's STOMP
/// commands. One channel per session means only three verbs are needed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "UPPERCASE")]
pub enum Envelope {
    /// Client -> server: subscribe to a project topic after the socket opens.
    Subscribe { destination: String },
    /// Client -> server: publish a message to the project's inbox.
    Send {
        destination: String,
        body: WireChatMessage,
    },
    /// Server -> client: a broadcast frame for a subscribed topic. The body
    /// stays loosely typed here; the router decodes and validates it.
    Message {
        destination: String,
        body: serde_json::Value,
    },
}

/// Topic the server broadcasts project messages on.
pub fn subscribe_topic(project_id: &str) -> String {
    format!("/sub/projects/{project_id}")
}

/// Destination the client publishes messages to.
pub fn publish_destination(project_id: &str) -> String {
    format!("/pub/chat/{project_id}")
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(D::Error::custom("expected string or number id")),
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_id<S>(id: &String, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.parse::<i64>() {
        Ok(n) => serializer.serialize_i64(n),
        Err(_) => serializer.serialize_str(id),
    }
}
