use super::*;
use crate::net::types::WireChatMessage;

fn talk(sender_id: &str, content: &str, timestamp: &str) -> ChatMessage {
    ChatMessage {
        kind: MessageType::Talk,
        project_id: "5".to_owned(),
        sender_id: sender_id.to_owned(),
        display_name: "Kim".to_owned(),
        content: content.to_owned(),
        timestamp: timestamp.to_owned(),
    }
}

fn numbered(n: usize) -> ChatMessage {
    talk("9", &format!("msg {n}"), &format!("t{n}"))
}

// =============================================================
// MessageBuffer: cap and eviction
// =============================================================

#[test]
fn buffer_length_tracks_appends_until_cap() {
    let mut buffer = MessageBuffer::default();
    for n in 0..150 {
        assert!(buffer.append(numbered(n)));
    }
    assert_eq!(buffer.len(), 150);
}

#[test]
fn buffer_evicts_oldest_first_beyond_cap() {
    let mut buffer = MessageBuffer::default();
    for n in 1..=201 {
        buffer.append(numbered(n));
    }
    assert_eq!(buffer.len(), BUFFER_CAP);

    let contents: Vec<&str> = buffer.snapshot().map(|m| m.content.as_str()).collect();
    assert_eq!(contents.first(), Some(&"msg 2"));
    assert_eq!(contents.last(), Some(&"msg 201"));
    assert!(!contents.contains(&"msg 1"));
}

#[test]
fn buffer_replace_all_truncates_oversized_history_from_the_front() {
    let mut buffer = MessageBuffer::default();
    buffer.replace_all((1..=250).map(numbered).collect());
    assert_eq!(buffer.len(), BUFFER_CAP);
    assert_eq!(
        buffer.snapshot().next().map(|m| m.content.clone()),
        Some("msg 51".to_owned())
    );
}

// =============================================================
// MessageBuffer: dedup window
// =============================================================

#[test]
fn buffer_collapses_consecutive_duplicates() {
    let mut buffer = MessageBuffer::default();
    assert!(buffer.append(talk("7", "hello", "t1")));
    assert!(!buffer.append(talk("7", "hello", "t1")));
    assert_eq!(buffer.len(), 1);
}

#[test]
fn buffer_dedup_window_is_last_entry_only() {
    let mut buffer = MessageBuffer::default();
    buffer.append(talk("7", "hello", "t1"));
    buffer.append(talk("7", "other", "t2"));
    // Same triple as the first entry, but no longer at the tail.
    assert!(buffer.append(talk("7", "hello", "t1")));
    assert_eq!(buffer.len(), 3);
}

#[test]
fn buffer_dedup_requires_full_triple_match() {
    let mut buffer = MessageBuffer::default();
    buffer.append(talk("7", "hello", "t1"));
    assert!(buffer.append(talk("8", "hello", "t1")));
    assert!(buffer.append(talk("8", "hello", "t2")));
    assert!(buffer.append(talk("8", "hello!", "t2")));
    assert_eq!(buffer.len(), 4);
}

#[test]
fn buffer_replace_all_overwrites_existing_content() {
    let mut buffer = MessageBuffer::default();
    buffer.append(talk("7", "live before history", "t0"));
    buffer.replace_all(vec![talk("9", "from history", "t1")]);
    assert_eq!(buffer.len(), 1);
    assert_eq!(
        buffer.snapshot().next().map(|m| m.content.clone()),
        Some("from history".to_owned())
    );
}

// =============================================================
// ChatState: session guards
// =============================================================

#[test]
fn seed_history_applies_only_to_active_project() {
    let mut state = ChatState::connecting("5", CurrentUser::new("7", "Kim"));
    state.seed_history("6", vec![talk("9", "stale fetch", "t1")]);
    assert!(state.buffer.is_empty());

    state.seed_history("5", vec![talk("9", "current fetch", "t1")]);
    assert_eq!(state.buffer.len(), 1);
}

#[test]
fn seed_history_ignored_after_disable() {
    let mut state = ChatState::default();
    state.seed_history("5", vec![talk("9", "too late", "t1")]);
    assert!(state.buffer.is_empty());
}

#[test]
fn append_live_rejects_other_project() {
    let mut state = ChatState::connecting("5", CurrentUser::new("7", "Kim"));
    assert!(!state.append_live("6", talk("9", "hi", "t1")));
    assert!(state.buffer.is_empty());

    assert!(state.append_live("5", talk("9", "hi", "t1")));
    assert_eq!(state.buffer.len(), 1);
}

#[test]
fn live_frames_still_work_when_history_failed_and_buffer_is_empty() {
    // History fetch failure leaves the buffer untouched; a later live frame
    // for the same channel must still land.
    let mut state = ChatState::connecting("5", CurrentUser::new("7", "Kim"));
    assert!(state.buffer.is_empty());
    assert!(state.append_live("5", talk("9", "still alive", "t1")));
    assert_eq!(state.buffer.len(), 1);
}

// =============================================================
// Ownership and projection helpers
// =============================================================

#[test]
fn message_ownership_by_normalized_sender_id() {
    let user = CurrentUser::new("7", "Kim");
    assert!(talk("7", "hello", "t1").is_own(&user));
    assert!(!talk("9", "hello", "t1").is_own(&user));
}

#[test]
fn presence_messages_are_system_rows() {
    let mut msg = talk("9", "Park joined.", "t1");
    assert!(!msg.is_system());
    msg.kind = MessageType::Enter;
    assert!(msg.is_system());
    msg.kind = MessageType::Quit;
    assert!(msg.is_system());
}

#[test]
fn connection_state_labels_and_send_gate() {
    assert!(ConnectionState::Connected.can_send());
    assert!(!ConnectionState::Connecting.can_send());
    assert!(!ConnectionState::Closed.can_send());
    assert!(!ConnectionState::Disabled.can_send());

    assert_eq!(ConnectionState::default(), ConnectionState::Disabled);
    assert_eq!(
        ConnectionState::Connected.status_label(),
        "Connected. Type a message."
    );
}

// =============================================================
// Wire normalization
// =============================================================

#[test]
fn from_wire_maps_content_and_timestamp_fields() {
    let wire: WireChatMessage = serde_json::from_value(serde_json::json!({
        "type": "TALK",
        "projectId": 5,
        "senderId": 9,
        "displayName": "Park",
        "messageContent": "mapped",
        "timestamp": "2025-11-02T10:15:30"
    }))
    .expect("wire message should decode");

    let msg = ChatMessage::from(wire);
    assert_eq!(msg.content, "mapped");
    assert_eq!(msg.timestamp, "2025-11-02T10:15:30");
    assert_eq!(msg.display_name, "Park");
}

#[test]
fn from_wire_falls_back_to_sender_name_then_unknown() {
    let with_legacy_name: WireChatMessage = serde_json::from_value(serde_json::json!({
        "type": "TALK", "projectId": 5, "senderId": 9, "senderName": "Park"
    }))
    .expect("wire message should decode");
    assert_eq!(ChatMessage::from(with_legacy_name).display_name, "Park");

    let nameless: WireChatMessage = serde_json::from_value(serde_json::json!({
        "type": "TALK", "projectId": 5, "senderId": 9
    }))
    .expect("wire message should decode");
    assert_eq!(ChatMessage::from(nameless).display_name, "unknown");
}
