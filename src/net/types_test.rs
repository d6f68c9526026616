use super::*;

// =============================================================
// WireChatMessage decode
// =============================================================

#[test]
fn wire_message_decodes_numeric_ids_to_strings() {
    let msg: WireChatMessage = serde_json::from_value(serde_json::json!({
        "type": "TALK",
        "projectId": 5,
        "senderId": 9,
        "displayName": "Kim",
        "messageContent": "hi",
        "timestamp": "2025-11-02T10:15:30"
    }))
    .expect("wire message should decode");

    assert_eq!(msg.kind, MessageType::Talk);
    assert_eq!(msg.project_id, "5");
    assert_eq!(msg.sender_id, "9");
    assert_eq!(msg.message_content, "hi");
}

#[test]
fn wire_message_decodes_string_ids_unchanged() {
    let msg: WireChatMessage = serde_json::from_value(serde_json::json!({
        "type": "ENTER",
        "projectId": "5",
        "senderId": "9"
    }))
    .expect("wire message should decode");

    assert_eq!(msg.kind, MessageType::Enter);
    assert_eq!(msg.project_id, "5");
    assert_eq!(msg.message_content, "");
    assert_eq!(msg.timestamp, "");
}

#[test]
fn wire_message_rejects_unknown_type() {
    let result = serde_json::from_value::<WireChatMessage>(serde_json::json!({
        "type": "SHOUT",
        "projectId": 5,
        "senderId": 9
    }));
    assert!(result.is_err());
}

#[test]
fn wire_message_rejects_non_scalar_id() {
    let result = serde_json::from_value::<WireChatMessage>(serde_json::json!({
        "type": "TALK",
        "projectId": {"id": 5},
        "senderId": 9
    }));
    assert!(result.is_err());
}

// =============================================================
// WireChatMessage encode
// =============================================================

#[test]
fn talk_message_serializes_digit_ids_as_integers() {
    let user = crate::state::auth::CurrentUser::new("7", "Kim");
    let msg = WireChatMessage::talk(&user, "5", "hello", "2025-11-02T10:15:30.000Z");
    let value = serde_json::to_value(&msg).expect("wire message should encode");

    assert_eq!(value["type"], "TALK");
    assert_eq!(value["projectId"], 5);
    assert_eq!(value["senderId"], 7);
    assert_eq!(value["displayName"], "Kim");
    assert_eq!(value["messageContent"], "hello");
    assert!(value.get("senderName").is_none());
}

#[test]
fn talk_message_serializes_non_digit_ids_as_strings() {
    let user = crate::state::auth::CurrentUser::new("u-7", "Kim");
    let msg = WireChatMessage::talk(&user, "p-5", "hello", "t");
    let value = serde_json::to_value(&msg).expect("wire message should encode");

    assert_eq!(value["projectId"], "p-5");
    assert_eq!(value["senderId"], "u-7");
}

// =============================================================
// Envelope
// =============================================================

#[test]
fn envelope_subscribe_round_trips() {
    let env = Envelope::Subscribe {
        destination: subscribe_topic("5"),
    };
    let json = serde_json::to_string(&env).expect("envelope should encode");
    assert!(json.contains("\"SUBSCRIBE\""));
    assert!(json.contains("/sub/projects/5"));

    let back: Envelope = serde_json::from_str(&json).expect("envelope should decode");
    assert_eq!(back, env);
}

#[test]
fn envelope_message_keeps_body_loosely_typed() {
    let raw = r#"{"command":"MESSAGE","destination":"/sub/projects/5","body":{"whatever":1}}"#;
    let env: Envelope = serde_json::from_str(raw).expect("envelope should decode");
    match env {
        Envelope::Message { destination, body } => {
            assert_eq!(destination, "/sub/projects/5");
            assert_eq!(body["whatever"], 1);
        }
        other => panic!("expected MESSAGE, got {other:?}"),
    }
}

#[test]
fn destinations_are_project_scoped() {
    assert_eq!(subscribe_topic("12"), "/sub/projects/12");
    assert_eq!(publish_destination("12"), "/pub/chat/12");
}
