//! Message Payloads
//!
//! The message shape returned by every endpoint and embedded in realtime
//! events, plus the send / mark-read / delete request bodies.

use serde::{Deserialize, Serialize};

use super::conversation::ConversationId;

/// A persisted message as exposed on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    /// Unique message id (UUID, generated at creation)
    pub id: String,
    /// Message text
    pub content: String,
    /// Creation time (RFC 3339), immutable
    pub timestamp: String,
    /// User who sent the message
    pub sender_id: String,
}

/// Request body for sending a message
///
/// Either `conversation_id` (the thread must exist and the caller must
/// participate) or `user_id` (the thread is created on demand) must be
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub content: String,
}

/// Response after a successful send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub conversation_id: ConversationId,
    pub message: MessageView,
}

/// Request body for marking a conversation read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub conversation_id: String,
}

/// Response for mark-read: how many messages were newly acknowledged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub ok: bool,
    pub count: i64,
}

/// Response for the bulk deletion endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessagesResponse {
    pub success: bool,
    pub deleted_messages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_accepts_either_identifier() {
        let by_user: SendMessageRequest =
            serde_json::from_str(r#"{"user_id":"u2","content":"hi"}"#).unwrap();
        assert_eq!(by_user.user_id.as_deref(), Some("u2"));
        assert!(by_user.conversation_id.is_none());

        let by_convo: SendMessageRequest =
            serde_json::from_str(r#"{"conversation_id":"convo:u1:u2","content":"hi"}"#).unwrap();
        assert_eq!(by_convo.conversation_id.as_deref(), Some("convo:u1:u2"));
        assert!(by_convo.user_id.is_none());
    }

    #[test]
    fn test_message_view_wire_fields() {
        let view = MessageView {
            id: "m-1".to_string(),
            content: "hello".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            sender_id: "u1".to_string(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "m-1");
        assert_eq!(json["sender_id"], "u1");
        assert_eq!(json["timestamp"], "2026-01-01T00:00:00Z");
    }
}
