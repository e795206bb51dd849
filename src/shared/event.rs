//! Real-time Event System
//!
//! Events pushed into conversation rooms after a successful write. The
//! event name doubles as the SSE `event:` field so clients can register
//! per-type listeners.

use serde::{Deserialize, Serialize};

use crate::shared::messaging::conversation::ConversationId;
use crate::shared::messaging::message::MessageView;

/// Type of real-time event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventType {
    /// A new message was persisted to the conversation
    #[serde(rename = "message:new")]
    MessageNew,
}

impl EventType {
    /// Event name as sent in the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            EventType::MessageNew => "message:new",
        }
    }
}

/// Real-time event scoped to a single conversation room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Room the event belongs to
    pub conversation_id: ConversationId,
    /// Event payload
    pub payload: serde_json::Value,
    /// When the event was published (RFC 3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(
        event_type: EventType,
        conversation_id: ConversationId,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            conversation_id,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a `message:new` event carrying the persisted message
    pub fn message_new(conversation_id: &ConversationId, message: &MessageView) -> Self {
        Self::new(
            EventType::MessageNew,
            conversation_id.clone(),
            serde_json::json!({
                "conversation_id": conversation_id,
                "message": message,
            }),
        )
    }
}
