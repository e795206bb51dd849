//! Fire-and-forget event publication
//!
//! Called after a successful persistence write. Publish failure is
//! swallowed: by the time this runs the HTTP response already reflects
//! the durable state, and realtime delivery is a convenience, not a
//! guarantee. This is the one place in the crate where an error is
//! deliberately not surfaced.

use crate::backend::realtime::rooms::RoomRegistry;
use crate::shared::event::RealtimeEvent;
use crate::shared::messaging::conversation::ConversationId;
use crate::shared::messaging::message::MessageView;

/// Push a `message:new` event into the conversation's room
pub fn notify_message_new(
    rooms: &RoomRegistry,
    conversation_id: &ConversationId,
    message: &MessageView,
) {
    let event = RealtimeEvent::message_new(conversation_id, message);
    let delivered = rooms.publish(conversation_id, event);
    if delivered == 0 {
        tracing::debug!(
            "no subscribers in room {}, message:new dropped",
            conversation_id
        );
    } else {
        tracing::debug!(
            "message:new delivered to {} subscriber(s) in room {}",
            delivered,
            conversation_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> MessageView {
        MessageView {
            id: "m-1".to_string(),
            content: "hello".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            sender_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notify_without_subscribers_does_not_panic() {
        let rooms = RoomRegistry::new();
        let cid = ConversationId::for_pair("u1", "u2");
        notify_message_new(&rooms, &cid, &sample_message());
    }

    #[tokio::test]
    async fn test_notify_reaches_room_subscriber() {
        let rooms = RoomRegistry::new();
        let cid = ConversationId::for_pair("u1", "u2");
        let mut rx = rooms.join(&cid);

        notify_message_new(&rooms, &cid, &sample_message());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.conversation_id, cid);
        assert_eq!(event.payload["message"]["id"], "m-1");
    }
}
