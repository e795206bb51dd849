//! Per-conversation broadcast rooms
//!
//! Each conversation gets its own broadcast channel so a connection only
//! receives events for rooms it has explicitly joined. Channels are
//! created on first join or first publish and pruned once they have no
//! receivers left.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::shared::event::RealtimeEvent;
use crate::shared::messaging::conversation::ConversationId;

/// Buffered events per room before slow subscribers start lagging
const ROOM_CHANNEL_CAPACITY: usize = 100;

/// Registry of per-conversation broadcast channels
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<ConversationId, broadcast::Sender<RealtimeEvent>>>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join a room, creating it on first use
    ///
    /// The returned receiver is the membership: dropping it leaves the
    /// room.
    pub fn join(&self, room: &ConversationId) -> broadcast::Receiver<RealtimeEvent> {
        let mut rooms = self.rooms.lock().unwrap();
        rooms
            .entry(room.clone())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event into a room
    ///
    /// Returns the number of subscribers that received it; 0 when the
    /// room does not exist or nobody is listening. Never fails.
    pub fn publish(&self, room: &ConversationId, event: RealtimeEvent) -> usize {
        let sender = {
            let rooms = self.rooms.lock().unwrap();
            rooms.get(room).cloned()
        };
        match sender {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Current subscriber count of a room
    pub fn subscriber_count(&self, room: &ConversationId) -> usize {
        let rooms = self.rooms.lock().unwrap();
        rooms
            .get(room)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    /// Drop rooms that have no subscribers left
    pub fn cleanup_idle(&self) {
        let mut rooms = self.rooms.lock().unwrap();
        rooms.retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of live rooms (for logging)
    pub fn len(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::messaging::message::MessageView;

    fn event_for(room: &ConversationId, content: &str) -> RealtimeEvent {
        RealtimeEvent::message_new(
            room,
            &MessageView {
                id: "m-1".to_string(),
                content: content.to_string(),
                timestamp: "2026-01-01T00:00:00Z".to_string(),
                sender_id: "u1".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_publish_without_room_returns_zero() {
        let registry = RoomRegistry::new();
        let room = ConversationId::for_pair("u1", "u2");
        assert_eq!(registry.publish(&room, event_for(&room, "hi")), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let registry = RoomRegistry::new();
        let room = ConversationId::for_pair("u1", "u2");

        let mut rx = registry.join(&room);
        let delivered = registry.publish(&room, event_for(&room, "hello"));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.payload["message"]["content"], "hello");
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let room_ab = ConversationId::for_pair("a", "b");
        let room_cd = ConversationId::for_pair("c", "d");

        let mut rx_ab = registry.join(&room_ab);
        let _rx_cd = registry.join(&room_cd);

        registry.publish(&room_cd, event_for(&room_cd, "for cd"));
        assert!(rx_ab.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cleanup_removes_idle_rooms() {
        let registry = RoomRegistry::new();
        let room = ConversationId::for_pair("u1", "u2");

        let rx = registry.join(&room);
        assert_eq!(registry.len(), 1);

        drop(rx);
        registry.cleanup_idle();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_active_rooms() {
        let registry = RoomRegistry::new();
        let room = ConversationId::for_pair("u1", "u2");

        let _rx = registry.join(&room);
        registry.cleanup_idle();
        assert_eq!(registry.subscriber_count(&room), 1);
    }
}
