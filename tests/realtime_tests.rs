//! Real-time fan-out integration tests
//!
//! Exercise the room registry and notifier together: room isolation,
//! multi-subscriber fan-out, and the fire-and-forget contract.

use tokio::time::{timeout, Duration};

use hearsay::backend::realtime::{notify_message_new, RoomRegistry};
use hearsay::shared::event::EventType;
use hearsay::shared::messaging::conversation::ConversationId;
use hearsay::shared::messaging::message::MessageView;

fn message(id: &str, content: &str, sender: &str) -> MessageView {
    MessageView {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sender_id: sender.to_string(),
    }
}

#[tokio::test]
async fn test_notify_with_no_room_is_a_no_op() {
    let rooms = RoomRegistry::new();
    let cid = ConversationId::for_pair("u1", "u2");

    // Nothing joined the room; publishing must neither fail nor create it.
    notify_message_new(&rooms, &cid, &message("m-1", "hello", "u1"));
    assert!(rooms.is_empty());
}

#[tokio::test]
async fn test_joined_subscriber_receives_message_new() {
    let rooms = RoomRegistry::new();
    let cid = ConversationId::for_pair("u1", "u2");
    let mut rx = rooms.join(&cid);

    notify_message_new(&rooms, &cid, &message("m-1", "hello", "u1"));

    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event should arrive promptly")
        .unwrap();

    assert_eq!(event.event_type, EventType::MessageNew);
    assert_eq!(event.conversation_id, cid);
    assert_eq!(event.payload["message"]["content"], "hello");
    assert_eq!(event.payload["message"]["sender_id"], "u1");
}

#[tokio::test]
async fn test_fan_out_reaches_every_subscriber() {
    let rooms = RoomRegistry::new();
    let cid = ConversationId::for_pair("u1", "u2");

    let mut rx1 = rooms.join(&cid);
    let mut rx2 = rooms.join(&cid);
    let mut rx3 = rooms.join(&cid);

    notify_message_new(&rooms, &cid, &message("m-1", "to all", "u1"));

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("every subscriber should receive the event")
            .unwrap();
        assert_eq!(event.payload["message"]["id"], "m-1");
    }
}

#[tokio::test]
async fn test_events_stay_inside_their_room() {
    let rooms = RoomRegistry::new();
    let room_ab = ConversationId::for_pair("a", "b");
    let room_ac = ConversationId::for_pair("a", "c");

    let mut rx_ab = rooms.join(&room_ab);
    let mut rx_ac = rooms.join(&room_ac);

    notify_message_new(&rooms, &room_ab, &message("m-1", "for ab only", "a"));

    let event = timeout(Duration::from_secs(1), rx_ab.recv())
        .await
        .expect("ab subscriber should receive")
        .unwrap();
    assert_eq!(event.conversation_id, room_ab);

    // The ac room saw nothing.
    assert!(rx_ac.try_recv().is_err());
}

#[tokio::test]
async fn test_disconnected_rooms_are_pruned() {
    let rooms = RoomRegistry::new();
    let cid = ConversationId::for_pair("u1", "u2");

    let rx = rooms.join(&cid);
    assert_eq!(rooms.subscriber_count(&cid), 1);

    drop(rx);
    rooms.cleanup_idle();
    assert_eq!(rooms.subscriber_count(&cid), 0);
    assert!(rooms.is_empty());
}

#[tokio::test]
async fn test_publish_after_prune_still_succeeds() {
    let rooms = RoomRegistry::new();
    let cid = ConversationId::for_pair("u1", "u2");

    drop(rooms.join(&cid));
    rooms.cleanup_idle();

    // Fire-and-forget: publishing into the pruned room is still a no-op.
    notify_message_new(&rooms, &cid, &message("m-2", "late", "u1"));
}
