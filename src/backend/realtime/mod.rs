//! Real-time fan-out
//!
//! Per-conversation broadcast rooms over `tokio::sync::broadcast`. A room
//! exists while someone is subscribed (or until the periodic cleanup
//! prunes it); publishing into a room nobody has joined is a no-op.
//!
//! Delivery is best-effort, at-most-once: the HTTP response already
//! reflects successful persistence, and clients recover missed events by
//! re-fetching history.

/// Per-conversation broadcast rooms
pub mod rooms;

/// Fire-and-forget event publication
pub mod notifier;

/// SSE room subscription handler
pub mod subscription;

pub use notifier::notify_message_new;
pub use rooms::RoomRegistry;
pub use subscription::handle_room_subscription;
