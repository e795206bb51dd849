//! Shared Module
//!
//! Types that cross the wire: HTTP request/response bodies, realtime
//! events, and the canonical conversation id. Everything here is plain
//! data designed for serde serialization; behavior lives in `backend`.

/// Real-time event types
pub mod event;

/// Messaging wire types
pub mod messaging;

/// Re-export commonly used types for convenience
pub use event::{EventType, RealtimeEvent};
pub use messaging::conversation::ConversationId;
pub use messaging::message::MessageView;
pub use messaging::user::PublicUser;
