//! Messaging wire types
//!
//! Request/response bodies for the messaging HTTP API plus the canonical
//! conversation id. Field names are snake_case on the wire.

/// Conversation identity and summaries
pub mod conversation;

/// Message payloads and send/read requests
pub mod message;

/// Public user profile fields
pub mod user;

pub use conversation::{
    ConversationId, ConversationSummary, ConversationWithResponse, StartConversationRequest,
    StartConversationResponse,
};
pub use message::{
    DeleteMessagesResponse, MarkReadRequest, MarkReadResponse, MessageView, SendMessageRequest,
    SendMessageResponse,
};
pub use user::PublicUser;
