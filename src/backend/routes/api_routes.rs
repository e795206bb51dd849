//! Messaging API Route Handlers
//!
//! Route table for the messaging surface. Every route here requires a
//! bearer credential; the auth middleware is layered on in the router.
//!
//! # Routes
//!
//! - `POST /messages/send` - send a message (auto-creates conversation)
//! - `GET /messages?conversation_id=` - history, query-parameter shape
//! - `GET /messages/by/{conversation_id}` - history, path shape
//! - `POST /messages/start` - get-or-create a conversation
//! - `GET /messages/conversation/with/{user_id}` - non-creating lookup
//! - `GET /messages/conversations` - paginated conversation list
//! - `POST /messages/mark_read` - idempotent read-marking
//! - `DELETE /messages/conversation/{conversation_id}` - bulk delete
//! - `DELETE /messages/user/{user_id}` - bulk delete by sender
//! - `GET /realtime/{conversation_id}` - SSE room subscription

use axum::Router;

use crate::backend::messaging::handlers::{
    delete_conversation_messages, delete_user_messages, get_conversation_with, get_history,
    get_history_by_path, list_conversations, mark_read, send_message, start_conversation,
};
use crate::backend::realtime::handle_room_subscription;
use crate::backend::server::state::AppState;

/// Configure the messaging API routes
pub fn configure_message_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/messages/send",
            axum::routing::post(send_message),
        )
        .route(
            "/messages",
            axum::routing::get(get_history),
        )
        .route(
            "/messages/by/{conversation_id}",
            axum::routing::get(get_history_by_path),
        )
        .route(
            "/messages/start",
            axum::routing::post(start_conversation),
        )
        .route(
            "/messages/conversation/with/{user_id}",
            axum::routing::get(get_conversation_with),
        )
        .route(
            "/messages/conversations",
            axum::routing::get(list_conversations),
        )
        .route(
            "/messages/mark_read",
            axum::routing::post(mark_read),
        )
        .route(
            "/messages/conversation/{conversation_id}",
            axum::routing::delete(delete_conversation_messages),
        )
        .route(
            "/messages/user/{user_id}",
            axum::routing::delete(delete_user_messages),
        )
        // Realtime room subscription (SSE)
        .route(
            "/realtime/{conversation_id}",
            axum::routing::get(handle_room_subscription),
        )
}
