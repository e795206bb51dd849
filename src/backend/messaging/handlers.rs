//! Messaging HTTP Handlers
//!
//! One handler per operation the core exposes. Authorization is always
//! checked against the store's participant edges, never trusted from the
//! request; the caller identity comes from the auth middleware.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::backend::auth::Caller;
use crate::backend::error::ApiError;
use crate::backend::messaging::conversation::{
    ensure_conversation, ensure_user, get_participants, is_participant, other_participant,
};
use crate::backend::messaging::db;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::notify_message_new;
use crate::backend::server::state::AppState;
use crate::shared::messaging::conversation::{
    ConversationId, ConversationSummary, ConversationWithResponse, StartConversationRequest,
    StartConversationResponse,
};
use crate::shared::messaging::message::{
    DeleteMessagesResponse, MarkReadRequest, MarkReadResponse, MessageView, SendMessageRequest,
    SendMessageResponse,
};
use crate::shared::messaging::user::PublicUser;

/// Upsert the caller's shadow record with profile fields from the credential
async fn ensure_caller_shadow(state: &AppState, caller: &Caller) -> Result<(), ApiError> {
    ensure_user(
        &state.graph,
        &caller.id,
        caller.username.as_deref(),
        caller.profile_pic.as_deref(),
    )
    .await
}

/// Send a message (POST /messages/send)
///
/// Auto-creates the conversation when addressed by `user_id`; when
/// addressed by `conversation_id`, the conversation must exist and the
/// caller must be a participant. On success the message is pushed into
/// the conversation's realtime room, best-effort.
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation(
            "Message content cannot be empty".to_string(),
        ));
    }
    if body.conversation_id.is_none() && body.user_id.is_none() {
        return Err(ApiError::Validation(
            "Either conversation_id or user_id must be provided".to_string(),
        ));
    }

    let me = caller.id.as_str();
    if body.user_id.as_deref() == Some(me) {
        return Err(ApiError::SelfReference("Cannot message yourself".to_string()));
    }

    ensure_caller_shadow(&state, &caller).await?;

    let (conversation_id, receiver_id) = match &body.conversation_id {
        Some(raw) => {
            let conversation_id = ConversationId::from_raw(raw.clone());
            let participants = get_participants(&state.graph, &conversation_id).await?;
            if !is_participant(&participants, me) {
                return Err(ApiError::Authorization(
                    "Not a participant in this conversation".to_string(),
                ));
            }
            let receiver = other_participant(&participants, me)?.to_string();
            (conversation_id, receiver)
        }
        None => {
            // Checked above: user_id is present when conversation_id is not.
            let other = body.user_id.as_deref().unwrap_or_default();
            ensure_user(&state.graph, other, None, None).await?;
            let conversation = ensure_conversation(&state.graph, me, other).await?;
            (conversation.id, other.to_string())
        }
    };

    let message = db::create_message(&state.graph, &conversation_id, me, &receiver_id, content)
        .await?;

    notify_message_new(&state.rooms, &conversation_id, &message);

    Ok(Json(SendMessageResponse {
        conversation_id,
        message,
    }))
}

/// Query parameters for the query-string history shape
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub conversation_id: String,
}

/// List history (GET /messages?conversation_id=...)
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    history_for(&state, &caller, ConversationId::from_raw(params.conversation_id))
        .await
        .map(Json)
}

/// List history (GET /messages/by/{conversation_id})
///
/// Path-parameter twin of [`get_history`]; both shapes share one
/// implementation so they cannot drift apart.
pub async fn get_history_by_path(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    history_for(&state, &caller, ConversationId::from_raw(conversation_id))
        .await
        .map(Json)
}

async fn history_for(
    state: &AppState,
    caller: &Caller,
    conversation_id: ConversationId,
) -> Result<Vec<MessageView>, ApiError> {
    let participants = get_participants(&state.graph, &conversation_id).await?;
    if !is_participant(&participants, &caller.id) {
        return Err(ApiError::Authorization(
            "Not a participant in this conversation".to_string(),
        ));
    }
    db::conversation_history(&state.graph, &conversation_id).await
}

/// Start or get the conversation with a user (POST /messages/start)
pub async fn start_conversation(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<StartConversationRequest>,
) -> Result<Json<StartConversationResponse>, ApiError> {
    let other = body.user_id.as_str();
    if other == caller.id {
        return Err(ApiError::SelfReference(
            "Cannot start a conversation with yourself".to_string(),
        ));
    }

    ensure_caller_shadow(&state, &caller).await?;
    ensure_user(&state.graph, other, None, None).await?;
    let conversation = ensure_conversation(&state.graph, &caller.id, other).await?;

    // Shadow records created moments ago still resolve; the fallback
    // only covers a racing deletion.
    let user = db::public_profile(&state.graph, other)
        .await?
        .unwrap_or_else(|| PublicUser {
            id: other.to_string(),
            username: None,
            profile_pic: None,
        });

    Ok(Json(StartConversationResponse {
        conversation_id: conversation.id,
        user,
    }))
}

/// Non-creating lookup (GET /messages/conversation/with/{user_id})
pub async fn get_conversation_with(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ConversationWithResponse>, ApiError> {
    if user_id == caller.id {
        return Err(ApiError::SelfReference(
            "Cannot open a conversation with yourself".to_string(),
        ));
    }
    db::conversation_with_user(&state.graph, &caller.id, &user_id)
        .await
        .map(Json)
}

/// Pagination parameters for the conversation list
#[derive(Debug, Deserialize)]
pub struct ListConversationsParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List conversations (GET /messages/conversations)
pub async fn list_conversations(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListConversationsParams>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let limit = params.limit.unwrap_or(20);
    let offset = params.offset.unwrap_or(0);
    if !(1..=100).contains(&limit) {
        return Err(ApiError::Validation(
            "limit must be between 1 and 100".to_string(),
        ));
    }
    if offset < 0 {
        return Err(ApiError::Validation(
            "offset must be non-negative".to_string(),
        ));
    }

    state.graph.ensure_schema().await;

    db::list_conversations(&state.graph, &caller.id, limit, offset)
        .await
        .map(Json)
}

/// Mark a conversation read (POST /messages/mark_read)
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let conversation_id = ConversationId::from_raw(body.conversation_id);

    let participants = get_participants(&state.graph, &conversation_id).await?;
    if !is_participant(&participants, &caller.id) {
        return Err(ApiError::Authorization(
            "Not a participant in this conversation".to_string(),
        ));
    }

    let count = db::mark_read(&state.graph, &conversation_id, &caller.id).await?;
    Ok(Json(MarkReadResponse { ok: true, count }))
}

/// Delete all messages in a conversation
/// (DELETE /messages/conversation/{conversation_id})
///
/// Authorization: participant of the conversation, or admin. The
/// conversation node itself is pruned when no messages remain.
pub async fn delete_conversation_messages(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<DeleteMessagesResponse>, ApiError> {
    let conversation_id = ConversationId::from_raw(conversation_id);

    let participants = get_participants(&state.graph, &conversation_id).await?;
    if !is_participant(&participants, &caller.id) && !caller.is_admin() {
        return Err(ApiError::Authorization(
            "Not authorized to delete this conversation's messages".to_string(),
        ));
    }

    let deleted = db::count_conversation_messages(&state.graph, &conversation_id).await?;
    db::delete_conversation_messages(&state.graph, &conversation_id).await?;
    db::prune_conversation_if_empty(&state.graph, &conversation_id).await?;

    Ok(Json(DeleteMessagesResponse {
        success: true,
        deleted_messages: deleted,
    }))
}

/// Delete all messages sent by a user (DELETE /messages/user/{user_id})
///
/// Authorization: the user themselves, or admin. The user node is never
/// deleted; conversations emptied by the sweep are pruned.
pub async fn delete_user_messages(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteMessagesResponse>, ApiError> {
    if caller.id != user_id && !caller.is_admin() {
        return Err(ApiError::Authorization(
            "Not authorized to delete messages for this user".to_string(),
        ));
    }

    if !db::user_exists(&state.graph, &user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let deleted = db::count_user_messages(&state.graph, &user_id).await?;
    db::delete_user_messages(&state.graph, &user_id).await?;
    db::prune_empty_conversations(&state.graph).await?;

    Ok(Json(DeleteMessagesResponse {
        success: true,
        deleted_messages: deleted,
    }))
}
