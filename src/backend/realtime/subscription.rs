//! SSE room subscription handler
//!
//! `GET /realtime/{conversation_id}` joins the caller to one
//! conversation's room and streams its events as Server-Sent Events.
//! Joining requires being a participant of the conversation; leaving is
//! closing the stream, which drops the broadcast receiver and lets the
//! periodic cleanup prune the room.
//!
//! Lagged receivers skip ahead rather than dropping the connection;
//! clients recover skipped events by re-fetching history.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;

use crate::backend::error::ApiError;
use crate::backend::messaging::conversation::{get_participants, is_participant};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::messaging::conversation::ConversationId;

/// Handle room subscription (GET /realtime/{conversation_id})
///
/// # Errors
///
/// * `ApiError::NotFound` - the conversation does not exist
/// * `ApiError::Authorization` - the caller is not a participant
pub async fn handle_room_subscription(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(conversation_id): Path<String>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let conversation_id = ConversationId::from_raw(conversation_id);

    let participants = get_participants(&state.graph, &conversation_id).await?;
    if !is_participant(&participants, &caller.id) {
        return Err(ApiError::Authorization(
            "Not a participant in this conversation".to_string(),
        ));
    }

    let rx = state.rooms.join(&conversation_id);
    tracing::info!(
        "user {} joined room {} ({} subscriber(s))",
        caller.id,
        conversation_id,
        state.rooms.subscriber_count(&conversation_id)
    );

    let stream = stream::unfold(rx, move |mut rx| async move {
        // Loop until an event serializes cleanly or the channel closes.
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::error!("failed to serialize realtime event: {:?}", e);
                            continue;
                        }
                    };
                    let sse_event = Event::default().event(event.event_type.name()).data(data);
                    return Some((Ok::<_, axum::Error>(sse_event), rx));
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("room receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::debug!("room channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
