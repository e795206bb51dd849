//! Conversation and participant management
//!
//! Conversations are keyed by the canonical pair-derived id, so "ensure"
//! operations are plain MERGEs: re-running them against the same pair
//! always lands on the same node and relationship set. Creation-time
//! fields are set with `ON CREATE` only and never overwritten.

use neo4rs::query;

use crate::backend::error::ApiError;
use crate::backend::graph::executor::{row_string, run_many, run_single};
use crate::backend::graph::GraphContext;
use crate::shared::messaging::conversation::ConversationId;

/// A conversation as returned by the ensure operation
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub created_at: String,
}

/// Idempotently upsert a shadow user record
///
/// Defaults are applied only on first creation: a missing username falls
/// back to the id, a missing picture to the empty string. Existing users
/// keep their fields untouched.
pub async fn ensure_user(
    ctx: &GraphContext,
    id: &str,
    username: Option<&str>,
    profile_pic: Option<&str>,
) -> Result<(), ApiError> {
    let username = username.unwrap_or(id).to_string();
    let profile_pic = profile_pic.unwrap_or_default().to_string();
    let id = id.to_string();

    run_many(ctx, || {
        query(
            "MERGE (u:User {id: $id}) \
             ON CREATE SET u.username = $username, u.profile_pic = $profile_pic \
             RETURN u.id AS id",
        )
        .param("id", id.as_str())
        .param("username", username.as_str())
        .param("profile_pic", profile_pic.as_str())
    })
    .await?;
    Ok(())
}

/// Idempotently ensure the conversation between two users exists
///
/// Computes the canonical id, MERGEs the conversation node (stamping
/// `created_at` only on first creation) and both `PARTICIPATES_IN`
/// edges in one write.
///
/// # Errors
///
/// * `ApiError::SelfReference` - the two ids are the same user
/// * `ApiError::Persistence` - the write returned no confirmation row
pub async fn ensure_conversation(
    ctx: &GraphContext,
    me: &str,
    other: &str,
) -> Result<ConversationRecord, ApiError> {
    if me == other {
        return Err(ApiError::SelfReference(
            "Cannot start a conversation with yourself".to_string(),
        ));
    }

    let cid = ConversationId::for_pair(me, other);
    let now = chrono::Utc::now().to_rfc3339();

    let row = run_single(ctx, || {
        query(
            "MERGE (c:Conversation {id: $cid}) \
               ON CREATE SET c.created_at = $now \
             WITH c \
             MATCH (u1:User {id: $me}) \
             MATCH (u2:User {id: $other}) \
             MERGE (u1)-[:PARTICIPATES_IN]->(c) \
             MERGE (u2)-[:PARTICIPATES_IN]->(c) \
             RETURN c.id AS id, c.created_at AS created_at",
        )
        .param("cid", cid.as_str())
        .param("now", now.as_str())
        .param("me", me)
        .param("other", other)
    })
    .await?
    .ok_or_else(|| ApiError::Persistence("Failed to create conversation".to_string()))?;

    Ok(ConversationRecord {
        id: ConversationId::from_raw(row_string(&row, "id")?),
        created_at: row_string(&row, "created_at")?,
    })
}

/// The two participant ids of a conversation
///
/// A conversation that is missing or does not have exactly two
/// participants is treated identically: `ApiError::NotFound`.
pub async fn get_participants(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
) -> Result<[String; 2], ApiError> {
    let rows = run_many(ctx, || {
        query(
            "MATCH (u:User)-[:PARTICIPATES_IN]->(c:Conversation {id: $cid}) \
             RETURN u.id AS id",
        )
        .param("cid", conversation_id.as_str())
    })
    .await?;

    let mut ids = Vec::with_capacity(rows.len());
    for row in &rows {
        ids.push(row_string(row, "id")?);
    }

    <[String; 2]>::try_from(ids)
        .map_err(|_| ApiError::NotFound("Conversation not found or invalid".to_string()))
}

/// The participant that is not the caller
pub fn other_participant<'a>(participants: &'a [String; 2], me: &str) -> Result<&'a str, ApiError> {
    participants
        .iter()
        .find(|p| p.as_str() != me)
        .map(String::as_str)
        .ok_or_else(|| ApiError::Internal("Invalid conversation participants".to_string()))
}

/// Whether the caller participates in the conversation
pub fn is_participant(participants: &[String; 2], me: &str) -> bool {
    participants.iter().any(|p| p == me)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pair(a: &str, b: &str) -> [String; 2] {
        [a.to_string(), b.to_string()]
    }

    #[tokio::test]
    async fn test_self_conversation_rejected_before_store_access() {
        // Context is unconfigured: any store access would fail with a
        // Configuration error, so SelfReference proves the early return.
        let ctx = GraphContext::new(None);
        let err = ensure_conversation(&ctx, "u1", "u1").await.unwrap_err();
        assert_matches!(err, ApiError::SelfReference(_));
    }

    #[test]
    fn test_other_participant() {
        let parts = pair("u1", "u2");
        assert_eq!(other_participant(&parts, "u1").unwrap(), "u2");
        assert_eq!(other_participant(&parts, "u2").unwrap(), "u1");
    }

    #[test]
    fn test_other_participant_degenerate_pair() {
        let parts = pair("u1", "u1");
        assert_matches!(other_participant(&parts, "u1"), Err(ApiError::Internal(_)));
    }

    #[test]
    fn test_is_participant() {
        let parts = pair("u1", "u2");
        assert!(is_participant(&parts, "u1"));
        assert!(is_participant(&parts, "u2"));
        assert!(!is_participant(&parts, "intruder"));
    }
}
