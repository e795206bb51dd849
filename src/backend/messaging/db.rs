//! Store operations for messages
//!
//! Every function here issues declarative queries through the executor
//! and maps rows into wire types. History ordering is owned by the store:
//! ascending persisted timestamp, with the message id as a stable
//! tie-break for identical timestamps. Missing `timestamp` properties on
//! legacy nodes fall back to `created_at` via plain COALESCE.

use neo4rs::{query, Row};
use uuid::Uuid;

use crate::backend::error::ApiError;
use crate::backend::graph::executor::{row_i64, row_opt_string, row_string, run_many, run_single};
use crate::backend::graph::GraphContext;
use crate::shared::messaging::conversation::{ConversationId, ConversationSummary, ConversationWithResponse};
use crate::shared::messaging::message::MessageView;
use crate::shared::messaging::user::PublicUser;

fn message_from_row(row: &Row) -> Result<MessageView, ApiError> {
    Ok(MessageView {
        id: row_string(row, "id")?,
        content: row_string(row, "content")?,
        timestamp: row_string(row, "timestamp")?,
        sender_id: row_string(row, "sender_id")?,
    })
}

/// Decode the `mid`/`mcontent`/`mcreated`/`msender` columns produced by
/// the last-message OPTIONAL MATCH; all null when there is no message.
fn last_message_from_row(row: &Row) -> Result<Option<MessageView>, ApiError> {
    let id = row_opt_string(row, "mid")?;
    let Some(id) = id else { return Ok(None) };
    Ok(Some(MessageView {
        id,
        content: row_opt_string(row, "mcontent")?.unwrap_or_default(),
        timestamp: row_opt_string(row, "mcreated")?.unwrap_or_default(),
        sender_id: row_opt_string(row, "msender")?.unwrap_or_default(),
    }))
}

fn other_user_from_row(row: &Row) -> Result<PublicUser, ApiError> {
    Ok(PublicUser {
        id: row_string(row, "oid")?,
        username: row_opt_string(row, "ousername")?,
        profile_pic: row_opt_string(row, "opic")?,
    })
}

/// Persist a message together with its `SENT` and `HAS_MESSAGE` edges
///
/// One write; the message id is generated here and the timestamp is
/// assigned at the moment of this call, so concurrent sends to the same
/// conversation are not artificially serialized.
///
/// # Errors
///
/// `ApiError::Persistence` when the write returns no confirmation row
/// (conversation or sender node absent).
pub async fn create_message(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
    sender_id: &str,
    receiver_id: &str,
    content: &str,
) -> Result<MessageView, ApiError> {
    let message_id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let row = run_single(ctx, || {
        query(
            "MATCH (c:Conversation {id: $cid}) \
             MATCH (s:User {id: $sid}) \
             CREATE (m:Message {id: $mid, content: $content, timestamp: $now, \
                                created_at: $now, sender_id: $sid, receiver_id: $rid}) \
             MERGE (s)-[:SENT]->(m) \
             MERGE (c)-[:HAS_MESSAGE]->(m) \
             RETURN m.id AS id, m.content AS content, m.timestamp AS timestamp, \
                    m.sender_id AS sender_id",
        )
        .param("cid", conversation_id.as_str())
        .param("sid", sender_id)
        .param("rid", receiver_id)
        .param("mid", message_id.as_str())
        .param("content", content)
        .param("now", now.as_str())
    })
    .await?
    .ok_or_else(|| ApiError::Persistence("Failed to create message".to_string()))?;

    message_from_row(&row)
}

/// All messages of a conversation, ascending by timestamp
pub async fn conversation_history(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
) -> Result<Vec<MessageView>, ApiError> {
    let rows = run_many(ctx, || {
        query(
            "MATCH (c:Conversation {id: $cid})-[:HAS_MESSAGE]->(m:Message) \
             RETURN m.id AS id, m.content AS content, \
                    COALESCE(m.timestamp, m.created_at) AS timestamp, \
                    m.sender_id AS sender_id \
             ORDER BY timestamp ASC, id ASC",
        )
        .param("cid", conversation_id.as_str())
    })
    .await?;

    rows.iter().map(message_from_row).collect()
}

/// A user's public profile fields, `None` when the user does not exist
pub async fn public_profile(
    ctx: &GraphContext,
    user_id: &str,
) -> Result<Option<PublicUser>, ApiError> {
    let row = run_single(ctx, || {
        query(
            "MATCH (u:User {id: $id}) \
             RETURN u.id AS id, u.username AS username, \
                    COALESCE(u.profile_pic, u.avatar_url, '') AS profile_pic",
        )
        .param("id", user_id)
    })
    .await?;

    row.map(|row| {
        Ok(PublicUser {
            id: row_string(&row, "id")?,
            username: row_opt_string(&row, "username")?,
            profile_pic: row_opt_string(&row, "profile_pic")?,
        })
    })
    .transpose()
}

/// Non-creating lookup of the conversation between the caller and one
/// specific user, with its most recent message inline
pub async fn conversation_with_user(
    ctx: &GraphContext,
    me: &str,
    other: &str,
) -> Result<ConversationWithResponse, ApiError> {
    let row = run_single(ctx, || {
        query(
            "MATCH (me:User {id: $me})-[:PARTICIPATES_IN]->(c:Conversation)\
                   <-[:PARTICIPATES_IN]-(other:User {id: $other}) \
             OPTIONAL MATCH (c)-[:HAS_MESSAGE]->(m:Message) \
             WITH c, other, m \
             ORDER BY m.timestamp DESC \
             WITH c, other, head(collect(m)) AS last \
             RETURN c.id AS cid, other.id AS oid, other.username AS ousername, \
                    COALESCE(other.profile_pic, other.avatar_url, '') AS opic, \
                    last.id AS mid, last.content AS mcontent, \
                    COALESCE(last.timestamp, last.created_at) AS mcreated, \
                    last.sender_id AS msender",
        )
        .param("me", me)
        .param("other", other)
    })
    .await?;

    let Some(row) = row else {
        return Ok(ConversationWithResponse::not_found());
    };
    let Some(cid) = row_opt_string(&row, "cid")? else {
        return Ok(ConversationWithResponse::not_found());
    };

    Ok(ConversationWithResponse {
        conversation_id: Some(ConversationId::from_raw(cid)),
        user: Some(other_user_from_row(&row)?),
        last_message: last_message_from_row(&row)?,
    })
}

/// The caller's conversations, paginated
///
/// Ordered by most-recent-message timestamp descending; conversations
/// with no messages yet sort last, by convention, since they have no
/// timestamp to order by.
pub async fn list_conversations(
    ctx: &GraphContext,
    me: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<ConversationSummary>, ApiError> {
    let rows = run_many(ctx, || {
        query(
            "MATCH (me:User {id: $me})-[:PARTICIPATES_IN]->(c:Conversation)\
                   <-[:PARTICIPATES_IN]-(other:User) \
             OPTIONAL MATCH (c)-[:HAS_MESSAGE]->(m:Message) \
             WITH c, other, m \
             ORDER BY m.timestamp DESC \
             WITH c, other, head(collect(m)) AS last \
             RETURN c.id AS cid, other.id AS oid, other.username AS ousername, \
                    COALESCE(other.profile_pic, other.avatar_url, '') AS opic, \
                    last.id AS mid, last.content AS mcontent, \
                    COALESCE(last.timestamp, last.created_at) AS mcreated, \
                    last.sender_id AS msender \
             ORDER BY CASE WHEN mcreated IS NULL THEN 1 ELSE 0 END ASC, mcreated DESC \
             SKIP $offset LIMIT $limit",
        )
        .param("me", me)
        .param("offset", offset)
        .param("limit", limit)
    })
    .await?;

    rows.iter()
        .map(|row| {
            Ok(ConversationSummary {
                id: ConversationId::from_raw(row_string(row, "cid")?),
                user: other_user_from_row(row)?,
                last_message: last_message_from_row(row)?,
            })
        })
        .collect()
}

/// Idempotently mark unread messages addressed to the reader as read
///
/// Adds a `READ_BY` edge from the reader to every message in the
/// conversation with `receiver_id` equal to the reader that lacks one,
/// and returns the count of newly-marked messages. Re-invocation is
/// always safe; it re-scans the conversation rather than tracking a
/// high-water mark.
pub async fn mark_read(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
    reader_id: &str,
) -> Result<i64, ApiError> {
    let row = run_single(ctx, || {
        query(
            "MATCH (u:User {id: $uid}) \
             MATCH (:Conversation {id: $cid})-[:HAS_MESSAGE]->(m:Message {receiver_id: $uid}) \
             WHERE NOT (u)-[:READ_BY]->(m) \
             WITH u, m \
             MERGE (u)-[:READ_BY]->(m) \
             RETURN count(m) AS marked",
        )
        .param("uid", reader_id)
        .param("cid", conversation_id.as_str())
    })
    .await?;

    match row {
        Some(row) => row_i64(&row, "marked"),
        None => Ok(0),
    }
}

/// Whether a user node exists in the store
pub async fn user_exists(ctx: &GraphContext, user_id: &str) -> Result<bool, ApiError> {
    let row = run_single(ctx, || {
        query("MATCH (u:User {id: $id}) RETURN u.id AS id").param("id", user_id)
    })
    .await?;
    Ok(row.is_some())
}

/// Count the messages attached to a conversation
pub async fn count_conversation_messages(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
) -> Result<i64, ApiError> {
    let row = run_single(ctx, || {
        query(
            "MATCH (c:Conversation {id: $cid})-[:HAS_MESSAGE]->(m:Message) \
             RETURN count(m) AS cnt",
        )
        .param("cid", conversation_id.as_str())
    })
    .await?;

    match row {
        Some(row) => row_i64(&row, "cnt"),
        None => Ok(0),
    }
}

/// Detach-delete every message in a conversation
pub async fn delete_conversation_messages(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
) -> Result<(), ApiError> {
    run_many(ctx, || {
        query(
            "MATCH (c:Conversation {id: $cid})-[:HAS_MESSAGE]->(m:Message) \
             DETACH DELETE m",
        )
        .param("cid", conversation_id.as_str())
    })
    .await?;
    Ok(())
}

/// Remove the conversation node if it has no messages left
///
/// Conversations are garbage-collected rather than reference-counted:
/// deleting the last message makes the node itself eligible.
pub async fn prune_conversation_if_empty(
    ctx: &GraphContext,
    conversation_id: &ConversationId,
) -> Result<(), ApiError> {
    run_many(ctx, || {
        query(
            "MATCH (c:Conversation {id: $cid}) \
             WHERE NOT (c)-[:HAS_MESSAGE]->() \
             DETACH DELETE c",
        )
        .param("cid", conversation_id.as_str())
    })
    .await?;
    Ok(())
}

/// Count the messages sent by a user
pub async fn count_user_messages(ctx: &GraphContext, user_id: &str) -> Result<i64, ApiError> {
    let row = run_single(ctx, || {
        query(
            "MATCH (:User {id: $uid})-[:SENT]->(m:Message) \
             RETURN count(m) AS cnt",
        )
        .param("uid", user_id)
    })
    .await?;

    match row {
        Some(row) => row_i64(&row, "cnt"),
        None => Ok(0),
    }
}

/// Detach-delete every message sent by a user; the user node stays
pub async fn delete_user_messages(ctx: &GraphContext, user_id: &str) -> Result<(), ApiError> {
    run_many(ctx, || {
        query(
            "MATCH (:User {id: $uid})-[:SENT]->(m:Message) \
             DETACH DELETE m",
        )
        .param("uid", user_id)
    })
    .await?;
    Ok(())
}

/// Remove every conversation left with zero messages
pub async fn prune_empty_conversations(ctx: &GraphContext) -> Result<(), ApiError> {
    run_many(ctx, || {
        query(
            "MATCH (c:Conversation) \
             WHERE NOT (c)-[:HAS_MESSAGE]->() \
             DETACH DELETE c",
        )
    })
    .await?;
    Ok(())
}
