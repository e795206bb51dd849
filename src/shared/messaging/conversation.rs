//! Conversation Identity and Summaries
//!
//! A conversation is an exactly-two-party thread. Its id is not random:
//! it is derived from the unordered pair of participant ids, which makes
//! "ensure conversation" naturally idempotent and removes the need for a
//! lookup index keyed by the pair.

use serde::{Deserialize, Serialize};

use super::message::MessageView;
use super::user::PublicUser;

/// Prefix namespacing conversation ids inside the store
const CONVERSATION_ID_PREFIX: &str = "convo";

/// Canonical conversation identifier derived from a participant pair
///
/// Derivation sorts the two participant ids lexicographically and joins
/// them under a fixed prefix, so `for_pair(a, b) == for_pair(b, a)` and
/// distinct unordered pairs never collide (participant ids are assumed
/// globally unique).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Derive the canonical id for an unordered pair of participants
    pub fn for_pair(a: &str, b: &str) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{CONVERSATION_ID_PREFIX}:{lo}:{hi}"))
    }

    /// Wrap an id received from a client or read back from the store
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in the caller's conversation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: ConversationId,
    /// The other participant's public profile
    pub user: PublicUser,
    /// Most recent message, `None` for conversations with no messages yet
    pub last_message: Option<MessageView>,
}

/// Request to start (or fetch) a conversation with another user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationRequest {
    /// Other user's id
    pub user_id: String,
}

/// Response after starting (or fetching) a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationResponse {
    pub conversation_id: ConversationId,
    pub user: PublicUser,
}

/// Non-creating lookup of the conversation with a specific user
///
/// `conversation_id` is `None` when no conversation exists; the other
/// fields are only populated alongside a hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationWithResponse {
    pub conversation_id: Option<ConversationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageView>,
}

impl ConversationWithResponse {
    /// The "no conversation yet" response body
    pub fn not_found() -> Self {
        Self {
            conversation_id: None,
            user: None,
            last_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_pair_is_commutative() {
        assert_eq!(
            ConversationId::for_pair("u1", "u2"),
            ConversationId::for_pair("u2", "u1")
        );
    }

    #[test]
    fn test_for_pair_is_deterministic() {
        let first = ConversationId::for_pair("alice", "bob");
        let second = ConversationId::for_pair("alice", "bob");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "convo:alice:bob");
    }

    #[test]
    fn test_distinct_pairs_get_distinct_ids() {
        let ab = ConversationId::for_pair("a", "b");
        let ac = ConversationId::for_pair("a", "c");
        let bc = ConversationId::for_pair("b", "c");
        assert_ne!(ab, ac);
        assert_ne!(ab, bc);
        assert_ne!(ac, bc);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let cid = ConversationId::for_pair("u2", "u1");
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, "\"convo:u1:u2\"");

        let back: ConversationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);
    }

    #[test]
    fn test_not_found_response_omits_profile_fields() {
        let json = serde_json::to_value(ConversationWithResponse::not_found()).unwrap();
        assert_eq!(json["conversation_id"], serde_json::Value::Null);
        assert!(json.get("user").is_none());
        assert!(json.get("last_message").is_none());
    }
}
