//! Public user profile fields
//!
//! The messaging core only reads a shadow of the user record owned by the
//! identity provider; these are the fields it is allowed to expose.

use serde::{Deserialize, Serialize};

/// Public profile of a conversation participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    /// Opaque user id
    pub id: String,
    /// Display name, `None` for shadow records created without one
    pub username: Option<String>,
    /// Profile picture URL, empty string when the user has none
    pub profile_pic: Option<String>,
}
