//! Credential resolution
//!
//! Bearer tokens are self-contained: the identity provider signs the
//! caller's id, display name, profile picture, and role into the claims,
//! so resolving a credential never touches the store.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::error::ApiError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Display name
    #[serde(default)]
    pub username: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// Role, e.g. "admin" or "superadmin"
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// The resolved caller of a request
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: String,
    pub username: Option<String>,
    pub profile_pic: Option<String>,
    pub role: Option<String>,
}

impl Caller {
    /// Whether the caller may perform admin-only operations
    pub fn is_admin(&self) -> bool {
        matches!(
            self.role.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("admin") | Some("superadmin")
        )
    }
}

/// Get the signing secret from environment
fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|err| {
        tracing::warn!("Missing JWT_SECRET ({err}); using development default");
        "your-secret-key-change-in-production".to_string()
    })
}

/// Mint a bearer credential for a caller
///
/// Tokens expire after 30 days. Used by tests and operator tooling; the
/// production identity provider issues its own.
pub fn mint_token(caller: &Caller) -> Result<String, ApiError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ApiError::Internal(format!("clock before epoch: {e}")))?
        .as_secs();

    let claims = Claims {
        sub: caller.id.clone(),
        username: caller.username.clone(),
        profile_pic: caller.profile_pic.clone(),
        role: caller.role.clone(),
        exp: now + 30 * 24 * 60 * 60,
        iat: now,
    };

    let key = EncodingKey::from_secret(jwt_secret().as_ref());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| ApiError::Internal(format!("failed to sign credential: {e}")))
}

/// Resolve a bearer credential to the caller it was issued for
///
/// # Errors
///
/// `ApiError::Authentication` on an invalid, expired, or tampered token.
pub fn resolve_caller(credential: &str) -> Result<Caller, ApiError> {
    let key = DecodingKey::from_secret(jwt_secret().as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(credential, &key, &validation)
        .map_err(|_| ApiError::Authentication("Could not validate credentials".to_string()))?;

    let claims = token_data.claims;
    Ok(Caller {
        id: claims.sub,
        username: claims.username,
        profile_pic: claims.profile_pic,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn caller(id: &str, role: Option<&str>) -> Caller {
        Caller {
            id: id.to_string(),
            username: Some(format!("{id}-name")),
            profile_pic: None,
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_mint_and_resolve_roundtrip() {
        let minted = caller("u1", None);
        let token = mint_token(&minted).unwrap();
        let resolved = resolve_caller(&token).unwrap();

        assert_eq!(resolved.id, "u1");
        assert_eq!(resolved.username.as_deref(), Some("u1-name"));
        assert!(resolved.role.is_none());
    }

    #[test]
    fn test_garbage_credential_is_authentication_error() {
        let err = resolve_caller("invalid.token.here").unwrap_err();
        assert_matches!(err, ApiError::Authentication(_));
    }

    #[test]
    fn test_admin_roles() {
        assert!(caller("a", Some("admin")).is_admin());
        assert!(caller("a", Some("superadmin")).is_admin());
        assert!(caller("a", Some("Admin")).is_admin());
        assert!(!caller("a", Some("moderator")).is_admin());
        assert!(!caller("a", None).is_admin());
    }

    #[test]
    fn test_role_survives_roundtrip() {
        let token = mint_token(&caller("root", Some("superadmin"))).unwrap();
        let resolved = resolve_caller(&token).unwrap();
        assert!(resolved.is_admin());
    }
}
