//! Authentication Middleware
//!
//! Protects the messaging routes. It extracts the bearer credential from
//! the Authorization header, resolves it through the identity boundary,
//! and attaches the resulting [`Caller`] to the request extensions for
//! handlers to pick up via the [`AuthUser`] extractor.

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::backend::auth::{resolve_caller, Caller};
use crate::backend::error::ApiError;

/// Authentication middleware
///
/// Returns `401 Unauthorized` when the credential is missing, malformed,
/// or fails to resolve.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            ApiError::Authentication("Missing Authorization header".to_string())
        })?;

    let credential = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        ApiError::Authentication("Expected a bearer credential".to_string())
    })?;

    let caller = resolve_caller(credential)?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated caller
///
/// Use as a handler parameter to get the caller resolved by
/// [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub Caller);

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let caller = parts.extensions.get::<Caller>().cloned().ok_or_else(|| {
            tracing::warn!("Caller not found in request extensions");
            ApiError::Authentication("Could not validate credentials".to_string())
        })?;

        Ok(AuthUser(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;

    #[tokio::test]
    async fn test_extractor_reads_caller_from_extensions() {
        let mut request = axum::http::Request::builder()
            .uri("http://example.com")
            .body(())
            .unwrap();
        request.extensions_mut().insert(Caller {
            id: "u1".to_string(),
            username: Some("alice".to_string()),
            profile_pic: None,
            role: None,
        });

        let (mut parts, _) = request.into_parts();
        let AuthUser(caller) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller.id, "u1");
    }

    #[tokio::test]
    async fn test_extractor_without_caller_is_unauthorized() {
        let request = axum::http::Request::builder()
            .uri("http://example.com")
            .body(())
            .unwrap();

        let (mut parts, _) = request.into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
