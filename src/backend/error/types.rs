//! Error taxonomy for the messaging core
//!
//! Each variant maps to a distinct client-facing status code. Only
//! `Connection` is retryable, and that decision is made once in the query
//! executor before errors are translated to responses; nothing at the
//! HTTP boundary inspects the taxonomy to decide retries.

use axum::http::StatusCode;
use thiserror::Error;

/// All errors the messaging core can surface to a caller
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// Malformed input: empty content, missing identifier, bad pagination
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired bearer credential
    #[error("{0}")]
    Authentication(String),

    /// Authenticated but not a participant/owner/admin
    #[error("{0}")]
    Authorization(String),

    /// Entity absent, or malformed beyond repair (treated the same)
    #[error("{0}")]
    NotFound(String),

    /// Self-message / self-conversation attempt
    #[error("{0}")]
    SelfReference(String),

    /// Required store connection parameters are absent
    #[error("Store configuration missing: {0}")]
    Configuration(String),

    /// Transient connectivity failure that survived the retry budget
    #[error("Store connection error: {0}")]
    Connection(String),

    /// Permanent query error, surfaced with the store's diagnostic
    #[error("Store error: {0}")]
    Query(String),

    /// A write completed without returning its confirmation row
    #[error("{0}")]
    Persistence(String),

    /// Anything unclassified
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error kind
    ///
    /// Validation and self-reference failures use 422 to match the
    /// request-body semantics of the public API; infrastructure failures
    /// collapse to 500 regardless of their internal kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::SelfReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_)
            | Self::Connection(_)
            | Self::Query(_)
            | Self::Persistence(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message for the response body
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_status_codes() {
        assert_eq!(
            ApiError::Validation("empty".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::SelfReference("self".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Authentication("bad token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Authorization("not a participant".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_infrastructure_errors_are_500() {
        for err in [
            ApiError::Configuration("NEO4J_URI".into()),
            ApiError::Connection("refused".into()),
            ApiError::Query("syntax".into()),
            ApiError::Persistence("no row".into()),
            ApiError::Internal("?".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_message_includes_store_diagnostic() {
        let err = ApiError::Query("Invalid input 'MTCH'".into());
        assert!(err.message().contains("Invalid input 'MTCH'"));
    }
}
