//! Backend error types
//!
//! One taxonomy for the whole messaging core. Handlers return `ApiError`
//! directly; the `IntoResponse` impl in `conversion` turns each kind into
//! its HTTP status and JSON body.

/// Error type definitions
pub mod types;

/// Conversions to HTTP responses
pub mod conversion;

pub use types::ApiError;
