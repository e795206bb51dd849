//! Identity provider boundary
//!
//! Callers are authenticated elsewhere; this module only resolves an
//! opaque bearer credential to the caller's profile. Credential issuance
//! (`mint_token`) is kept for tests and operator tooling; there is no
//! signup or login surface in this crate.

/// Credential resolution and claims
pub mod identity;

pub use identity::{mint_token, resolve_caller, Caller, Claims};
