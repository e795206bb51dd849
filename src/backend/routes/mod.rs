//! Route configuration

/// Messaging API routes
pub mod api_routes;

/// Main router assembly
pub mod router;

pub use router::create_router;
