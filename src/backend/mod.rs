//! Backend Module
//!
//! Server-side code for the hearsay messaging core: an Axum HTTP server
//! over a persistent graph store with realtime fan-out.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`graph`** - Store connection management and query execution
//! - **`messaging`** - Conversations, messages, read-tracking, deletion
//! - **`realtime`** - Per-conversation broadcast rooms and SSE delivery
//! - **`auth`** - Credential resolution (identity provider boundary)
//! - **`middleware`** - Request processing middleware
//! - **`error`** - The error taxonomy and its HTTP mapping
//!
//! # State Management
//!
//! The only process-wide state is in `AppState`: the graph context
//! (cached store handle + schema readiness flag) and the realtime room
//! registry. Everything durable lives in the store. Each request opens
//! short-lived store sessions through the query executor; no transaction
//! spans multiple HTTP operations.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Graph store access
pub mod graph;

/// Messaging core
pub mod messaging;

/// Real-time fan-out
pub mod realtime;

/// Identity provider boundary
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::ApiError;
pub use graph::{GraphConfig, GraphContext};
pub use realtime::RoomRegistry;
pub use server::{create_app, AppState};
