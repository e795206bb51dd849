//! Hearsay - Messaging Core
//!
//! Hearsay is the messaging subsystem of a social-networking backend:
//! conversation identity, message persistence, read-tracking, and realtime
//! fan-out over Server-Sent Events.
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Wire types used by the HTTP API and realtime stream
//!   - Message and conversation payloads
//!   - Realtime event types
//!   - The canonical conversation id derivation
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, routes and middleware
//!   - Graph-store connection management and query execution
//!   - Messaging operations (send, history, read-tracking, deletion)
//!   - Per-conversation realtime broadcast rooms
//!
//! # External Collaborators
//!
//! Durable state lives in a Neo4j-compatible graph store; callers are
//! identified by bearer credentials minted elsewhere. Both are reached
//! through narrow seams (`backend::graph`, `backend::auth`) so the core
//! holds no mutable state beyond a cached connection handle and a
//! schema-readiness flag.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hearsay::backend::server::init::create_app;
//!
//! # async fn example() {
//! let app = create_app().await;
//! // Serve with axum
//! # }
//! ```

/// Wire types shared between the HTTP API and the realtime stream
pub mod shared;

/// Backend server-side code
pub mod backend;
