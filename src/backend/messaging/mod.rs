//! Messaging core
//!
//! This module owns the messaging semantics: idempotent conversation and
//! participant management, message ingestion and history, read-tracking,
//! and the bulk deletion operations.
//!
//! # Structure
//!
//! - **`conversation`** - ensure-user / ensure-conversation / participants
//! - **`db`** - Cypher operations for messages and conversation listings
//! - **`handlers`** - the HTTP surface
//!
//! All durable state lives in the graph store; these modules hold none.

/// Conversation and participant management
pub mod conversation;

/// Store operations for messages
pub mod db;

/// Messaging HTTP handlers
pub mod handlers;
