//! Application State Management
//!
//! `AppState` is the central state container for the Axum application:
//! the injected graph-store context and the realtime room registry.
//! Handlers that only need one of the two can extract it directly via
//! the `FromRef` implementations, following Axum's recommended pattern.
//!
//! # Thread Safety
//!
//! - `Arc<GraphContext>` shares the cached store handle across requests;
//!   the context's own mutex guards the handle.
//! - `RoomRegistry` is internally synchronized and cheap to clone.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::graph::GraphContext;
use crate::backend::realtime::RoomRegistry;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Graph store context: cached handle + schema readiness flag
    pub graph: Arc<GraphContext>,
    /// Per-conversation realtime broadcast rooms
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(graph: Arc<GraphContext>, rooms: RoomRegistry) -> Self {
        Self { graph, rooms }
    }
}

/// Allow handlers to extract the graph context directly
impl FromRef<AppState> for Arc<GraphContext> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.graph)
    }
}

/// Allow handlers to extract the room registry directly
impl FromRef<AppState> for RoomRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}
