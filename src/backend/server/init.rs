//! Server Initialization
//!
//! Builds the application: state creation, route configuration, and the
//! periodic room cleanup task.
//!
//! # Initialization Process
//!
//! 1. Build the graph store context (connection deferred to first use)
//! 2. Create the realtime room registry
//! 3. Assemble the router with all routes and middleware
//! 4. Spawn the periodic cleanup task for idle rooms
//!
//! The server is resilient to a missing store configuration: it boots
//! anyway and store-backed endpoints fail with a configuration error
//! until the environment is fixed.

use axum::Router;

use crate::backend::realtime::RoomRegistry;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_graph;
use crate::backend::server::state::AppState;

/// How often idle realtime rooms are pruned
const ROOM_CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

/// Create and configure the Axum application
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing hearsay messaging server");

    let graph = load_graph();
    let rooms = RoomRegistry::new();

    let app_state = AppState::new(graph, rooms);
    let app = create_router(app_state.clone());

    // Rooms whose last subscriber disconnected stay in the registry
    // until this sweep drops them.
    let cleanup_rooms = app_state.rooms.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ROOM_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cleanup_rooms.cleanup_idle();
            tracing::debug!("pruned idle rooms, {} remaining", cleanup_rooms.len());
        }
    });

    tracing::info!("Router configured with periodic room cleanup task");

    app
}
