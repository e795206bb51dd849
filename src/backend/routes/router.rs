//! Router Configuration
//!
//! Combines the messaging routes, authentication middleware, request
//! tracing, and the fallback handler into the final application router.
//!
//! Every messaging and realtime route sits behind the auth middleware;
//! there are no public routes in this crate.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth::auth_middleware;
use crate::backend::routes::api_routes::configure_message_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_message_routes(Router::new());

    // Auth applies to every route registered above.
    let router = router.route_layer(axum::middleware::from_fn(auth_middleware));

    let router = router
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" });

    router.with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::graph::GraphContext;
    use crate::backend::realtime::RoomRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_router_builds_with_unconfigured_store() {
        let state = AppState::new(Arc::new(GraphContext::new(None)), RoomRegistry::new());
        let _router = create_router(state);
    }
}
