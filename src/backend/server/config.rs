//! Server configuration
//!
//! Configuration comes from environment variables with development
//! defaults where safe. Store configuration errors are logged but do not
//! prevent startup: the server boots with the store unconfigured and the
//! missing parameters surface as a `ConfigurationError` on first use.

use std::sync::Arc;

use crate::backend::graph::GraphContext;

/// Default port when `SERVER_PORT` is unset or unparsable
const DEFAULT_PORT: u16 = 3000;

/// Build the graph store context from the environment
///
/// Connection is lazy; this never touches the network. A partially-set
/// environment logs a warning and yields an unconfigured context.
pub fn load_graph() -> Arc<GraphContext> {
    let ctx = GraphContext::from_env();
    if ctx.is_configured() {
        tracing::info!("Graph store configured (connection deferred to first use)");
    }
    Arc::new(ctx)
}

/// Port to bind, from `SERVER_PORT`
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
