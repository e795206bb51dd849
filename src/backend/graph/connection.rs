//! Graph store connection management
//!
//! `GraphContext` replaces what would otherwise be a pair of module-level
//! globals: the cached driver handle and the schema-readiness flag. One
//! instance is created per process (or per test) and injected into every
//! component through the application state.
//!
//! Reconnection is lazy only. When a request hits a transient failure the
//! executor calls `invalidate()`, and the next `acquire()` re-establishes
//! the handle. Concurrent requests may race to reconnect; that is
//! harmless because establishing a handle is idempotent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use neo4rs::{query, ConfigBuilder, Graph};
use tokio::sync::Mutex;

use crate::backend::error::ApiError;

/// Connection parameters for the graph store
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl GraphConfig {
    /// Load connection parameters from the environment
    ///
    /// Accepts both `NEO4J_USER` and `NEO4J_USERNAME` for compatibility
    /// with hosting providers that differ in naming. Returns `None` when
    /// any required parameter is absent; the server still boots and the
    /// missing configuration surfaces on first store access.
    pub fn from_env() -> Option<Self> {
        let uri = std::env::var("NEO4J_URI").ok();
        let user = std::env::var("NEO4J_USER")
            .or_else(|_| std::env::var("NEO4J_USERNAME"))
            .ok();
        let password = std::env::var("NEO4J_PASSWORD").ok();
        let database = std::env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".to_string());

        match (uri, user, password) {
            (Some(uri), Some(user), Some(password)) => Some(Self {
                uri,
                user,
                password,
                database,
            }),
            _ => {
                tracing::warn!(
                    "NEO4J_URI/NEO4J_USER/NEO4J_PASSWORD not fully set. \
                     Store access will fail until configured."
                );
                None
            }
        }
    }
}

/// Unique-id constraints the messaging queries rely on
///
/// Lookup-by-id on users and conversations must be index-backed; the
/// message id constraint additionally guards against duplicate creation.
const SCHEMA_CONSTRAINTS: [&str; 3] = [
    "CREATE CONSTRAINT user_id_unique IF NOT EXISTS \
     FOR (u:User) REQUIRE u.id IS UNIQUE",
    "CREATE CONSTRAINT conversation_id_unique IF NOT EXISTS \
     FOR (c:Conversation) REQUIRE c.id IS UNIQUE",
    "CREATE CONSTRAINT message_id_unique IF NOT EXISTS \
     FOR (m:Message) REQUIRE m.id IS UNIQUE",
];

/// Shared context holding the cached store handle and readiness flag
pub struct GraphContext {
    config: Option<GraphConfig>,
    handle: Mutex<Option<Arc<Graph>>>,
    schema_ready: AtomicBool,
}

impl GraphContext {
    /// Create a context from explicit configuration
    pub fn new(config: Option<GraphConfig>) -> Self {
        Self {
            config,
            handle: Mutex::new(None),
            schema_ready: AtomicBool::new(false),
        }
    }

    /// Create a context from environment variables
    pub fn from_env() -> Self {
        Self::new(GraphConfig::from_env())
    }

    /// Whether store connection parameters are present
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Return the live store handle, connecting lazily on first use
    ///
    /// # Errors
    ///
    /// * `ApiError::Configuration` - required connection parameters absent
    /// * `ApiError::Connection` - the handshake with the store failed
    pub async fn acquire(&self) -> Result<Arc<Graph>, ApiError> {
        let config = self.config.as_ref().ok_or_else(|| {
            ApiError::Configuration("set NEO4J_URI, NEO4J_USER, NEO4J_PASSWORD".to_string())
        })?;

        let mut guard = self.handle.lock().await;
        if let Some(graph) = guard.as_ref() {
            return Ok(Arc::clone(graph));
        }

        tracing::info!("Connecting to graph store at {}", config.uri);
        let store_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .build()
            .map_err(|e| ApiError::Connection(format!("invalid driver config: {e}")))?;

        let graph = Graph::connect(store_config)
            .await
            .map_err(|e| ApiError::Connection(format!("failed to connect to graph store: {e}")))?;

        let graph = Arc::new(graph);
        *guard = Some(Arc::clone(&graph));
        tracing::info!("Graph store handle established");
        Ok(graph)
    }

    /// Discard the cached handle after a transient failure
    ///
    /// The next `acquire()` re-establishes the connection. There is no
    /// background reconnection.
    pub async fn invalidate(&self) {
        let mut guard = self.handle.lock().await;
        if guard.take().is_some() {
            tracing::warn!("Graph store handle invalidated; will reconnect on next use");
        }
    }

    /// Ensure uniqueness constraints exist, once per process
    ///
    /// Fail-safe: constraint creation errors (insufficient privileges,
    /// already-existing constraints on older servers) are logged and the
    /// readiness flag is set regardless, so a restricted deployment does
    /// not retry the bootstrap on every request.
    pub async fn ensure_schema(&self) {
        if self.schema_ready.swap(true, Ordering::SeqCst) {
            return;
        }

        let graph = match self.acquire().await {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!("Skipping schema bootstrap, store unavailable: {}", e);
                return;
            }
        };

        for constraint in SCHEMA_CONSTRAINTS {
            if let Err(e) = graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }
        tracing::info!("Graph schema constraints ensured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_acquire_without_config_is_configuration_error() {
        let ctx = GraphContext::new(None);
        let err = ctx.acquire().await.unwrap_err();
        assert_matches!(err, ApiError::Configuration(_));
    }

    #[tokio::test]
    async fn test_unconfigured_context_reports_unconfigured() {
        let ctx = GraphContext::new(None);
        assert!(!ctx.is_configured());
    }

    #[tokio::test]
    async fn test_invalidate_on_empty_cache_is_a_no_op() {
        let ctx = GraphContext::new(None);
        // Nothing cached yet; must not panic or deadlock.
        ctx.invalidate().await;
        ctx.invalidate().await;
    }

    #[tokio::test]
    async fn test_schema_bootstrap_runs_once_even_unconfigured() {
        let ctx = GraphContext::new(None);
        ctx.ensure_schema().await;
        // Second call returns immediately via the readiness flag.
        ctx.ensure_schema().await;
        assert!(ctx.schema_ready.load(Ordering::SeqCst));
    }
}
