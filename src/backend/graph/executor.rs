//! Query execution with retry and error normalization
//!
//! Two operation shapes cover every store access in the crate:
//!
//! - [`run_many`] materializes every result row before returning, so a
//!   result cursor can never be read after the session that produced it
//!   has closed.
//! - [`run_single`] consumes at most one row within the session.
//!
//! Transient connectivity failures invalidate the cached handle and are
//! retried up to the shape's budget; permanent query errors surface
//! immediately with the store's diagnostic message. The budgets live in
//! [`RetryPolicy`] values rather than loose counters.

use neo4rs::{Graph, Query, Row};

use crate::backend::error::ApiError;
use crate::backend::graph::connection::GraphContext;

/// Bounded retry budget for one executor call
///
/// Only transient connectivity failures consume the budget; everything
/// else surfaces on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Budget for list-shaped queries
    pub fn many() -> Self {
        Self { max_attempts: 3 }
    }

    /// Budget for single-row queries
    pub fn single() -> Self {
        Self { max_attempts: 2 }
    }

    /// Whether a failure is worth another attempt
    pub fn retries(&self, failure: &StoreFailure) -> bool {
        matches!(failure, StoreFailure::Transient(_))
    }
}

/// Normalized store failure, classified once at the driver boundary
#[derive(Debug)]
pub enum StoreFailure {
    /// Connectivity loss or a server-signalled retryable condition
    Transient(String),
    /// Permanent query error with the store's diagnostic message
    Query(String),
    /// Anything the driver reports that fits neither bucket
    Other(String),
}

impl StoreFailure {
    fn detail(&self) -> &str {
        match self {
            Self::Transient(detail) | Self::Query(detail) | Self::Other(detail) => detail,
        }
    }

    fn into_api_error(self) -> ApiError {
        match self {
            Self::Transient(detail) => ApiError::Connection(detail),
            Self::Query(detail) => ApiError::Query(detail),
            Self::Other(detail) => ApiError::Internal(detail),
        }
    }
}

/// Classify a driver error into retryable / permanent / unexpected
fn classify(err: neo4rs::Error) -> StoreFailure {
    match err {
        neo4rs::Error::ConnectionError => {
            StoreFailure::Transient("connection to graph store lost".to_string())
        }
        neo4rs::Error::IOError { detail } => StoreFailure::Transient(detail.to_string()),
        neo4rs::Error::Neo4j(e) if e.can_retry() => {
            StoreFailure::Transient(neo4rs::Error::Neo4j(e).to_string())
        }
        neo4rs::Error::Neo4j(e) => StoreFailure::Query(neo4rs::Error::Neo4j(e).to_string()),
        other => StoreFailure::Other(other.to_string()),
    }
}

/// Execute a query and return all result rows, fully materialized
///
/// Retries transient connectivity failures up to 3 attempts, discarding
/// the cached handle between attempts. `build` is called once per attempt
/// so every retry submits a fresh query.
pub async fn run_many(
    ctx: &GraphContext,
    build: impl Fn() -> Query,
) -> Result<Vec<Row>, ApiError> {
    let policy = RetryPolicy::many();
    let mut last_detail = String::new();

    for attempt in 1..=policy.max_attempts {
        let graph = ctx.acquire().await?;
        match fetch_all(&graph, build()).await {
            Ok(rows) => return Ok(rows),
            Err(failure) if policy.retries(&failure) => {
                tracing::warn!(
                    attempt,
                    "transient store failure, reconnecting: {}",
                    failure.detail()
                );
                last_detail = failure.detail().to_string();
                ctx.invalidate().await;
            }
            Err(failure) => return Err(failure.into_api_error()),
        }
    }

    Err(ApiError::Connection(last_detail))
}

/// Execute a query and return at most one row
///
/// Same contract as [`run_many`] with a retry budget of 2 attempts. The
/// row is consumed within the session.
pub async fn run_single(
    ctx: &GraphContext,
    build: impl Fn() -> Query,
) -> Result<Option<Row>, ApiError> {
    let policy = RetryPolicy::single();
    let mut last_detail = String::new();

    for attempt in 1..=policy.max_attempts {
        let graph = ctx.acquire().await?;
        match fetch_one(&graph, build()).await {
            Ok(row) => return Ok(row),
            Err(failure) if policy.retries(&failure) => {
                tracing::warn!(
                    attempt,
                    "transient store failure, reconnecting: {}",
                    failure.detail()
                );
                last_detail = failure.detail().to_string();
                ctx.invalidate().await;
            }
            Err(failure) => return Err(failure.into_api_error()),
        }
    }

    Err(ApiError::Connection(last_detail))
}

/// Read a required string column from a result row
pub fn row_string(row: &Row, column: &str) -> Result<String, ApiError> {
    row.get::<String>(column)
        .map_err(|e| ApiError::Internal(format!("bad row field '{column}': {e}")))
}

/// Read a nullable string column from a result row
pub fn row_opt_string(row: &Row, column: &str) -> Result<Option<String>, ApiError> {
    row.get::<Option<String>>(column)
        .map_err(|e| ApiError::Internal(format!("bad row field '{column}': {e}")))
}

/// Read an integer column from a result row
pub fn row_i64(row: &Row, column: &str) -> Result<i64, ApiError> {
    row.get::<i64>(column)
        .map_err(|e| ApiError::Internal(format!("bad row field '{column}': {e}")))
}

async fn fetch_all(graph: &Graph, q: Query) -> Result<Vec<Row>, StoreFailure> {
    let mut result = graph.execute(q).await.map_err(classify)?;
    let mut rows = Vec::new();
    while let Some(row) = result.next().await.map_err(classify)? {
        rows.push(row);
    }
    Ok(rows)
}

async fn fetch_one(graph: &Graph, q: Query) -> Result<Option<Row>, StoreFailure> {
    let mut result = graph.execute(q).await.map_err(classify)?;
    result.next().await.map_err(classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_budgets_match_operation_shapes() {
        assert_eq!(RetryPolicy::many().max_attempts, 3);
        assert_eq!(RetryPolicy::single().max_attempts, 2);
    }

    #[test]
    fn test_only_transient_failures_retry() {
        let policy = RetryPolicy::many();
        assert!(policy.retries(&StoreFailure::Transient("gone".into())));
        assert!(!policy.retries(&StoreFailure::Query("bad cypher".into())));
        assert!(!policy.retries(&StoreFailure::Other("?".into())));
    }

    #[test]
    fn test_classify_connection_loss_as_transient() {
        let failure = classify(neo4rs::Error::ConnectionError);
        assert_matches!(failure, StoreFailure::Transient(_));
    }

    #[test]
    fn test_classify_io_error_as_transient() {
        let failure = classify(neo4rs::Error::IOError {
            detail: "broken pipe".to_string(),
        });
        assert_matches!(failure, StoreFailure::Transient(detail) if detail == "broken pipe");
    }

    #[test]
    fn test_failure_maps_to_error_taxonomy() {
        assert_matches!(
            StoreFailure::Transient("x".into()).into_api_error(),
            ApiError::Connection(_)
        );
        assert_matches!(
            StoreFailure::Query("x".into()).into_api_error(),
            ApiError::Query(_)
        );
        assert_matches!(
            StoreFailure::Other("x".into()).into_api_error(),
            ApiError::Internal(_)
        );
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_before_retrying() {
        let ctx = GraphContext::new(None);
        let err = run_many(&ctx, || neo4rs::query("RETURN 1"))
            .await
            .unwrap_err();
        assert_matches!(err, ApiError::Configuration(_));
    }
}
