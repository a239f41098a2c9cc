//! Health check endpoint for container orchestration.
//!
//! Liveness only: it does not touch the document store.

/// Returns "ok" while the process can serve HTTP.
pub async fn health() -> &'static str {
    "ok"
}
