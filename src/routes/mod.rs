//! HTTP routes.
//!
//! The service exposes a single manifest route plus a liveness check. Every
//! other path is answered by [`not_found`], which reports a route mismatch
//! through [`AppError`] without touching the document store.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod manifest;

use axum::{middleware, routing::get, Router};

use crate::config::{HEALTH_ROUTE, MANIFEST_ROUTE, MANIFEST_ROUTE_TRAILING};
use crate::error::AppError;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Fallback for paths that match no route.
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(MANIFEST_ROUTE, get(manifest::view))
        .route(MANIFEST_ROUTE_TRAILING, get(manifest::view))
        .route(HEALTH_ROUTE, get(health::health))
        .fallback(not_found)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
