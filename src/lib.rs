//! pwa-manifest - per-site Web App Manifest service
//!
//! Resolves a site identifier from the request path, reads the site's
//! settings from MongoDB, and serves the merged result as a Web App Manifest
//! with a `Cache-Tag` header for downstream cache partitioning.

pub mod cache_tag;
pub mod config;
pub mod error;
pub mod http;
pub mod manifest;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
