//! Shared application state for request handlers.

use std::sync::Arc;

use crate::store::SiteStore;

/// Shared application state, cloneable across handlers.
///
/// Holds the document store used to resolve site settings.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SiteStore>,
}

impl AppState {
    /// Creates a new application state around the given store.
    pub fn new(store: Arc<dyn SiteStore>) -> Self {
        Self { store }
    }
}
