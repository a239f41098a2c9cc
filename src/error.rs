use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::config::CACHE_TAG_MAX_LEN;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Route not found.")]
    RouteNotFound,

    #[error("No settings found with this siteId")]
    SettingsNotFound(String),

    #[error("No sites found with this siteId.")]
    SiteNotFound(String),

    #[error("Cache-Tag is bigger than {} characters.", CACHE_TAG_MAX_LEN)]
    CacheTagTooLong(usize),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RouteNotFound | AppError::SettingsNotFound(_) | AppError::SiteNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::SettingsNotFound(site_id) | AppError::SiteNotFound(site_id) => {
                tracing::debug!(site_id = %site_id, "{}", self);
                self.to_string()
            }
            AppError::RouteNotFound => self.to_string(),
            _ => {
                tracing::error!("Internal error: {:?}", self);
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
