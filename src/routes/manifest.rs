//! Handler serving the Web App Manifest of a site.
//!
//! Looks up the site's settings documents and site record, merges them, and
//! returns the manifest as JSON with a `Cache-Tag` header derived from the
//! site identifier.
//!
//! The identifier is taken from the path as sent, without percent-decoding,
//! so `a%2Fb` is looked up and tagged as `a%2Fb`.

use axum::{
    extract::{RawPathParams, State},
    response::{IntoResponse, Json, Response},
};
use axum::http::header::{HeaderName, HeaderValue};
use tracing::instrument;

use crate::cache_tag::cache_tag;
use crate::config::CACHE_TAG_HEADER;
use crate::error::AppError;
use crate::manifest::{Manifest, SiteSettings};
use crate::state::AppState;
use crate::store::SiteStore;

/// Path parameter holding the site identifier
const SITE_ID_PARAM: &str = "id";

/// Builds and returns the manifest for one site.
#[instrument(name = "manifest.view", skip_all, fields(site_id = tracing::field::Empty))]
pub async fn view(
    State(state): State<AppState>,
    params: RawPathParams,
) -> Result<Response, AppError> {
    let site_id = params
        .iter()
        .find(|(key, _)| *key == SITE_ID_PARAM)
        .map(|(_, value)| value.to_string())
        .ok_or(AppError::RouteNotFound)?;
    tracing::Span::current().record("site_id", site_id.as_str());

    let manifest = load_manifest(state.store.as_ref(), &site_id).await?;

    let tag = cache_tag(&site_id)?;
    let tag_value = HeaderValue::from_str(&tag)
        .map_err(|e| AppError::Internal(format!("Invalid cache tag '{}': {}", tag, e)))?;
    tracing::debug!(cache_tag = %tag, "Serving manifest");

    Ok((
        [(HeaderName::from_static(CACHE_TAG_HEADER), tag_value)],
        Json(manifest),
    )
        .into_response())
}

/// Fetch a site's settings and build its manifest.
///
/// Both queries are issued concurrently, but their outcomes are checked in
/// order: a settings failure or an empty settings result is reported before
/// anything the site query returned, including its errors.
pub async fn load_manifest(store: &dyn SiteStore, site_id: &str) -> Result<Manifest, AppError> {
    let (documents, site) = tokio::join!(store.find_settings(site_id), store.find_site(site_id));

    let documents = documents?;
    if documents.is_empty() {
        return Err(AppError::SettingsNotFound(site_id.to_string()));
    }
    let site = site?.ok_or_else(|| AppError::SiteNotFound(site_id.to_string()))?;

    tracing::debug!(documents = documents.len(), "Merging settings documents");
    let settings = SiteSettings::merged(site, documents);

    Ok(Manifest::from_settings(&settings))
}
