//! MongoDB-backed [`SiteStore`].
//!
//! A single `mongodb::Client` is created at startup and shared by all
//! requests. The driver pools connections internally: each query checks one
//! out and returns it when the operation finishes, on success or error.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};
use tracing::instrument;

use crate::config::{DatabaseConfig, SETTINGS_COLLECTION, SITES_COLLECTION};

use super::{
    settings_filter, settings_projection, site_filter, site_projection, SettingsDocument,
    SiteDocument, SiteStore, StoreError,
};

#[derive(Clone)]
pub struct MongoSiteStore {
    settings: Collection<SettingsDocument>,
    sites: Collection<SiteDocument>,
}

impl std::fmt::Debug for MongoSiteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoSiteStore")
            .field("settings", &self.settings.name())
            .field("sites", &self.sites.name())
            .finish()
    }
}

impl MongoSiteStore {
    /// Create a client from the configured connection string.
    ///
    /// The database is taken from `database.name` when set, otherwise from
    /// the path component of the connection string.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("no database URL configured".to_string()))?;

        let client = Client::with_uri_str(url).await?;

        let database = match config.name.as_deref() {
            Some(name) => client.database(name),
            None => client.default_database().ok_or_else(|| {
                StoreError::Unavailable(
                    "connection string names no database and database.name is unset".to_string(),
                )
            })?,
        };

        tracing::info!(database = %database.name(), "Configured MongoDB site store");

        Ok(Self::from_database(&database))
    }

    pub fn from_database(database: &Database) -> Self {
        Self {
            settings: database.collection(SETTINGS_COLLECTION),
            sites: database.collection(SITES_COLLECTION),
        }
    }
}

#[async_trait]
impl SiteStore for MongoSiteStore {
    #[instrument(name = "store.find_settings", skip(self))]
    async fn find_settings(&self, site_id: &str) -> Result<Vec<SettingsDocument>, StoreError> {
        let cursor = self
            .settings
            .find(settings_filter(site_id))
            .projection(settings_projection())
            .await?;
        let documents: Vec<SettingsDocument> = cursor.try_collect().await?;

        tracing::debug!(count = documents.len(), "Fetched settings documents");
        Ok(documents)
    }

    #[instrument(name = "store.find_site", skip(self))]
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteDocument>, StoreError> {
        let cursor = self
            .sites
            .find(site_filter(site_id))
            .projection(site_projection())
            .limit(1)
            .await?;
        let sites: Vec<SiteDocument> = cursor.try_collect().await?;

        Ok(sites.into_iter().next())
    }
}
