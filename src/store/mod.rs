//! Document store access for site settings.
//!
//! [`SiteStore`] is the seam between the request handlers and the database.
//! Production uses [`MongoSiteStore`]; tests substitute an in-memory fake.
//!
//! Settings live in the `settings-live` collection as several documents per
//! site, one per settings kind (see [`SettingsKind`]). The canonical site URL
//! lives in the `sites` collection, keyed by the site identifier.

mod mongo;

pub use mongo::MongoSiteStore;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use serde::{Deserialize, Deserializer, Serialize};

/// Store-level failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

/// The settings documents that contribute to a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsKind {
    /// Theme package settings (colors)
    Theme,
    /// General app extension settings (names, icon)
    GeneralAppExtension,
    /// Native app publishing settings
    NativeAppExtension,
    /// Site-wide general settings
    SiteGeneral,
}

impl SettingsKind {
    pub const ALL: [SettingsKind; 4] = [
        SettingsKind::Theme,
        SettingsKind::GeneralAppExtension,
        SettingsKind::NativeAppExtension,
        SettingsKind::SiteGeneral,
    ];

    /// Value stored in `woronaInfo.name`
    pub fn document_name(self) -> &'static str {
        match self {
            SettingsKind::Theme => "saturn-app-theme-worona",
            SettingsKind::GeneralAppExtension => "general-app-extension-worona",
            SettingsKind::NativeAppExtension => "publish-native-app-extension-worona",
            SettingsKind::SiteGeneral => "site-general-settings-worona",
        }
    }
}

/// One settings document, restricted to the fields a manifest can use.
///
/// Each field distinguishes three states: `None` when the document does not
/// carry it, `Some(None)` when it is stored as `null` or as a non-string
/// value, and `Some(Some(text))` otherwise. A present field always replaces
/// the merged value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub main_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub app_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub icon_src: Option<Option<String>>,
}

/// Reads a present field of any BSON type. Only strings carry a value.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Bson::deserialize(deserializer)? {
        Bson::String(text) => Some(text),
        _ => None,
    }))
}

impl SettingsDocument {
    /// Field names fetched from `settings-live`
    pub const FIELDS: [&'static str; 8] = [
        "mainColor",
        "title",
        "name",
        "shortName",
        "description",
        "url",
        "appName",
        "iconSrc",
    ];
}

/// The site record; only its canonical URL is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Read access to site settings.
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Active settings documents of the known kinds for a site, in store order.
    async fn find_settings(&self, site_id: &str) -> Result<Vec<SettingsDocument>, StoreError>;

    /// The site document, if one exists.
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteDocument>, StoreError>;
}

/// Query filter selecting the active, known settings documents of a site.
pub fn settings_filter(site_id: &str) -> Document {
    let names: Vec<&str> = SettingsKind::ALL
        .iter()
        .map(|kind| kind.document_name())
        .collect();

    doc! {
        "woronaInfo.siteId": site_id,
        "woronaInfo.active": true,
        "woronaInfo.name": { "$in": names },
    }
}

/// Projection limiting settings documents to [`SettingsDocument::FIELDS`].
pub fn settings_projection() -> Document {
    let mut projection = doc! { "_id": 0 };
    for field in SettingsDocument::FIELDS {
        projection.insert(field, 1);
    }
    projection
}

/// Query filter selecting a site by primary key.
pub fn site_filter(site_id: &str) -> Document {
    doc! { "_id": site_id }
}

/// Projection limiting site documents to their URL.
pub fn site_projection() -> Document {
    doc! { "_id": 0, "url": 1 }
}
