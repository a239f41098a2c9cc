//! Web App Manifest construction.
//!
//! Settings documents for a site are merged into a single [`SiteSettings`]
//! record, seeded with the site's canonical URL. A [`Manifest`] is then built
//! from that record plus fixed presentation values and one icon entry per
//! size in [`ICON_SIZES`].

use serde::Serialize;

use crate::config::{
    ICON_MIME_TYPE, ICON_PROFILE_PREFIX, ICON_SIZES, MANIFEST_BACKGROUND_COLOR, MANIFEST_DIR,
    MANIFEST_DISPLAY, MANIFEST_LANG, MANIFEST_ORIENTATION,
};
use crate::store::{SettingsDocument, SiteDocument};

/// Flattened view of every settings document for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSettings {
    pub main_color: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub app_name: Option<String>,
    pub icon_src: Option<String>,
}

impl SiteSettings {
    /// Start from the site record: only the URL is known.
    pub fn from_site(site: SiteDocument) -> Self {
        Self {
            url: site.url,
            ..Default::default()
        }
    }

    /// Overlay one settings document. Every field present in `doc` replaces
    /// the current value, including a stored `null`; absent fields leave it
    /// untouched.
    pub fn merge(&mut self, doc: SettingsDocument) {
        fn overlay(slot: &mut Option<String>, value: Option<Option<String>>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        overlay(&mut self.main_color, doc.main_color);
        overlay(&mut self.title, doc.title);
        overlay(&mut self.name, doc.name);
        overlay(&mut self.short_name, doc.short_name);
        overlay(&mut self.description, doc.description);
        overlay(&mut self.url, doc.url);
        overlay(&mut self.app_name, doc.app_name);
        overlay(&mut self.icon_src, doc.icon_src);
    }

    /// Merge documents in the order given; the last one wins on conflicts.
    pub fn merged<I>(site: SiteDocument, docs: I) -> Self
    where
        I: IntoIterator<Item = SettingsDocument>,
    {
        docs.into_iter().fold(Self::from_site(site), |mut acc, doc| {
            acc.merge(doc);
            acc
        })
    }
}

/// A single icon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub sizes: String,
}

impl ManifestIcon {
    pub fn new(icon_src: &str, size: u32) -> Self {
        Self {
            src: format!("{}?profile={}{}", icon_src, ICON_PROFILE_PREFIX, size),
            mime_type: ICON_MIME_TYPE,
            sizes: format!("{}x{}", size, size),
        }
    }
}

/// Web App Manifest document.
///
/// Field names follow the W3C manifest member names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    pub theme_color: String,
    pub background_color: &'static str,
    pub dir: &'static str,
    pub display: &'static str,
    pub orientation: &'static str,
    pub lang: &'static str,
    pub icons: Vec<ManifestIcon>,
}

impl Manifest {
    pub fn from_settings(settings: &SiteSettings) -> Self {
        let icon_src = settings.icon_src.as_deref().unwrap_or_default();

        Self {
            name: first_non_empty(&settings.name, &settings.app_name),
            short_name: first_non_empty(&settings.short_name, &settings.app_name),
            description: non_empty(&settings.description).unwrap_or_default(),
            start_url: settings.url.clone(),
            theme_color: non_empty(&settings.main_color).unwrap_or_default(),
            background_color: MANIFEST_BACKGROUND_COLOR,
            dir: MANIFEST_DIR,
            display: MANIFEST_DISPLAY,
            orientation: MANIFEST_ORIENTATION,
            lang: MANIFEST_LANG,
            icons: ICON_SIZES
                .iter()
                .map(|&size| ManifestIcon::new(icon_src, size))
                .collect(),
        }
    }
}

/// Empty strings count as unset when choosing between fallbacks.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn first_non_empty(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
    non_empty(primary).or_else(|| fallback.clone())
}
