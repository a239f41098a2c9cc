//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines constants for
//! routing, the document store collections, cache tagging, manifest icons,
//! logging format, and default paths. `AppConfig` is the root configuration
//! struct containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Routing
// =============================================================================

/// Path prefix under which manifests are served
pub const MANIFEST_ROUTE_PREFIX: &str = "/pwa/v1";

/// Manifest route with the site identifier captured as `id`
pub const MANIFEST_ROUTE: &str = formatcp!("{}/{{id}}", MANIFEST_ROUTE_PREFIX);

/// Same route with a trailing slash, accepted for compatibility with non-strict matchers
pub const MANIFEST_ROUTE_TRAILING: &str = formatcp!("{}/{{id}}/", MANIFEST_ROUTE_PREFIX);

/// Liveness check route
pub const HEALTH_ROUTE: &str = "/health";

// =============================================================================
// Document Store
// =============================================================================

/// Environment variable holding the document store connection string
pub const MONGO_URL_ENV: &str = "MONGO_URL";

/// Collection holding the live settings documents
pub const SETTINGS_COLLECTION: &str = "settings-live";

/// Collection holding one document per site
pub const SITES_COLLECTION: &str = "sites";

// =============================================================================
// Cache Tag
// =============================================================================

/// Response header carrying the cache tag
pub const CACHE_TAG_HEADER: &str = "cache-tag";

/// Number of hash characters kept for the tag
pub const CACHE_TAG_LEN: usize = 3;

/// Upper bound accepted by downstream caches for a single tag
pub const CACHE_TAG_MAX_LEN: usize = 128;

// =============================================================================
// Manifest
// =============================================================================

/// Icon edge lengths in pixels, largest first
pub const ICON_SIZES: [u32; 11] = [1024, 512, 256, 192, 152, 144, 128, 96, 72, 48, 36];

/// Query parameter prefix selecting the resized icon profile
pub const ICON_PROFILE_PREFIX: &str = "android-icon-";

pub const ICON_MIME_TYPE: &str = "image/png";
pub const MANIFEST_BACKGROUND_COLOR: &str = "#FFF";
pub const MANIFEST_DIR: &str = "auto";
pub const MANIFEST_DISPLAY: &str = "standalone";
pub const MANIFEST_ORIENTATION: &str = "portrait";
pub const MANIFEST_LANG: &str = "es";

// =============================================================================
// Server
// =============================================================================

/// Seconds to wait for in-flight requests on shutdown
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "pwa_manifest=debug,mongodb=warn";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Document store connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// Document store connection settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string. Overridden by `MONGO_URL` when that is set.
    pub url: Option<String>,
    /// Database name, used when the connection string does not name one
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// Replace the configured URL with an override when one is present and non-empty
    pub fn apply_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.url = Some(url);
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, applying the `MONGO_URL` override.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents, std::env::var(MONGO_URL_ENV).ok())
    }

    /// Parse and validate configuration text with an explicit URL override.
    pub fn from_toml(contents: &str, url_override: Option<String>) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(contents)?;
        config.database.apply_url_override(url_override);

        if config.database.url.as_deref().unwrap_or_default().trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "No database URL configured. Set [database] url or the {} environment variable",
                MONGO_URL_ENV
            )));
        }

        match config.logging.format.to_ascii_lowercase().as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Unknown logging.format '{}', expected \"text\" or \"json\"",
                    other
                )))
            }
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
