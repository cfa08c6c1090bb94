//! # Client Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_API_BASE_URL=https://shop.example.com/                  │
//! │     STOREFRONT_SEARCH_DEBOUNCE_MS=250                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.client/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://192.168.119.1:3000/"
//! images_base_url = "http://192.168.119.1:3000/"
//!
//! [search]
//! debounce_ms = 300
//!
//! [storage]
//! database_path = "/var/lib/storefront/storefront.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};
use storefront_core::DEFAULT_SEARCH_DEBOUNCE_MS;

pub const CONFIG_FILE_NAME: &str = "storefront.toml";
pub const DATABASE_FILE_NAME: &str = "storefront.db";

// =============================================================================
// API Settings
// =============================================================================

/// Where the shop backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the REST API. Endpoint paths (`api/products`, `recs/similar`)
    /// are joined onto it, so it should end with `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root that product `image_path` values are relative to.
    #[serde(default = "default_base_url")]
    pub images_base_url: String,
}

fn default_base_url() -> String {
    "http://192.168.119.1:3000/".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            images_base_url: default_base_url(),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke or filter change.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce_ms(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Preference database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        validate_http_url("api.base_url", &self.api.base_url)?;
        validate_http_url("api.images_base_url", &self.api.images_base_url)?;

        if self.search.debounce_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "search.debounce_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("STOREFRONT_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Ok(url) = std::env::var("STOREFRONT_IMAGES_BASE_URL") {
            self.api.images_base_url = url;
        }

        if let Ok(ms) = std::env::var("STOREFRONT_SEARCH_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.search.debounce_ms = v,
                Err(_) => warn!(value = %ms, "Ignoring invalid STOREFRONT_SEARCH_DEBOUNCE_MS"),
            }
        }

        if let Ok(path) = std::env::var("STOREFRONT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed API base URL, normalised to end with `/`.
    pub fn api_base_url(&self) -> ClientResult<Url> {
        parse_base_url(&self.api.base_url)
    }

    pub fn images_base_url(&self) -> ClientResult<Url> {
        parse_base_url(&self.api.images_base_url)
    }

    /// Absolute URL of a product or category image.
    pub fn image_url(&self, image_path: &str) -> ClientResult<Url> {
        Ok(self
            .images_base_url()?
            .join(image_path.trim_start_matches('/'))?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Configured database path, or `<data dir>/storefront.db`.
    pub fn database_path(&self) -> ClientResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .ok_or_else(|| ClientError::InvalidConfig("No data directory available".into()))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "storefront", "client")
}

fn validate_http_url(field: &str, raw: &str) -> ClientResult<()> {
    let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", field, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ClientError::InvalidUrl(format!(
            "{} must start with http:// or https://, got: {}",
            field, raw
        )));
    }
    Ok(())
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn parse_base_url(raw: &str) -> ClientResult<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{}/", raw))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://192.168.119.1:3000/");
        assert_eq!(config.search.debounce_ms, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ftp://shop.example.com/".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://shop.example.com/".to_string();
        assert!(config.validate().is_ok());

        config.search.debounce_ms = 0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://shop.example.com/v2".to_string();
        let url = config.api_base_url().unwrap();
        assert_eq!(
            url.join("api/products").unwrap().as_str(),
            "https://shop.example.com/v2/api/products"
        );
    }

    #[test]
    fn test_image_url_is_relative_to_images_base() {
        let mut config = ClientConfig::default();
        config.api.images_base_url = "https://cdn.example.com/media".to_string();
        assert_eq!(
            config.image_url("/products/p1.jpg").unwrap().as_str(),
            "https://cdn.example.com/media/products/p1.jpg"
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str("[search]\ndebounce_ms = 150\n").unwrap();
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.api.base_url, default_base_url());
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[search]"));
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let mut config = ClientConfig::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
    }
}
