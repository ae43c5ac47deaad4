//! # Cart Configuration
//!
//! Where the cart lives on disk and which key it uses.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`cart.toml`)
//!    - `~/.config/gomarketplace/cart.toml` (Linux)
//!    - `~/Library/Application Support/com.gomarketplace.cart/cart.toml` (macOS)
//! 3. Environment variables (`MARKET_*`)
//!
//! ## Example Config File
//! ```toml
//! storage_key = "@GoMarketplace:products"
//! database_path = "/var/lib/gomarketplace/market.db"
//! max_connections = 2
//! connect_timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use market_core::CART_STORAGE_KEY;
use market_db::DbConfig;

use crate::error::{CartError, CartResult};

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Key the snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// SQLite file backing the key-value store.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Pool size. The cart needs one reader and one writer.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "gomarketplace", "cart")
        .map(|dirs| dirs.data_dir().join("market.db"))
        .unwrap_or_else(|| PathBuf::from("market.db"))
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for CartConfig {
    fn default() -> Self {
        CartConfig {
            storage_key: default_storage_key(),
            database_path: default_database_path(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
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
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(CartError::Config("storage_key must not be empty".into()));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(CartError::Config("database_path must not be empty".into()));
        }

        if self.max_connections == 0 {
            return Err(CartError::Config("max_connections must be at least 1".into()));
        }

        Ok(())
    }

    /// Database settings derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    /// Applies environment variable overrides.
    ///
    /// - `MARKET_CART_KEY`: storage key
    /// - `MARKET_DB_PATH`: database file
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("MARKET_CART_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage_key = key;
        }

        if let Ok(path) = std::env::var("MARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarketplace", "cart")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }
}
