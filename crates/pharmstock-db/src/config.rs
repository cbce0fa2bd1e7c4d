//! # Ledger Configuration
//!
//! File and environment configuration for the database, stock thresholds
//! and the sale retry budget.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PHARMSTOCK_DB_PATH=/data/shop.db                                   │
//! │     PHARMSTOCK_LOW_THRESHOLD=20                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pharmstock/pharmstock.toml (Linux)                       │
//! │     ~/Library/Application Support/com.pharmstock.pharmstock/...      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     low 10, critical 5, expiry window 30 days, 3 sale attempts         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-account values stored in `account_settings` take precedence over
//! `[stock]` and `[account]` for that account; these are the fallback.
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "pharmstock.db"
//! max_connections = 5
//!
//! [stock]
//! low_threshold = 10
//! critical_threshold = 5
//! expiry_alert_days = 30
//!
//! [sales]
//! max_attempts = 3
//!
//! [account]
//! id = "00000000-0000-0000-0000-000000000001"
//! currency_symbol = "₹"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;
use pharmstock_core::{
    AccountSettings, StockThresholds, DEFAULT_ACCOUNT_ID, DEFAULT_CRITICAL_STOCK_THRESHOLD,
    DEFAULT_EXPIRY_ALERT_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
};

// =============================================================================
// Database Section
// =============================================================================

/// Where the ledger lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Relative paths resolve against the working directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("pharmstock.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Stock Section
// =============================================================================

/// Classification thresholds in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSettings {
    #[serde(default = "default_low_threshold")]
    pub low_threshold: i64,

    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: i64,

    /// Days ahead an upcoming expiry raises an alert.
    #[serde(default = "default_expiry_alert_days")]
    pub expiry_alert_days: i64,
}

fn default_low_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_critical_threshold() -> i64 {
    DEFAULT_CRITICAL_STOCK_THRESHOLD
}

fn default_expiry_alert_days() -> i64 {
    DEFAULT_EXPIRY_ALERT_DAYS
}

impl Default for StockSettings {
    fn default() -> Self {
        StockSettings {
            low_threshold: default_low_threshold(),
            critical_threshold: default_critical_threshold(),
            expiry_alert_days: default_expiry_alert_days(),
        }
    }
}

// =============================================================================
// Sales Section
// =============================================================================

/// Sale path behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSettings {
    /// Total attempts `sell_with_retry` makes on version conflicts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for SalesSettings {
    fn default() -> Self {
        SalesSettings {
            max_attempts: default_max_attempts(),
        }
    }
}

// =============================================================================
// Account Section
// =============================================================================

/// Default account for single-shop installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSection {
    #[serde(default = "default_account_id")]
    pub id: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_account_id() -> String {
    DEFAULT_ACCOUNT_ID.to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for AccountSection {
    fn default() -> Self {
        AccountSection {
            id: default_account_id(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete ledger configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub stock: StockSettings,

    #[serde(default)]
    pub sales: SalesSettings,

    #[serde(default)]
    pub account: AccountSection,
}

impl LedgerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`pharmstock.toml`)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that doesn't exist is an error; a missing
    /// file at the default location is not.
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                info!(?path, "Loading ledger config from file");
                config = Self::from_file(&path)?;
            }
            None => {
                if let Some(path) = Self::default_config_path() {
                    if path.exists() {
                        info!(?path, "Loading ledger config from file");
                        config = Self::from_file(&path)?;
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load ledger config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &std::path::Path) -> DbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> DbResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DbError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| DbError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;

        info!(?path, "Ledger config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DbResult<()> {
        if self.database.max_connections == 0 {
            return Err(DbError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.stock.low_threshold < 0 || self.stock.critical_threshold < 0 {
            return Err(DbError::Config(
                "stock thresholds must not be negative".into(),
            ));
        }

        if self.stock.critical_threshold > self.stock.low_threshold {
            // Accepted: the low band is simply empty
            warn!(
                low = self.stock.low_threshold,
                critical = self.stock.critical_threshold,
                "Critical threshold is above low threshold"
            );
        }

        if self.stock.expiry_alert_days < 0 {
            return Err(DbError::Config(
                "stock.expiry_alert_days must not be negative".into(),
            ));
        }

        if self.sales.max_attempts == 0 {
            return Err(DbError::Config(
                "sales.max_attempts must be greater than 0".into(),
            ));
        }

        if self.account.id.trim().is_empty() {
            return Err(DbError::Config("account.id must not be empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `PHARMSTOCK_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PHARMSTOCK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("PHARMSTOCK_DB_MAX_CONNECTIONS") {
            match value.parse() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMSTOCK_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(value) = lookup("PHARMSTOCK_LOW_THRESHOLD") {
            match value.parse() {
                Ok(n) => self.stock.low_threshold = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMSTOCK_LOW_THRESHOLD"),
            }
        }

        if let Some(value) = lookup("PHARMSTOCK_CRITICAL_THRESHOLD") {
            match value.parse() {
                Ok(n) => self.stock.critical_threshold = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMSTOCK_CRITICAL_THRESHOLD"),
            }
        }

        if let Some(value) = lookup("PHARMSTOCK_EXPIRY_ALERT_DAYS") {
            match value.parse() {
                Ok(n) => self.stock.expiry_alert_days = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMSTOCK_EXPIRY_ALERT_DAYS"),
            }
        }

        if let Some(value) = lookup("PHARMSTOCK_SALE_MAX_ATTEMPTS") {
            match value.parse() {
                Ok(n) => self.sales.max_attempts = n,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMSTOCK_SALE_MAX_ATTEMPTS"),
            }
        }

        if let Some(id) = lookup("PHARMSTOCK_ACCOUNT_ID") {
            self.account.id = id;
        }

        if let Some(symbol) = lookup("PHARMSTOCK_CURRENCY_SYMBOL") {
            self.account.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pharmstock", "pharmstock")
            .map(|dirs| dirs.config_dir().join("pharmstock.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    /// Thresholds for accounts without stored settings.
    pub fn thresholds(&self) -> StockThresholds {
        StockThresholds::new(self.stock.low_threshold, self.stock.critical_threshold)
    }

    /// Settings used when `account_id` has no stored row.
    pub fn account_defaults(&self, account_id: &str) -> AccountSettings {
        AccountSettings {
            low_stock_threshold: self.stock.low_threshold,
            critical_stock_threshold: self.stock.critical_threshold,
            expiry_alert_days: self.stock.expiry_alert_days,
            currency_symbol: self.account.currency_symbol.clone(),
            ..AccountSettings::defaults_for(account_id)
        }
    }
}
