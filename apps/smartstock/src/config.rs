//! # Application Configuration
//!
//! Settings for the inventory service and the `smartstock` binary.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SMARTSTOCK_DB_PATH=/var/lib/smartstock/stock.db                    │
//! │     SMARTSTOCK_ACTOR=alice                                             │
//! │     SMARTSTOCK_UNDO_WINDOW_SECS=10                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/smartstock/smartstock.toml (Linux)                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "smartstock.db"
//! max_connections = 5
//!
//! [ledger]
//! default_actor = "system"
//! undo_window_secs = 5
//!
//! [notifications]
//! enabled = true
//! channel_capacity = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file. Relative paths resolve against the working directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "smartstock", "smartstock")
        .map(|dirs| dirs.data_dir().join("smartstock.db"))
        .unwrap_or_else(|| PathBuf::from("smartstock.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[ledger]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    /// Actor recorded when the caller does not name one (CLI seeding).
    #[serde(default = "default_actor")]
    pub default_actor: String,

    /// How long a deleted product can be brought back with undo.
    #[serde(default = "default_undo_window_secs")]
    pub undo_window_secs: u64,
}

fn default_actor() -> String {
    "system".to_string()
}

fn default_undo_window_secs() -> u64 {
    5
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            default_actor: default_actor(),
            undo_window_secs: default_undo_window_secs(),
        }
    }
}

/// `[notifications]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Queue depth between the service and the dispatcher task.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_capacity: default_channel_capacity(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub ledger: LedgerSection,

    #[serde(default)]
    pub notifications: NotificationSection,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (smartstock.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
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
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.ledger.default_actor.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ledger.default_actor must not be empty".into(),
            ));
        }

        if self.notifications.enabled && self.notifications.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notifications.channel_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SMARTSTOCK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(actor) = std::env::var("SMARTSTOCK_ACTOR") {
            debug!(actor = %actor, "Overriding default actor from environment");
            self.ledger.default_actor = actor;
        }

        if let Ok(secs) = std::env::var("SMARTSTOCK_UNDO_WINDOW_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => {
                    debug!(secs = s, "Overriding undo window from environment");
                    self.ledger.undo_window_secs = s;
                }
                Err(_) => warn!(value = %secs, "Ignoring malformed SMARTSTOCK_UNDO_WINDOW_SECS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "smartstock", "smartstock")
            .map(|dirs| dirs.config_dir().join("smartstock.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn undo_window(&self) -> Duration {
        Duration::from_secs(self.ledger.undo_window_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.ledger.default_actor, "system");
        assert_eq!(config.undo_window(), Duration::from_secs(5));
        assert!(config.notifications.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_connections() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_blank_actor() {
        let mut config = AppConfig::default();
        config.ledger.default_actor = "   ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_allowed_when_disabled() {
        let mut config = AppConfig::default();
        config.notifications.channel_capacity = 0;
        assert!(config.validate().is_err());

        config.notifications.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [ledger]
            undo_window_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.undo_window_secs, 30);
        assert_eq!(config.ledger.default_actor, "system");
        assert_eq!(config.notifications.channel_capacity, 256);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = AppConfig::default();
        config.database.path = PathBuf::from("/tmp/stock.db");

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[ledger]"));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.database.path, PathBuf::from("/tmp/stock.db"));
    }

    #[test]
    fn test_load_reads_explicit_file() {
        let dir = std::env::temp_dir().join(format!("smartstock-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("smartstock.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"custom.db\"\nmax_connections = 2\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.database.max_connections, 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
