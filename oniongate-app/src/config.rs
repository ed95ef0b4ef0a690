//! Application configuration loaded from TOML.
//!
//! ```toml
//! database_path = "data/oniongate.db"
//! zone_dir = "zones"
//! template_dir = "templates"
//! secret_key = "change-me"
//!
//! [resolver]
//! subdomain_host = "oniongate.com"
//! use_alias_records = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use oniongate_core::config::ResolverConfig;
use oniongate_core::error::{CoreError, CoreResult};

/// Environment variable overriding `secret_key`.
pub const SECRET_KEY_ENV: &str = "ONIONGATE_SECRET_KEY";

/// Settings for the application frontends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `SQLite` registry file (created if missing).
    pub database_path: PathBuf,
    /// Directory generated zone files are written to.
    pub zone_dir: PathBuf,
    /// Directory holding `base_zone.j2` and per-zone overrides.
    pub template_dir: PathBuf,
    /// Key signing ownership tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    pub resolver: ResolverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/oniongate.db"),
            zone_dir: PathBuf::from("zones"),
            template_dir: PathBuf::from("templates"),
            secret_key: None,
            resolver: ResolverConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from a TOML file, falling back to defaults when it does not exist.
    ///
    /// `ONIONGATE_SECRET_KEY` takes precedence over the file's `secret_key`.
    ///
    /// # Errors
    /// Returns `CoreError::ConfigError` for unreadable or invalid files, an invalid
    /// `[resolver]` table, or when no secret key is available.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                CoreError::ConfigError(format!("Failed to read {}: {e}", path.display()))
            })?;
            Self::from_toml_str(&content)?
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        let config = config.with_secret_override(std::env::var(SECRET_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text without consulting the environment.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// Replace the secret key when an override is present and non-empty.
    #[must_use]
    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.secret_key = Some(secret);
        }
        self
    }

    /// The configured secret key.
    pub fn secret_key(&self) -> CoreResult<&str> {
        self.secret_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CoreError::ConfigError(format!(
                    "secret_key is not configured (set it in the config file or {SECRET_KEY_ENV})"
                ))
            })
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.secret_key()?;
        self.resolver.validate()
    }
}
