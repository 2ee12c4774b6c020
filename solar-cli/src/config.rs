//! `solar-quote.toml` settings.
//!
//! Every field has a default, so an empty or missing file is valid. The file
//! is looked up in this order: `--config`, `SOLAR_QUOTE_CONFIG`, then
//! `solar-quote.toml` in the working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use solar_api::financial::DEFAULT_CALC_BASE_URL;
use solar_api::identity::DEFAULT_IDENTITY_ENDPOINT;
use solar_api::sizing::DEFAULT_SIZING_BASE_URL;
use solar_api::DEFAULT_MAX_BILL_BYTES;
use solar_core::db::DbConfig;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "solar-quote.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub identity: IdentityConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub calc_base_url: String,
    pub sizing_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            calc_base_url: DEFAULT_CALC_BASE_URL.to_string(),
            sizing_base_url: DEFAULT_SIZING_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Web API key of the identity project. Sign-in fails without it.
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "quotes.db".to_string(),
        }
    }
}

impl From<&DatabaseConfig> for DbConfig {
    fn from(config: &DatabaseConfig) -> Self {
        DbConfig {
            backend: config.backend.clone(),
            connection_string: config.connection_string.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub max_bill_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bill_bytes: DEFAULT_MAX_BILL_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateConfig {
    /// Where the signed-in session and the anonymous visitor id are kept.
    pub dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".solar-quote"),
        }
    }
}

impl AppConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Loads the configuration.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read configuration '{}'", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("in configuration '{}'", path.display()))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = AppConfig::parse(
            r#"
            [api]
            sizing_base_url = "https://sizing.example.com"
            timeout_secs = 5

            [identity]
            api_key = "test-key"

            [database]
            connection_string = ":memory:"

            [upload]
            max_bill_bytes = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.api.sizing_base_url, "https://sizing.example.com");
        assert_eq!(config.api.calc_base_url, DEFAULT_CALC_BASE_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.identity.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.identity.endpoint, DEFAULT_IDENTITY_ENDPOINT);
        assert_eq!(
            DbConfig::from(&config.database),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: ":memory:".to_string(),
            }
        );
        assert_eq!(config.upload.max_bill_bytes, 1024);
        assert_eq!(config.state.dir, PathBuf::from(".solar-quote"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::parse("[api]\ncalc_url = \"x\"\n").is_err());
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let api = ApiConfig {
            timeout_secs: 0,
            ..ApiConfig::default()
        };
        assert_eq!(api.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[state]\ndir = \"/tmp/solar\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.state.dir, PathBuf::from("/tmp/solar"));
    }
}
