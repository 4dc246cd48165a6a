//! Server configuration
//!
//! Sources, lowest priority first: built-in defaults, an optional
//! `ruledesk.toml`, then `RULEDESK_*` environment variables (a `.env` file
//! is loaded into the environment first when present).

use config::{Config, ConfigError, Environment, File};
use ruledesk_core::lifecycle::DEFAULT_TEMPLATE;
use ruledesk_core::logging_facility::Profile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:7070";
pub const DEFAULT_DB_PATH: &str = ".ruledesk/rules.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
pub const CONFIG_FILE: &str = "ruledesk";
pub const ENV_PREFIX: &str = "RULEDESK";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    pub bind: String,
    pub db_path: PathBuf,
    pub log_profile: String,
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

impl ApiConfig {
    /// Load from `ruledesk.toml` in the working directory and the environment
    ///
    /// # Errors
    ///
    /// Malformed config file or values of the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::build(File::with_name(CONFIG_FILE).required(false), true)
    }

    /// Load from a specific file, ignoring the environment
    ///
    /// # Errors
    ///
    /// Missing or malformed file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path), false)
    }

    fn build<S>(file: S, with_env: bool) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder()
            .set_default("bind", DEFAULT_BIND)?
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("log_profile", "development")?
            .set_default("busy_timeout_ms", DEFAULT_BUSY_TIMEOUT_MS as i64)?
            .add_source(file);
        if with_env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        }
        builder.build()?.try_deserialize()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// # Errors
    ///
    /// Unknown profile name.
    pub fn profile(&self) -> Result<Profile, String> {
        self.log_profile.parse()
    }

    /// Template served for new rules
    ///
    /// # Errors
    ///
    /// `template_path` is set but unreadable.
    pub fn template(&self) -> std::io::Result<String> {
        match &self.template_path {
            Some(path) => std::fs::read_to_string(path),
            None => Ok(DEFAULT_TEMPLATE.to_string()),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_profile: "development".to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            template_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ruledesk.toml");
        fs::write(&path, "bind = \"0.0.0.0:9000\"\nbusy_timeout_ms = 250\n").unwrap();

        let config = ApiConfig::from_file(&path).unwrap();

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.profile().unwrap(), Profile::Development);
        assert!(config.template_path.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(ApiConfig::from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_template_override() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.yaml");
        fs::write(&template, "Core:\n  Status: Draft\n").unwrap();

        let config = ApiConfig {
            template_path: Some(template),
            ..ApiConfig::default()
        };
        assert_eq!(config.template().unwrap(), "Core:\n  Status: Draft\n");
        assert_eq!(ApiConfig::default().template().unwrap(), DEFAULT_TEMPLATE);
    }
}
