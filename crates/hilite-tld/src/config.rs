//! Highlighter configuration and the JSON file it lives in.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hilite_core::PATTERN_KEY;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::IANA_TLD_URL;

/// Settings for the highlighter service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Where the TLD list is fetched from.
    pub tld_url: String,
    /// Backing file of the persistent key-value store.
    pub store_path: PathBuf,
    /// Store key the composite pattern source is saved under.
    pub pattern_key: String,
    pub fetch_timeout_secs: u64,
    pub fetch_retries: u32,
    pub retry_backoff_ms: u64,
    /// Quiet period before change notifications are delivered.
    pub notify_debounce_ms: u64,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            tld_url: IANA_TLD_URL.to_owned(),
            store_path: data_dir().join("store.json"),
            pattern_key: PATTERN_KEY.to_owned(),
            fetch_timeout_secs: 10,
            fetch_retries: 3,
            retry_backoff_ms: 500,
            notify_debounce_ms: 150,
        }
    }
}

impl HighlighterConfig {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, ConfigError> {
        loader.load().await
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), ConfigError> {
        saver.save(self).await
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn notify_debounce(&self) -> Duration {
        Duration::from_millis(self.notify_debounce_ms)
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    fn load(&self) -> impl Future<Output = Result<HighlighterConfig, ConfigError>> + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    fn save(&self, config: &HighlighterConfig)
    -> impl Future<Output = Result<(), ConfigError>> + Send;
}

/// A JSON configuration file.
///
/// A missing file loads as the default configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new(config_dir().join("config.json"))
    }
}

impl Loader for ConfigFile {
    async fn load(&self) -> Result<HighlighterConfig, ConfigError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(file) => Ok(serde_json::from_str(&file)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(HighlighterConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Saver for ConfigFile {
    async fn save(&self, config: &HighlighterConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(config)?).await?;
        Ok(())
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("./"))
        .join("hilite")
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("./"))
        .join("hilite")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str) -> ConfigFile {
        ConfigFile::new(
            std::env::temp_dir()
                .join(format!("hilite-config-{}-{name}", std::process::id()))
                .join("config.json"),
        )
    }

    #[tokio::test]
    async fn test_missing_file_loads_defaults() {
        let config = HighlighterConfig::load(&temp_config("missing")).await.unwrap();
        assert_eq!(config, HighlighterConfig::default());
        assert_eq!(config.pattern_key, PATTERN_KEY);
        assert_eq!(config.notify_debounce(), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let file = temp_config("roundtrip");
        let config = HighlighterConfig {
            tld_url: "http://localhost/tlds.txt".to_owned(),
            fetch_retries: 5,
            ..Default::default()
        };
        config.save(&file).await.unwrap();

        assert_eq!(HighlighterConfig::load(&file).await.unwrap(), config);
        std::fs::remove_dir_all(file.path().parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let file = temp_config("partial");
        std::fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        std::fs::write(file.path(), r#"{ "fetch_timeout_secs": 3 }"#).unwrap();

        let config = HighlighterConfig::load(&file).await.unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(config.fetch_retries, 3);
        std::fs::remove_dir_all(file.path().parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_invalid_file_is_parse_error() {
        let file = temp_config("invalid");
        std::fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        std::fs::write(file.path(), "not json").unwrap();

        let err = HighlighterConfig::load(&file).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        std::fs::remove_dir_all(file.path().parent().unwrap()).unwrap();
    }
}
