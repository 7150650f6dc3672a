//! Configuration management for ReadOne.
//!
//! Configuration is read from `~/.config/readone/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::DEFAULT_FULL_TEXT_PROXY;
use crate::fetcher::parallel::DEFAULT_WORKERS;
use crate::normalizer::DEFAULT_FAVICON_PROVIDER;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub full_text: FullTextConfig,
    pub icons: IconConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum feeds fetched at once during a batch refresh
    pub workers: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            workers: DEFAULT_WORKERS,
            user_agent: concat!("readone/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FullTextConfig {
    /// Prefix the source URL is appended to when full-text mode is on
    pub proxy_base: String,
}

impl Default for FullTextConfig {
    fn default() -> Self {
        Self {
            proxy_base: DEFAULT_FULL_TEXT_PROXY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub favicon_provider: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            favicon_provider: DEFAULT_FAVICON_PROVIDER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/readone/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("readone").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# ReadOne Configuration

[fetch]
# Seconds before a feed request is abandoned
timeout_secs = 30

# Feeds fetched concurrently by `readone refresh`
workers = 10

user_agent = "readone/0.1.0"

[full_text]
# Feeds with full-text mode enabled are fetched from this prefix followed by
# the feed URL, e.g. https://feedex.net/feed/https://example.com/rss
proxy_base = "https://feedex.net/feed/"

[icons]
# Used when a feed has no icon of its own:
# https://<favicon_provider>/favicons?domain=<host>&size=128
favicon_provider = "www.google.com/s2"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.workers, 10);
        assert_eq!(config.full_text.proxy_base, DEFAULT_FULL_TEXT_PROXY);
        assert_eq!(config.icons.favicon_provider, DEFAULT_FAVICON_PROVIDER);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[fetch]
timeout_secs = 5
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.workers, DEFAULT_WORKERS);
        assert_eq!(config.full_text.proxy_base, DEFAULT_FULL_TEXT_PROXY);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.icons.favicon_provider, DEFAULT_FAVICON_PROVIDER);
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readone").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.fetch.workers, DEFAULT_WORKERS);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[fetch]\ntimeout_secs = \"soon\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
