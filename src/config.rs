//! Configuration file parser for ~/.config/memefeed/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::MockLatency;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Simulated latency of the in-memory API, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub fetch_ms: u64,
    pub lookup_ms: u64,
    pub leaderboard_ms: u64,
    pub upload_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        let d = MockLatency::default();
        Self {
            fetch_ms: d.fetch.as_millis() as u64,
            lookup_ms: d.lookup.as_millis() as u64,
            leaderboard_ms: d.leaderboard.as_millis() as u64,
            upload_ms: d.upload.as_millis() as u64,
        }
    }
}

impl LatencyConfig {
    pub fn to_latency(&self) -> MockLatency {
        MockLatency {
            fetch: Duration::from_millis(self.fetch_ms),
            lookup: Duration::from_millis(self.lookup_ms),
            leaderboard: Duration::from_millis(self.leaderboard_ms),
            upload: Duration::from_millis(self.upload_ms),
        }
    }
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period before search input is applied.
    pub debounce_ms: u64,

    /// Memes per feed page.
    pub page_size: u32,

    /// JSON catalog to serve instead of the built-in one.
    pub catalog_path: Option<PathBuf>,

    /// SQLite file for likes/saves. Unset keeps reactions in memory.
    pub database_path: Option<PathBuf>,

    pub latency: LatencyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            page_size: crate::feed::DEFAULT_PAGE_SIZE,
            catalog_path: None,
            database_path: None,
            latency: LatencyConfig::default(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "debounce_ms",
        "page_size",
        "catalog_path",
        "database_path",
        "latency",
    ];

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - `page_size = 0` → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        if config.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        tracing::info!(
            path = %path.display(),
            debounce_ms = config.debounce_ms,
            page_size = config.page_size,
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.page_size, 9);
        assert!(config.catalog_path.is_none());
        assert!(config.database_path.is_none());
        assert_eq!(config.latency.fetch_ms, 1000);
        assert_eq!(config.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/memefeed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("memefeed_config_test_whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("memefeed_config_test_partial", "page_size = 12\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.debounce_ms, 500);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
debounce_ms = 250
page_size = 6
catalog_path = "/srv/memes.json"
database_path = "/var/lib/memefeed/reactions.db"

[latency]
fetch_ms = 10
upload_ms = 20
"#;
        let (dir, path) = write_config("memefeed_config_test_full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.page_size, 6);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/srv/memes.json")));
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/memefeed/reactions.db"))
        );

        let latency = config.latency.to_latency();
        assert_eq!(latency.fetch, Duration::from_millis(10));
        assert_eq!(latency.upload, Duration::from_millis(20));
        assert_eq!(latency.lookup, Duration::from_millis(500)); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("memefeed_config_test_invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config(
            "memefeed_config_test_unknown",
            "page_size = 9\ntotally_fake_key = \"x\"\n",
        );
        assert_eq!(Config::load(&path).unwrap().page_size, 9);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("memefeed_config_test_wrongtype", "debounce_ms = \"fast\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let (dir, path) = write_config("memefeed_config_test_zero_page", "page_size = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("memefeed_config_test_too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
