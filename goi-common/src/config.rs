//! Configuration loading and resolution
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. `GOI_CONFIG` environment variable
//! 3. Platform config directory (`<config dir>/goi/config.toml`)
//!
//! A missing or partial config file never terminates the process: absent
//! values fall back to compiled defaults with a warning.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// AnkiConnect endpoint used when the config file does not name one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8765/";

/// Minimum delay between AnkiConnect requests, in milliseconds.
///
/// The endpoint is local, so this is courtesy pacing rather than a hard
/// API quota.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 100;

const DEFAULT_MAIN_DECK: &str = "Vocabulary";
const DEFAULT_CURATED_DECK: &str = "Data::Core 6K";
const DEFAULT_SCRAPER_DECK: &str = "Data::Yomichan";

/// Tool configuration, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoiConfig {
    /// AnkiConnect endpoint URL.
    pub endpoint: String,
    /// Deck that receives the synchronized cards.
    pub main_deck: String,
    /// Curated vocabulary deck (audio, frequency ordering, example sentences).
    pub curated_deck: String,
    /// Dictionary-scraper deck (glossary markup, tags, furigana).
    pub scraper_deck: String,
    /// Directory holding the kanji bank JSON dumps.
    pub data_dir: PathBuf,
    /// Minimum delay between AnkiConnect requests, milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for GoiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            main_deck: DEFAULT_MAIN_DECK.to_string(),
            curated_deck: DEFAULT_CURATED_DECK.to_string(),
            scraper_deck: DEFAULT_SCRAPER_DECK.to_string(),
            data_dir: default_data_dir(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
        }
    }
}

impl GoiConfig {
    /// Load configuration following the priority order above.
    ///
    /// `cli_arg` is the `--config` path if the user passed one. An explicit
    /// path that does not exist is reported as an error; an implicit path
    /// (env var or platform default) that does not exist degrades to
    /// compiled defaults.
    pub fn load(cli_arg: Option<&Path>) -> crate::Result<Self> {
        if let Some(path) = cli_arg {
            if !path.exists() {
                return Err(crate::Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var("GOI_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::from_file(&path);
            }
            tracing::warn!(path = %path.display(), "GOI_CONFIG points at a missing file, using defaults");
            return Ok(Self::default());
        }

        if let Some(path) = platform_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        tracing::warn!("no config file found, using compiled defaults");
        Ok(Self::default())
    }

    /// Parse a TOML config file. Unknown keys are ignored; missing keys
    /// take their compiled defaults.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GoiConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Platform config file path: `<config dir>/goi/config.toml`.
fn platform_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("goi").join("config.toml"))
}

/// Default data directory: `<local data dir>/goi`.
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("goi"))
        .unwrap_or_else(|| PathBuf::from("./goi_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let config = GoiConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.main_deck, "Vocabulary");
        assert_eq!(config.rate_limit_ms, DEFAULT_RATE_LIMIT_MS);
        assert!(!config.data_dir.as_os_str().is_empty());
    }

    #[test]
    fn partial_file_fills_with_defaults() {
        let config: GoiConfig = toml::from_str("main_deck = \"Mining\"").unwrap();
        assert_eq!(config.main_deck, "Mining");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.scraper_deck, "Data::Yomichan");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = GoiConfig::load(Some(Path::new("/nonexistent/goi.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "endpoint = \"http://127.0.0.1:8765/\"\nrate_limit_ms = 250\n",
        )
        .unwrap();

        let config = GoiConfig::load(Some(&path)).unwrap();
        assert_eq!(config.rate_limit_ms, 250);
        assert_eq!(config.main_deck, "Vocabulary");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "endpoint = [not toml").unwrap();

        match GoiConfig::load(Some(&path)) {
            Err(crate::Error::Config(_)) => {}
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }
}
