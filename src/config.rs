use crate::algorithms::{DefaultPosition, LocatorConfig, SimilarityModel};
use crate::matching::{ComplexNameRegistry, MatcherConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_DATABASE_PATH: &str = "data/fingerprints.json";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub storage: Option<StorageSection>,
    #[serde(default)]
    pub positioning: Option<PositioningSection>,
    #[serde(default)]
    pub matching: Option<MatchingSection>,
    #[serde(default)]
    pub directory: Option<DirectorySection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSection {
    /// Fingerprint database JSON file
    pub database_path: Option<PathBuf>,
    /// Static location directory JSON file
    pub directory_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PositioningSection {
    pub min_rssi_dbm: Option<i32>,
    pub min_similarity: Option<f64>,
    pub rssi_tolerance_db: Option<f64>,
    /// Polling interval in seconds for continuous positioning (default: 5)
    pub poll_interval_secs: Option<u64>,
    pub default_position: Option<DefaultPosition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingSection {
    #[serde(flatten)]
    pub thresholds: MatcherConfig,
    /// Registered complex names and their spoken variations
    #[serde(default)]
    pub complex_names: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirectorySection {
    /// Number of generated numbered rooms (0 disables)
    pub room_numbers: Option<usize>,
    /// Room id prefix for generated rooms, e.g. "04.2"
    pub room_prefix: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Rejects values that would make positioning or matching meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let locator = self.locator_config();
        locator
            .model
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("[positioning] {}", e)))?;
        if !(0.0..=1.0).contains(&locator.min_similarity) {
            return Err(ConfigError::Invalid(format!(
                "[positioning] min_similarity must be within 0..=1, got {}",
                locator.min_similarity
            )));
        }
        if self.poll_interval().is_zero() {
            return Err(ConfigError::Invalid(
                "[positioning] poll_interval_secs must be at least 1".to_string(),
            ));
        }

        let matcher = self.matcher_config();
        if !(0.0..=1.0).contains(&matcher.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "[matching] min_confidence must be within 0..=1, got {}",
                matcher.min_confidence
            )));
        }
        if matcher.long_word_boost < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "[matching] long_word_boost must be at least 1.0, got {}",
                matcher.long_word_boost
            )));
        }
        Ok(())
    }

    pub fn database_path(&self) -> &Path {
        self.storage
            .as_ref()
            .and_then(|s| s.database_path.as_deref())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(DEFAULT_DATABASE_PATH))
    }

    /// Returns the directory file, or None if not configured.
    pub fn directory_path(&self) -> Option<&Path> {
        let path = self.storage.as_ref()?.directory_path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    /// Locator settings with defaults for everything not configured.
    pub fn locator_config(&self) -> LocatorConfig {
        let mut config = LocatorConfig::default();
        let Some(section) = &self.positioning else {
            return config;
        };
        if let Some(min_rssi) = section.min_rssi_dbm {
            config.min_rssi_dbm = min_rssi;
        }
        if let Some(min_similarity) = section.min_similarity {
            config.min_similarity = min_similarity;
        }
        if let Some(tolerance) = section.rssi_tolerance_db {
            config.model = SimilarityModel {
                rssi_tolerance_db: tolerance,
                ..config.model
            };
        }
        if let Some(default_position) = &section.default_position {
            config.default_position = default_position.clone();
        }
        config
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        self.matching
            .as_ref()
            .map(|m| m.thresholds.clone())
            .unwrap_or_default()
    }

    pub fn complex_names(&self) -> ComplexNameRegistry {
        self.matching
            .as_ref()
            .map(|m| ComplexNameRegistry::from_map(m.complex_names.clone()))
            .unwrap_or_default()
    }

    /// Returns (count, prefix) for generated rooms, or None when disabled.
    pub fn room_numbers(&self) -> Option<(usize, &str)> {
        let section = self.directory.as_ref()?;
        let count = section.room_numbers.unwrap_or(0);
        if count == 0 {
            return None;
        }
        Some((count, section.room_prefix.as_deref().unwrap_or("04.2")))
    }

    /// Returns the polling interval as Duration (default: 5 seconds)
    pub fn poll_interval(&self) -> Duration {
        let secs = self
            .positioning
            .as_ref()
            .and_then(|p| p.poll_interval_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        Duration::from_secs(secs)
    }
}
