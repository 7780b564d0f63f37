//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::TrackerSettings;

/// Service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub tracking: TrackingConfig,
    pub storage: StorageConfig,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrackingConfig {
    pub enabled: bool,
    pub count_bots: bool,
    pub track_mentions: bool,
    /// Retention horizon in days; older data is pruned at save time.
    pub retention_days: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub path: PathBuf,
    pub autosave_seconds: u64,
}

/// Remote embed-template API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig {
                enabled: true,
                count_bots: false,
                track_mentions: true,
                retention_days: 30,
            },
            storage: StorageConfig {
                path: PathBuf::from("guildpulse-data.json"),
                autosave_seconds: 300,
            },
            api: None,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tracking.retention_days == 0 {
            return Err(ConfigError::InvalidValue(
                "tracking.retention-days must be positive".to_string(),
            ));
        }
        if self.storage.autosave_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "storage.autosave-seconds must be positive".to_string(),
            ));
        }
        if let Some(api) = &self.api {
            if api.base_url.is_empty() {
                return Err(ConfigError::MissingField("api.base-url".to_string()));
            }
        }
        Ok(())
    }

    pub fn save(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.into(), content)
            .map_err(|e| ConfigError::Parse(format!("Failed to write config: {}", e)))
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(path) = std::env::var("GUILDPULSE_DATA") {
            config.storage.path = PathBuf::from(path);
        }

        if let Ok(days) = std::env::var("GUILDPULSE_RETENTION_DAYS") {
            if let Ok(days) = days.parse() {
                config.tracking.retention_days = days;
            }
        }

        if let Ok(base_url) = std::env::var("GUILDPULSE_API_URL") {
            config.api = Some(ApiConfig {
                base_url,
                token: std::env::var("GUILDPULSE_API_TOKEN").ok(),
                timeout_seconds: 10,
                max_attempts: 3,
                backoff_ms: 500,
            });
        }

        config
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            enabled: self.tracking.enabled,
            count_bots: self.tracking.count_bots,
            track_mentions: self.tracking.track_mentions,
            retention_days: self.tracking.retention_days,
            ..TrackerSettings::default()
        }
    }
}
