//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::command_service::DEFAULT_PREVIEW_LENGTH;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub tags: TagsConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

/// Which settings backend holds the tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TagsConfig {
    pub storage: StorageBackend,
    pub data_path: PathBuf,
    /// Used until the flag has been saved once
    pub notify_on_send: bool,
    pub preview_length: usize,
    /// Prefix for bot replies, may be empty
    pub emote: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub chat_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "message-tags".to_string(),
                prefix: "/".to_string(),
            },
            tags: TagsConfig {
                storage: StorageBackend::Json,
                data_path: PathBuf::from("data/tags.json"),
                notify_on_send: true,
                preview_length: DEFAULT_PREVIEW_LENGTH,
                emote: "🏷️".to_string(),
            },
            adapters: AdaptersConfig {
                console: Some(ConsoleConfig {
                    enabled: true,
                    chat_id: "console".to_string(),
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, the defaults otherwise; then apply env overrides.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.exists() {
            return Self::load(path)?.with_env();
        }
        tracing::info!("Config {} not found, using defaults", path.display());
        Self::load_env()
    }

    /// Defaults plus env overrides
    pub fn load_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// Apply environment variable overrides
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("TAGS_DATA_FILE") {
            self.tags.data_path = PathBuf::from(path);
        }

        if let Ok(value) = std::env::var("TAGS_NOTIFY_ON_SEND") {
            self.tags.notify_on_send = parse_bool(&value)
                .ok_or_else(|| ConfigError::InvalidValue(format!("TAGS_NOTIFY_ON_SEND={}", value)))?;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.tags.preview_length == 0 {
            return Err(ConfigError::InvalidValue("tags.preview-length must be positive".to_string()));
        }
        Ok(())
    }

    /// The console front-end runs unless the config turns it off explicitly.
    pub fn console_enabled(&self) -> bool {
        self.adapters.console.as_ref().map(|c| c.enabled).unwrap_or(true)
    }

    pub fn console_chat_id(&self) -> String {
        self.adapters
            .console
            .as_ref()
            .map(|c| c.chat_id.clone())
            .unwrap_or_else(|| "console".to_string())
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
