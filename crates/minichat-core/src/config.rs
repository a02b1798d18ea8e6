use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MinichatError, Result};

/// Top-level configuration for minichat.
///
/// Loaded from `~/.minichat/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinichatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
}

impl MinichatConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MinichatConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the reply pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.reply.min_delay_ms > self.reply.max_delay_ms {
            return Err(MinichatError::Config(format!(
                "reply.min_delay_ms ({}) exceeds reply.max_delay_ms ({})",
                self.reply.min_delay_ms, self.reply.max_delay_ms
            )));
        }
        if self.remote.context_messages == 0 {
            return Err(MinichatError::Config(
                "remote.context_messages must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.remote.temperature) {
            return Err(MinichatError::Config(format!(
                "remote.temperature must be within 0.0..=2.0, got {}",
                self.remote.temperature
            )));
        }
        if !self.remote.endpoint.starts_with("https://")
            && !self.remote.endpoint.starts_with("http://")
        {
            return Err(MinichatError::Config(format!(
                "remote.endpoint must be an http(s) URL, got {}",
                self.remote.endpoint
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the key-value database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.minichat/data".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Remote completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Chat-completions endpoint.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Number of prior messages sent as context.
    pub context_messages: usize,
    /// System instruction prepended to every request.
    pub system_prompt: String,
    /// Transport timeout. `None` keeps the transport default (no timeout).
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            context_messages: 5,
            system_prompt: "You are a helpful assistant. Give helpful, brief answers.".to_string(),
            timeout_secs: None,
        }
    }
}

/// Reply delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Lower bound (inclusive) of the simulated local reply latency.
    pub min_delay_ms: u64,
    /// Upper bound (exclusive) of the simulated local reply latency.
    pub max_delay_ms: u64,
    /// Prefix of the bot message shown when a remote reply fails.
    pub warning_prefix: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 600,
            max_delay_ms: 1200,
            warning_prefix: "⚠️ AI error: ".to_string(),
        }
    }
}
