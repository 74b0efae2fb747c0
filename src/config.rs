//! Configuration
//!
//! Layered runtime configuration: built-in defaults, an optional
//! `turibot.toml`, then `TURIBOT_*` environment overrides. Everything is
//! fixed once loaded; nothing here is runtime-mutable.

use crate::catalog::{Category, DEFAULT_CATALOG};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// JID notified on human handoff. Empty disables the operator alert.
    pub operator_jid: String,
    /// Base URL for category deeplinks.
    pub web_url: String,
    /// Keep-alive HTTP listener port.
    pub port: u16,
    /// Sessions idle longer than this are evicted.
    pub idle_window_secs: u64,
    /// How often the eviction sweep runs.
    pub sweep_period_secs: u64,
    /// Excursion catalog shown in the menu.
    pub categories: Vec<Category>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            operator_jid: String::new(),
            web_url: "https://wanderlust.turisuite.com".to_string(),
            port: 3000,
            idle_window_secs: 60 * 60,
            sweep_period_secs: 60 * 60,
            categories: DEFAULT_CATALOG.clone(),
        }
    }
}

impl BotConfig {
    /// Load configuration from `path` (or `./turibot.toml` if present) with
    /// `TURIBOT_*` environment variables layered on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name("turibot").required(false)),
        };
        builder = builder
            .add_source(config::Environment::with_prefix("TURIBOT").try_parsing(true));

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("catalog must not be empty".into()));
        }
        if self.idle_window_secs == 0 || self.sweep_period_secs == 0 {
            return Err(ConfigError::Invalid(
                "idle window and sweep period must be nonzero".into(),
            ));
        }
        if self.web_url.is_empty() {
            return Err(ConfigError::Invalid("web_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_secs(self.idle_window_secs)
    }

    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_period_secs)
    }
}
