//! Configuration loading.
//!
//! Loads formwright configuration from `./formwright.toml` (or
//! `$FORMWRIGHT_CONFIG_PATH`). Environment variables override file values;
//! file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// Default chat completions endpoint.
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default classifier model.
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Top-level formwright configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormwrightConfig {
    /// Semantic matcher settings (`[semantic]`).
    pub semantic: SemanticConfig,
}

/// Settings for the semantic matching strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Chat completions endpoint URL.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }
}

impl FormwrightConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$FORMWRIGHT_CONFIG_PATH` or `./formwright.toml`.
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed,
    /// or when the resulting endpoint is not a valid URL.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config file {}: {e}",
                path.display()
            )),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("FORMWRIGHT_CONFIG_PATH").map_or_else(|| PathBuf::from("formwright.toml"), PathBuf::from)
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = env("FORMWRIGHT_SEMANTIC_ENDPOINT") {
            self.semantic.endpoint = endpoint;
        }
        if let Some(model) = env("FORMWRIGHT_SEMANTIC_MODEL") {
            self.semantic.model = model;
        }
    }

    /// Validate resolved settings.
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.semantic.endpoint).with_context(|| {
            format!(
                "semantic endpoint is not a valid URL: {}",
                self.semantic.endpoint
            )
        })?;
        if self.semantic.model.trim().is_empty() {
            warn!("semantic model is empty, requests will likely be rejected");
        }
        Ok(())
    }
}
