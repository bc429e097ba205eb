//! Configuration management for the task receiver.
//!
//! Configuration can be set via environment variables:
//! - `STUDENT_SECRET` - Required. Shared secret every submitted task must carry.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `OUTPUT_DIR` - Optional. Where generated apps are written. Defaults to `./generated`.
//! - `ANTHROPIC_MODEL` - Optional. Defaults to `claude-sonnet-4-20250514`.
//! - `OPENAI_MODEL` - Optional. Defaults to `gpt-4-turbo-preview`.
//! - `ANTHROPIC_BASE_URL` / `OPENAI_BASE_URL` - Optional. API endpoint overrides.
//!
//! Provider credentials (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`) are deliberately not part of
//! [`Config`]: they are looked up through a [`CredentialSource`] on every generation call.

use std::path::PathBuf;
use thiserror::Error;

pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Model names and endpoints for both generation backends.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub anthropic_model: String,
    pub anthropic_base_url: String,
    pub openai_model: String,
    pub openai_base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret expected in every task payload
    pub secret: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Root directory for deployed artifacts
    pub output_dir: PathBuf,

    /// Backend models and endpoints
    pub models: ModelConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `STUDENT_SECRET` is not set or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("STUDENT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("STUDENT_SECRET".to_string()))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let output_dir = std::env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("generated"));

        let defaults = ModelConfig::default();
        let models = ModelConfig {
            anthropic_model: std::env::var("ANTHROPIC_MODEL")
                .unwrap_or(defaults.anthropic_model),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or(defaults.anthropic_base_url),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
        };

        Ok(Self {
            secret,
            host,
            port,
            output_dir,
            models,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(secret: impl Into<String>, output_dir: PathBuf) -> Self {
        Self {
            secret: secret.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            output_dir,
            models: ModelConfig::default(),
        }
    }
}

/// Lookup of provider credentials.
///
/// Implementations must return `None` for unset or empty values.
pub trait CredentialSource: Send + Sync {
    fn credential(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credential(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}
