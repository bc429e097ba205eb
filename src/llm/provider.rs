//! Backend selection by credential presence.
//!
//! Anthropic wins when its key is set, OpenAI is used otherwise. Selection is redone on every
//! call so a changed environment takes effect without a restart.

use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::{AnthropicClient, LlmClient, OpenAiClient};
use crate::config::{CredentialSource, ModelConfig, ANTHROPIC_API_KEY, OPENAI_API_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderConfigError {
    #[error("No LLM API key found. Set {} or {}", ANTHROPIC_API_KEY, OPENAI_API_KEY)]
    NoCredentials,
}

/// One of the two interchangeable code-generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    /// Primary provider
    Anthropic,
    /// Secondary provider
    OpenAi,
}

impl ProviderChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderChoice::Anthropic => "anthropic",
            ProviderChoice::OpenAi => "openai",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderChoice::Anthropic => ANTHROPIC_API_KEY,
            ProviderChoice::OpenAi => OPENAI_API_KEY,
        }
    }
}

impl fmt::Display for ProviderChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`select_provider`]: the backend and the key that selected it.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedProvider {
    pub choice: ProviderChoice,
    pub api_key: String,
}

impl fmt::Debug for SelectedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedProvider")
            .field("choice", &self.choice)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Pick the backend from the credentials currently available.
pub fn select_provider(
    credentials: &dyn CredentialSource,
) -> Result<SelectedProvider, ProviderConfigError> {
    for choice in [ProviderChoice::Anthropic, ProviderChoice::OpenAi] {
        if let Some(api_key) = credentials.credential(choice.credential_var()) {
            return Ok(SelectedProvider { choice, api_key });
        }
    }
    Err(ProviderConfigError::NoCredentials)
}

/// Builds a client for the selected backend.
pub trait ClientFactory: Send + Sync {
    fn client_for(&self, choice: ProviderChoice, api_key: String) -> Arc<dyn LlmClient>;
}

/// Real HTTP clients sharing one connection pool.
pub struct HttpClientFactory {
    http: Client,
    models: ModelConfig,
}

impl HttpClientFactory {
    pub fn new(models: ModelConfig) -> Self {
        Self {
            http: Client::new(),
            models,
        }
    }
}

impl ClientFactory for HttpClientFactory {
    fn client_for(&self, choice: ProviderChoice, api_key: String) -> Arc<dyn LlmClient> {
        match choice {
            ProviderChoice::Anthropic => Arc::new(AnthropicClient::new(
                self.http.clone(),
                api_key,
                self.models.anthropic_base_url.clone(),
            )),
            ProviderChoice::OpenAi => Arc::new(OpenAiClient::new(
                self.http.clone(),
                api_key,
                self.models.openai_base_url.clone(),
            )),
        }
    }
}
