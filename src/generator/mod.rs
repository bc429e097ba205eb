//! HTML app generation: prompt in, sanitized single-page HTML out.

mod prompt;
mod sanitize;

pub use prompt::{compose_prompt, ATTACHMENT_PREVIEW_CHARS};
pub use sanitize::{clean_code_response, starts_with_marker};

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{CredentialSource, ModelConfig};
use crate::llm::{
    select_provider, ChatMessage, ChatOptions, ClientFactory, LlmClient, ProviderChoice,
    TokenUsage,
};
use crate::task::Attachments;

/// Output ceiling for both backends.
pub const MAX_OUTPUT_TOKENS: u64 = 4096;

/// Sampling temperature used with OpenAI. Anthropic keeps its default.
pub const OPENAI_TEMPERATURE: f64 = 0.7;

/// Stop reasons meaning the output limit was hit (Anthropic, OpenAI).
const TRUNCATED_FINISH_REASONS: [&str; 2] = ["max_tokens", "length"];

const OPENAI_SYSTEM_PROMPT: &str =
    "You are an expert web developer. Generate clean, production-ready HTML code.";

/// HTML produced for one task. Best-effort: it may not be a valid document.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub html: String,
    pub provider: ProviderChoice,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl GeneratedArtifact {
    /// True when the html starts with a doctype or `<html` root tag.
    pub fn is_well_formed(&self) -> bool {
        let lower_head: String = self.html.chars().take(9).collect::<String>().to_ascii_lowercase();
        lower_head.starts_with("<!doctype") || lower_head.starts_with("<html")
    }
}

/// Turns a brief into an HTML app.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(
        &self,
        brief: &str,
        checks: &[String],
        attachments: &Attachments,
    ) -> anyhow::Result<GeneratedArtifact>;
}

/// Generator backed by whichever LLM provider is configured at call time.
pub struct LlmCodeGenerator {
    credentials: Arc<dyn CredentialSource>,
    clients: Arc<dyn ClientFactory>,
    models: ModelConfig,
}

impl LlmCodeGenerator {
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        clients: Arc<dyn ClientFactory>,
        models: ModelConfig,
    ) -> Self {
        Self {
            credentials,
            clients,
            models,
        }
    }

    /// Model, messages and sampling options for one backend.
    fn request_for(
        &self,
        choice: ProviderChoice,
        prompt: String,
    ) -> (String, Vec<ChatMessage>, ChatOptions) {
        match choice {
            ProviderChoice::Anthropic => (
                self.models.anthropic_model.clone(),
                vec![ChatMessage::user(prompt)],
                ChatOptions {
                    temperature: None,
                    max_tokens: Some(MAX_OUTPUT_TOKENS),
                },
            ),
            ProviderChoice::OpenAi => (
                self.models.openai_model.clone(),
                vec![
                    ChatMessage::system(OPENAI_SYSTEM_PROMPT),
                    ChatMessage::user(prompt),
                ],
                ChatOptions {
                    temperature: Some(OPENAI_TEMPERATURE),
                    max_tokens: Some(MAX_OUTPUT_TOKENS),
                },
            ),
        }
    }
}

#[async_trait]
impl CodeGenerator for LlmCodeGenerator {
    async fn generate(
        &self,
        brief: &str,
        checks: &[String],
        attachments: &Attachments,
    ) -> anyhow::Result<GeneratedArtifact> {
        let selected = select_provider(self.credentials.as_ref())?;
        let prompt = compose_prompt(brief, checks, attachments);
        let (model, messages, options) = self.request_for(selected.choice, prompt);

        tracing::info!(provider = %selected.choice, model = %model, "Generating app");

        let client = self.clients.client_for(selected.choice, selected.api_key);
        let response = client
            .chat_completion(&model, &messages, options)
            .await
            .with_context(|| format!("{} request failed", selected.choice))?;

        if response
            .finish_reason
            .as_deref()
            .is_some_and(|reason| TRUNCATED_FINISH_REASONS.contains(&reason))
        {
            tracing::warn!(
                provider = %selected.choice,
                max_tokens = MAX_OUTPUT_TOKENS,
                "Model reply was cut off at the output limit"
            );
        }

        let raw = response
            .content
            .with_context(|| format!("{} returned no content", selected.choice))?;

        let html = clean_code_response(&raw);
        if !starts_with_marker(&html) {
            tracing::warn!(
                provider = %selected.choice,
                "Model reply has no HTML markers; passing it through unvalidated"
            );
        }

        Ok(GeneratedArtifact {
            html,
            provider: selected.choice,
            model: response.model.unwrap_or(model),
            usage: response.usage,
        })
    }
}
