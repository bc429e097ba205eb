//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{from_reqwest, LlmError};
use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient, Role, TokenUsage};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The Messages API requires `max_tokens`; used when the caller leaves it unset.
const DEFAULT_MAX_TOKENS: u64 = 4096;

/// Anthropic API client. One attempt per call.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    /// System messages go in the top-level `system` field, everything else in `messages`.
    fn build_request<'a>(
        model: &'a str,
        messages: &'a [ChatMessage],
        options: &ChatOptions,
    ) -> AnthropicRequest<'a> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        AnthropicRequest {
            model,
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n\n"))
            },
            messages: messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| AnthropicMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
        }
    }

    fn parse_body(body: &str, fallback_model: &str) -> Result<ChatResponse, LlmError> {
        let parsed: AnthropicResponse = serde_json::from_str(body).map_err(|e| {
            LlmError::parse(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if parsed.content.is_empty() {
            return Err(LlmError::parse(
                "No content blocks in response".to_string(),
            ));
        }

        Ok(ChatResponse {
            content: Some(text),
            finish_reason: parsed.stop_reason,
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
            model: parsed.model.or_else(|| Some(fallback_model.to_string())),
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        let request = Self::build_request(model, messages, &options);

        tracing::debug!("Sending request to Anthropic: model={}", model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        Self::parse_body(&body, model)
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;

    #[test]
    fn test_request_moves_system_prompt() {
        let messages = vec![ChatMessage::system("be terse"), ChatMessage::user("hi")];
        let request = AnthropicClient::build_request(
            "claude-sonnet-4-20250514",
            &messages,
            &ChatOptions {
                temperature: None,
                max_tokens: Some(4096),
            },
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["system"], "be terse");
        assert_eq!(value["max_tokens"], 4096);
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_request_defaults_max_tokens() {
        let messages = vec![ChatMessage::user("hi")];
        let request = AnthropicClient::build_request("m", &messages, &ChatOptions::default());
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.system.is_none());
    }

    #[test]
    fn test_parse_joins_text_blocks() {
        let body = r#"{
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "<!DOCTYPE html>"},
                {"type": "text", "text": "<html></html>"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 3}
        }"#;
        let response = AnthropicClient::parse_body(body, "m").unwrap();
        assert_eq!(
            response.content.as_deref(),
            Some("<!DOCTYPE html><html></html>")
        );
        assert_eq!(response.finish_reason.as_deref(), Some("end_turn"));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_empty_content_fails() {
        let err = AnthropicClient::parse_body(r#"{"content": []}"#, "m").unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ParseError);
    }
}
