use serde_json::{Value, json};

use super::ProviderAdapter;
use super::error::ProviderError;
use super::transport::HttpRequest;
use crate::models::{Message, ProviderId, Role};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// How Claude calls leave the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaudeRoute {
    /// Messages API called directly with `x-api-key`
    Direct { base_url: String },
    /// Same-origin style proxy at `{base_url}/api/claude`, which adds the key upstream
    Proxy { base_url: String },
}

/// Messages API adapter: replies arrive as an array of content blocks
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    route: ClaudeRoute,
    model: String,
    max_tokens: u32,
}

impl AnthropicAdapter {
    pub fn new(route: ClaudeRoute, model: impl Into<String>) -> Self {
        Self { route, model: model.into(), max_tokens: DEFAULT_MAX_TOKENS }
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn build_request(&self, messages: &[Message], api_key: &str) -> HttpRequest {
        match &self.route {
            ClaudeRoute::Direct { base_url } => HttpRequest::post(
                format!("{}/v1/messages", base_url),
                json!({
                    "model": self.model,
                    "max_tokens": self.max_tokens,
                    "messages": messages,
                }),
            )
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION),
            ClaudeRoute::Proxy { base_url } => {
                // The proxy accepts either the latest question alone or the whole transcript
                let latest = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                HttpRequest::post(
                    format!("{}/api/{}", base_url, ProviderId::Claude.key()),
                    json!({
                        "message": latest,
                        "messages": messages,
                        "apiKey": api_key,
                    }),
                )
            }
        }
    }

    fn extract_text(&self, body: &Value) -> Result<String, ProviderError> {
        let text: String = body
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|block| {
                        block.get("type").and_then(Value::as_str).is_none_or(|t| t == "text")
                    })
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() { Err(ProviderError::MissingContent) } else { Ok(text) }
    }
}
