use serde_json::{Value, json};

use super::ProviderAdapter;
use super::error::ProviderError;
use super::transport::HttpRequest;
use crate::models::{Message, ProviderId};

/// Adapter for the `choices[0].message.content` family (OpenAI, xAI, Perplexity)
#[derive(Debug, Clone)]
pub struct ChatCompletionsAdapter {
    provider: ProviderId,
    url: String,
    model: String,
}

impl ChatCompletionsAdapter {
    pub fn new(provider: ProviderId, base_url: &str, model: impl Into<String>) -> Self {
        Self { provider, url: completions_url(provider, base_url), model: model.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Perplexity serves completions without the `/v1` prefix
fn completions_url(provider: ProviderId, base_url: &str) -> String {
    match provider {
        ProviderId::Perplexity => format!("{}/chat/completions", base_url),
        _ => format!("{}/v1/chat/completions", base_url),
    }
}

impl ProviderAdapter for ChatCompletionsAdapter {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    fn build_request(&self, messages: &[Message], api_key: &str) -> HttpRequest {
        HttpRequest::post(&self.url, json!({ "model": self.model, "messages": messages }))
            .header("Authorization", format!("Bearer {}", api_key))
    }

    fn extract_text(&self, body: &Value) -> Result<String, ProviderError> {
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(ProviderError::MissingContent)
    }
}
