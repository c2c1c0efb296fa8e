//! Provider adapters and the HTTP transport.
//!
//! Provider-specific vocabulary lives only here. Each adapter knows how to build
//! its request and where the reply text sits in a successful body; everything
//! else (content-type checks, provider-reported errors, status codes) is shared
//! in [`interpret_response`].

pub mod anthropic;
pub mod chat_completions;
pub mod error;
pub mod transport;

use std::sync::Arc;

pub use anthropic::{AnthropicAdapter, ClaudeRoute};
pub use chat_completions::ChatCompletionsAdapter;
pub use error::ProviderError;
use serde_json::Value;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use tracing::debug;

use crate::config::ProviderSettings;
use crate::models::{Message, ProviderId, ProviderMap};

/// Reply text, or the reason there is none
pub type ProviderResult = Result<String, ProviderError>;

pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    fn build_request(&self, messages: &[Message], api_key: &str) -> HttpRequest;

    /// Pull the reply text out of a successful, error-free JSON body
    fn extract_text(&self, body: &Value) -> ProviderResult;
}

/// Turn a raw HTTP response into reply text or a [`ProviderError`].
///
/// Order matters: a non-JSON body is rejected before parsing, a provider error
/// object wins over the status code, and only then is the adapter asked for text.
pub fn interpret_response(adapter: &dyn ProviderAdapter, response: &HttpResponse) -> ProviderResult {
    if !response.is_json() {
        return Err(ProviderError::NonJson {
            status: response.status,
            content_type: response
                .content_type
                .clone()
                .unwrap_or_else(|| "no content type".to_string()),
        });
    }

    let body: Value = serde_json::from_str(&response.body)
        .map_err(|e| ProviderError::InvalidJson(e.to_string()))?;

    if let Some(err) = ProviderError::from_error_body(&body) {
        return Err(err);
    }
    if !response.is_success() {
        return Err(ProviderError::Status(response.status));
    }

    adapter.extract_text(&body)
}

/// One complete provider call: build, send, interpret
pub async fn call_provider(
    transport: &dyn Transport,
    adapter: &dyn ProviderAdapter,
    messages: &[Message],
    api_key: &str,
) -> ProviderResult {
    let request = adapter.build_request(messages, api_key);
    debug!(provider = %adapter.provider(), url = %request.url, turns = messages.len(), "sending request");

    let response = transport.send(request).await?;
    debug!(provider = %adapter.provider(), status = response.status, "received response");

    interpret_response(adapter, &response)
}

/// Build the four adapters from configuration
pub fn build_adapters(settings: &ProviderSettings) -> ProviderMap<Arc<dyn ProviderAdapter>> {
    ProviderMap::from_fn(|provider| -> Arc<dyn ProviderAdapter> {
        let model = settings.models[provider].clone();
        match provider {
            ProviderId::Claude => {
                let route = match &settings.proxy_url {
                    Some(base_url) => ClaudeRoute::Proxy { base_url: base_url.clone() },
                    None => ClaudeRoute::Direct { base_url: settings.base_urls[provider].clone() },
                };
                Arc::new(AnthropicAdapter::new(route, model))
            }
            _ => Arc::new(ChatCompletionsAdapter::new(
                provider,
                &settings.base_urls[provider],
                model,
            )),
        }
    })
}
