use serde_json::Value;
use thiserror::Error;

/// Why a provider call produced no usable reply.
///
/// `Display` is the human-readable message; the pane and the history log show it
/// behind the `Error: ` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Network failure before any response arrived
    #[error("{0}")]
    Transport(String),

    /// The body was not JSON, e.g. an HTML page from a proxy that is still waking up
    #[error("expected a JSON response but received {content_type} (HTTP {status})")]
    NonJson { status: u16, content_type: String },

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    /// The provider reported an error object in its JSON body
    #[error("{0}")]
    Upstream(String),

    /// Non-2xx status without an error object
    #[error("HTTP {0}")]
    Status(u16),

    /// Successful response without the expected reply text
    #[error("Unable to get response")]
    MissingContent,
}

impl ProviderError {
    /// Extract a provider-reported error from a JSON body, if there is one.
    ///
    /// Uses `error.message` when it is a non-empty string, the string itself when
    /// `error` is a plain string, and the serialized error value otherwise.
    pub fn from_error_body(body: &Value) -> Option<Self> {
        let error = body.get("error")?;
        if error.is_null() {
            return None;
        }

        let message = match error {
            Value::String(text) => text.clone(),
            _ => match error.get("message").and_then(Value::as_str) {
                Some(message) if !message.is_empty() => message.to_string(),
                _ => error.to_string(),
            },
        };
        Some(ProviderError::Upstream(message))
    }
}
