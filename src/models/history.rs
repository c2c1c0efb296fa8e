use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::{ProviderId, ProviderMap};

/// One submitted query and the four providers' final responses.
///
/// `responses` always holds all four providers; an empty string means the provider
/// has not answered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub query: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub responses: ProviderMap<String>,
}

impl HistoryEntry {
    pub fn new(id: u64, query: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self { id, query: query.into(), created_at, responses: ProviderMap::default() }
    }

    pub fn response(&self, provider: ProviderId) -> &str {
        &self.responses[provider]
    }

    pub fn set_response(&mut self, provider: ProviderId, text: impl Into<String>) {
        self.responses[provider] = text.into();
    }

    /// Providers that have written a response (success or error)
    pub fn answered_count(&self) -> usize {
        self.responses.values().filter(|text| !text.is_empty()).count()
    }
}
