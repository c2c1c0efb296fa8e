//! Environment-only configuration.
//!
//! Everything is read once at startup into [`AppConfig`]. API keys typed in at
//! runtime go into [`ApiKeySet`] overrides, which are held in memory only.

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::models::{ProviderId, ProviderMap};
use crate::utils::{DATA_DIR_ENV, resolve_data_dir};

/// Proxy base URL for Claude calls; when unset Claude is called directly
pub const PROXY_URL_ENV: &str = "AI_COMPARE_PROXY_URL";

const HISTORY_FILENAME: &str = "history.json";
const LOG_FILENAME: &str = "ai-compare.log";

/// Environment variable holding each provider's API key
pub fn api_key_env(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "CLAUDE_API_KEY",
        ProviderId::ChatGpt => "OPENAI_API_KEY",
        ProviderId::Grok => "GROK_API_KEY",
        ProviderId::Perplexity => "PERPLEXITY_API_KEY",
    }
}

/// Environment variable overriding each provider's API base URL
pub fn base_url_env(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "ANTHROPIC_BASE_URL",
        ProviderId::ChatGpt => "OPENAI_BASE_URL",
        ProviderId::Grok => "XAI_BASE_URL",
        ProviderId::Perplexity => "PERPLEXITY_BASE_URL",
    }
}

/// Environment variable overriding each provider's model name
pub fn model_env(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "CLAUDE_MODEL",
        ProviderId::ChatGpt => "OPENAI_MODEL",
        ProviderId::Grok => "GROK_MODEL",
        ProviderId::Perplexity => "PERPLEXITY_MODEL",
    }
}

pub fn default_base_url(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "https://api.anthropic.com",
        ProviderId::ChatGpt => "https://api.openai.com",
        ProviderId::Grok => "https://api.x.ai",
        ProviderId::Perplexity => "https://api.perplexity.ai",
    }
}

pub fn default_model(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Claude => "claude-opus-4-1-20250805",
        ProviderId::ChatGpt => "gpt-5",
        ProviderId::Grok => "grok-4",
        ProviderId::Perplexity => "sonar",
    }
}

/// Per-provider API keys: configured values plus in-memory overrides
#[derive(Clone, Default)]
pub struct ApiKeySet {
    configured: ProviderMap<String>,
    overrides: ProviderMap<Option<String>>,
}

impl ApiKeySet {
    pub fn new(configured: ProviderMap<String>) -> Self {
        Self { configured, overrides: ProviderMap::default() }
    }

    /// Key used for the next call: the override if one was entered, else the configured key
    pub fn get(&self, provider: ProviderId) -> &str {
        self.overrides[provider].as_deref().unwrap_or(&self.configured[provider])
    }

    pub fn is_set(&self, provider: ProviderId) -> bool {
        !self.get(provider).is_empty()
    }

    pub fn has_override(&self, provider: ProviderId) -> bool {
        self.overrides[provider].is_some()
    }

    /// Hold a key for this session only. A blank key removes the override.
    pub fn set_override(&mut self, provider: ProviderId, key: impl Into<String>) {
        let key = key.into();
        self.overrides[provider] = if key.trim().is_empty() { None } else { Some(key) };
    }
}

// Keys never reach logs
impl fmt::Debug for ApiKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for provider in ProviderId::ALL {
            let state = match (self.has_override(provider), self.is_set(provider)) {
                (true, _) => "override",
                (false, true) => "configured",
                (false, false) => "missing",
            };
            map.entry(&provider.key(), &state);
        }
        map.finish()
    }
}

/// Where and how each provider is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub base_urls: ProviderMap<String>,
    pub models: ProviderMap<String>,
    pub proxy_url: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_urls: ProviderMap::from_fn(|p| default_base_url(p).to_string()),
            models: ProviderMap::from_fn(|p| default_model(p).to_string()),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub keys: ApiKeySet,
    pub providers: ProviderSettings,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let keys = ApiKeySet::new(ProviderMap::from_fn(|p| get(api_key_env(p)).unwrap_or_default()));
        let providers = ProviderSettings {
            base_urls: ProviderMap::from_fn(|p| {
                let url = get(base_url_env(p)).unwrap_or_else(|| default_base_url(p).to_string());
                url.trim_end_matches('/').to_string()
            }),
            models: ProviderMap::from_fn(|p| {
                get(model_env(p)).unwrap_or_else(|| default_model(p).to_string())
            }),
            proxy_url: get(PROXY_URL_ENV).map(|url| url.trim_end_matches('/').to_string()),
        };
        let data_dir = resolve_data_dir(get(DATA_DIR_ENV))?;

        Ok(Self { keys, providers, data_dir })
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILENAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILENAME)
    }
}
