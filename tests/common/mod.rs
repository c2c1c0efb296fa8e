//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_compare::config::{ApiKeySet, ProviderSettings};
use ai_compare::dispatch::{Engine, Mode};
use ai_compare::history::HistoryStore;
use ai_compare::models::{HistoryEntry, ProviderId, ProviderMap};
use ai_compare::providers::{HttpRequest, HttpResponse, ProviderError, Transport, build_adapters};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a data directory with a pre-seeded `history.json`
pub struct DataDirBuilder {
    temp_dir: TempDir,
}

impl DataDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn history_path(&self) -> PathBuf {
        self.temp_dir.path().join("history.json")
    }

    /// Write raw `history.json` content
    pub fn with_raw_history(self, content: &str) -> Self {
        fs::write(self.history_path(), content).expect("Failed to write history.json");
        self
    }

    /// Write the given entries (newest first) as `history.json`
    pub fn with_entries(self, entries: &[HistoryEntryBuilder]) -> Self {
        let entries: Vec<HistoryEntry> = entries.iter().map(HistoryEntryBuilder::build).collect();
        let content = serde_json::to_string(&entries).expect("Failed to serialize history");
        self.with_raw_history(&content)
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for DataDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for history entries
pub struct HistoryEntryBuilder {
    id: u64,
    query: String,
    responses: Vec<(ProviderId, String)>,
}

impl HistoryEntryBuilder {
    pub fn new(id: u64) -> Self {
        Self { id, query: "Test question".to_string(), responses: Vec::new() }
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn response(mut self, provider: ProviderId, text: &str) -> Self {
        self.responses.push((provider, text.to_string()));
        self
    }

    pub fn build(&self) -> HistoryEntry {
        let created_at = Utc.timestamp_millis_opt(self.id as i64).unwrap();
        let mut entry = HistoryEntry::new(self.id, &self.query, created_at);
        for (provider, text) in &self.responses {
            entry.set_response(*provider, text);
        }
        entry
    }
}

/// Base URLs that let a fake transport tell the providers apart
pub fn test_settings() -> ProviderSettings {
    ProviderSettings {
        base_urls: ProviderMap::from_fn(|p| format!("http://{}.test", p.key())),
        ..ProviderSettings::default()
    }
}

fn provider_for_url(url: &str) -> ProviderId {
    ProviderId::ALL
        .into_iter()
        .find(|p| url.starts_with(&format!("http://{}.test", p.key())))
        .unwrap_or_else(|| panic!("unexpected url {}", url))
}

/// Body accepted by both reply shapes (content blocks and choices)
pub fn reply_body(text: &str) -> Value {
    json!({
        "content": [{"type": "text", "text": text}],
        "choices": [{"message": {"role": "assistant", "content": text}}]
    })
}

/// How the fake transport answers one provider
#[derive(Clone)]
pub enum Reply {
    /// Answer with "re: <latest question>"
    Echo,
    Json { status: u16, body: Value },
    TransportError(String),
}

/// Transport that answers from a script and records every request.
///
/// Requests are routed by the hosts in [`test_settings`].
pub struct ScriptedTransport {
    replies: Mutex<HashMap<ProviderId, Reply>>,
    /// Extra latency keyed by (provider, question)
    delays: Mutex<HashMap<(ProviderId, String), Duration>>,
    requests: Mutex<Vec<(ProviderId, HttpRequest)>>,
}

impl ScriptedTransport {
    /// Every provider echoes the question
    pub fn echo() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(ProviderId::ALL.into_iter().map(|p| (p, Reply::Echo)).collect()),
            delays: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn reply(self: &Arc<Self>, provider: ProviderId, reply: Reply) -> Arc<Self> {
        self.replies.lock().unwrap().insert(provider, reply);
        Arc::clone(self)
    }

    pub fn delay(self: &Arc<Self>, provider: ProviderId, question: &str, ms: u64) -> Arc<Self> {
        self.delays
            .lock()
            .unwrap()
            .insert((provider, question.to_string()), Duration::from_millis(ms));
        Arc::clone(self)
    }

    pub fn requests(&self) -> Vec<(ProviderId, HttpRequest)> {
        self.requests.lock().unwrap().clone()
    }

    /// Messages sent to `provider` in its `n`th request
    pub fn sent_messages(&self, provider: ProviderId, n: usize) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|(p, _)| *p == provider)
            .nth(n)
            .and_then(|(_, request)| request.body["messages"].as_array().cloned())
            .unwrap_or_default()
    }
}

fn latest_question(request: &HttpRequest) -> String {
    request.body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        let provider = provider_for_url(&request.url);
        let question = latest_question(&request);
        self.requests.lock().unwrap().push((provider, request));

        let delay = self.delays.lock().unwrap().get(&(provider, question.clone())).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().get(&provider).cloned().unwrap_or(Reply::Echo);
        match reply {
            Reply::Echo => Ok(HttpResponse::json(200, &reply_body(&format!("re: {}", question)))),
            Reply::Json { status, body } => Ok(HttpResponse::json(status, &body)),
            Reply::TransportError(message) => Err(ProviderError::Transport(message)),
        }
    }
}

/// Engine on the current runtime, talking to `transport`
pub fn engine(mode: Mode, store: Box<dyn HistoryStore>, transport: Arc<ScriptedTransport>) -> Engine {
    Engine::new(
        mode,
        store,
        transport,
        build_adapters(&test_settings()),
        ApiKeySet::new(ProviderMap::from_fn(|p| format!("key-{}", p.key()))),
        tokio::runtime::Handle::current(),
    )
}

/// Wait until every in-flight call has been applied
pub async fn settle(engine: &mut Engine) -> Vec<ai_compare::dispatch::Completion> {
    let mut completions = Vec::new();
    while let Some(completion) = engine.next_completion().await {
        completions.push(completion);
    }
    completions
}
