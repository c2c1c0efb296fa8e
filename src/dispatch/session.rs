//! Per-session state and the reducer that applies provider completions.
//!
//! Every completion is keyed by `(query_id, provider)` and touches exactly one
//! pane slot, one history field and one transcript, so completions arriving in
//! any order (or for an older query) never interfere with each other.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::memory::ConversationMemory;
use super::mode::HistoryConfig;
use crate::history::{HistoryIdGenerator, HistoryLog, HistoryStore, MemoryHistoryStore};
use crate::models::{ERROR_PREFIX, HistoryEntry, Message, ProviderId, ProviderMap, ResponseSlot};
use crate::providers::ProviderResult;

/// Identifies one submitted query; equal to its history entry id
pub type QueryId = u64;

/// Result of one provider call for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub query_id: QueryId,
    pub provider: ProviderId,
    pub result: ProviderResult,
}

impl Completion {
    /// Text stored in the history log and shown in the pane
    pub fn display_text(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(e) => format!("{}{}", ERROR_PREFIX, e),
        }
    }

    fn slot(&self) -> ResponseSlot {
        match &self.result {
            Ok(text) => ResponseSlot::Text(text.clone()),
            Err(e) => ResponseSlot::Error(e.to_string()),
        }
    }
}

/// A query accepted by [`Session::begin`], ready to be dispatched
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub id: QueryId,
    pub question: String,
    /// Outgoing message list per provider
    pub messages: ProviderMap<Vec<Message>>,
}

/// What the four panes currently show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySource {
    Idle,
    Live(QueryId),
    /// A past entry opened read-only
    History(QueryId),
}

struct InFlight {
    question: String,
    remaining: usize,
}

pub struct Session {
    config: HistoryConfig,
    slots: ProviderMap<ResponseSlot>,
    /// Panes of the most recent query, kept up to date while a past entry is shown
    live_slots: ProviderMap<ResponseSlot>,
    display: DisplaySource,
    last_live: Option<QueryId>,
    log: Option<HistoryLog>,
    memory: ConversationMemory,
    ids: HistoryIdGenerator,
    in_flight: HashMap<QueryId, InFlight>,
}

impl Session {
    /// Create a session. The store is only opened when the history log is enabled and
    /// persisted; a session-only log starts empty in memory.
    pub fn new(config: HistoryConfig, store: Box<dyn HistoryStore>) -> Self {
        let log = config.enable_log.then(|| {
            if config.persist_log {
                HistoryLog::open(store)
            } else {
                HistoryLog::open(Box::new(MemoryHistoryStore::new()))
            }
        });
        let ids = HistoryIdGenerator::seeded(log.as_ref().and_then(HistoryLog::max_id));

        Self {
            config,
            slots: ProviderMap::default(),
            live_slots: ProviderMap::default(),
            display: DisplaySource::Idle,
            last_live: None,
            log,
            memory: ConversationMemory::new(config.enable_memory),
            ids,
            in_flight: HashMap::new(),
        }
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    pub fn slots(&self) -> &ProviderMap<ResponseSlot> {
        &self.slots
    }

    pub fn slot(&self, provider: ProviderId) -> &ResponseSlot {
        &self.slots[provider]
    }

    pub fn display(&self) -> DisplaySource {
        self.display
    }

    pub fn log(&self) -> Option<&HistoryLog> {
        self.log.as_ref()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Provider calls still outstanding across all queries
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.values().map(|query| query.remaining).sum()
    }

    /// Accept a question: mark every pane loading, record a history entry with four
    /// empty responses and build each provider's outgoing messages.
    ///
    /// Returns `None` (and changes nothing) for an empty or whitespace-only question.
    pub fn begin(&mut self, question: &str, now: DateTime<Utc>) -> Option<PendingQuery> {
        if question.trim().is_empty() {
            return None;
        }

        let id = self.ids.next_at(now);
        self.live_slots = ProviderMap::from_fn(|_| ResponseSlot::Loading);
        self.slots = self.live_slots.clone();
        self.display = DisplaySource::Live(id);
        self.last_live = Some(id);

        if let Some(log) = self.log.as_mut() {
            log.prepend(HistoryEntry::new(id, question, now));
        }

        self.in_flight.insert(
            id,
            InFlight { question: question.to_string(), remaining: ProviderId::ALL.len() },
        );

        let messages = ProviderMap::from_fn(|provider| self.memory.outgoing(provider, question));
        Some(PendingQuery { id, question: question.to_string(), messages })
    }

    /// Apply one provider's outcome.
    ///
    /// Updates that provider's field of the matching history entry, its pane if the
    /// panes show that query, and (on a real reply) its transcript.
    pub fn apply(&mut self, completion: &Completion) {
        let (query_id, provider) = (completion.query_id, completion.provider);

        if let Some(log) = self.log.as_mut() {
            log.record_response(query_id, provider, &completion.display_text());
        }

        if self.last_live == Some(query_id) {
            self.live_slots[provider] = completion.slot();
        }
        match self.display {
            DisplaySource::Live(id) | DisplaySource::History(id) if id == query_id => {
                self.slots[provider] = completion.slot();
            }
            _ => {}
        }

        let Some(query) = self.in_flight.get_mut(&query_id) else {
            return;
        };
        if let Ok(reply) = &completion.result {
            self.memory.record_exchange(provider, &query.question, reply);
        }
        query.remaining = query.remaining.saturating_sub(1);
        if query.remaining == 0 {
            self.in_flight.remove(&query_id);
        }
    }

    /// Forget one provider's transcript and blank its pane; nothing else changes
    pub fn clear_memory(&mut self, provider: ProviderId) {
        self.memory.clear(provider);
        self.slots[provider] = ResponseSlot::Empty;
        self.live_slots[provider] = ResponseSlot::Empty;
    }

    /// Show a past entry's stored responses without calling any provider.
    ///
    /// Returns false when there is no log or no entry with that id.
    pub fn show_history(&mut self, id: QueryId) -> bool {
        let Some(entry) = self.log.as_ref().and_then(|log| log.get(id)) else {
            return false;
        };
        self.slots = ProviderMap::from_fn(|p| ResponseSlot::from_stored(entry.response(p)));
        self.display = DisplaySource::History(id);
        true
    }

    /// Go back from a past entry to the most recent submitted query.
    ///
    /// Does nothing when the live panes are already shown.
    pub fn show_live(&mut self) {
        if let DisplaySource::Live(_) = self.display {
            return;
        }
        self.slots = self.live_slots.clone();
        self.display = self.last_live.map_or(DisplaySource::Idle, DisplaySource::Live);
    }

    /// Empty the history log and remove its stored copy.
    ///
    /// Panes showing a past entry are blanked; live panes are left alone.
    pub fn clear_history(&mut self) -> Result<()> {
        if let Some(log) = self.log.as_mut() {
            log.clear()?;
        }
        if let DisplaySource::History(_) = self.display {
            self.slots = ProviderMap::default();
            self.display = DisplaySource::Idle;
        }
        Ok(())
    }
}
