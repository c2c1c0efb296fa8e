use anyhow::Result;
use tracing::warn;

use super::store::HistoryStore;
use crate::models::{HistoryEntry, ProviderId};

/// Newest-first query log, written through to its store after every change.
///
/// Persistence failures while recording are logged and otherwise ignored: the
/// in-memory log stays authoritative for the session.
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    store: Box<dyn HistoryStore>,
}

impl HistoryLog {
    /// Load the log from `store`. A malformed stored log is logged and treated as empty.
    pub fn open(store: Box<dyn HistoryStore>) -> Self {
        let entries = match store.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to load history, starting empty: {:#}", e);
                Vec::new()
            }
        };
        Self { entries, store }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn max_id(&self) -> Option<u64> {
        self.entries.iter().map(|entry| entry.id).max()
    }

    /// Put a new entry at the front of the log
    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.persist();
    }

    /// Overwrite one provider's response in the entry with `id`.
    ///
    /// Returns false when no such entry exists (e.g. the log was cleared while
    /// the call was in flight).
    pub fn record_response(&mut self, id: u64, provider: ProviderId, text: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        entry.set_response(provider, text);
        self.persist();
        true
    }

    /// Empty the log and remove the stored copy entirely
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.store.clear()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.entries) {
            warn!("Failed to save history: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::history::store::MemoryHistoryStore;

    fn entry(id: u64) -> HistoryEntry {
        HistoryEntry::new(id, format!("query {}", id), Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn test_open_malformed_store_is_empty() {
        let log = HistoryLog::open(Box::new(MemoryHistoryStore::with_raw("definitely not json")));
        assert!(log.is_empty());
    }

    #[test]
    fn test_prepend_keeps_newest_first_and_persists() {
        let store = MemoryHistoryStore::new();
        let mut log = HistoryLog::open(Box::new(store.clone()));

        log.prepend(entry(1));
        log.prepend(entry(2));

        let ids: Vec<u64> = log.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let reloaded = HistoryLog::open(Box::new(store));
        assert_eq!(reloaded.entries(), log.entries());
    }

    #[test]
    fn test_record_response_by_id_not_position() {
        let mut log = HistoryLog::open(Box::new(MemoryHistoryStore::new()));
        log.prepend(entry(1));
        log.prepend(entry(2));

        assert!(log.record_response(1, ProviderId::Grok, "late answer"));

        assert_eq!(log.get(1).unwrap().response(ProviderId::Grok), "late answer");
        assert_eq!(log.get(2).unwrap().response(ProviderId::Grok), "");
    }

    #[test]
    fn test_record_response_unknown_id() {
        let mut log = HistoryLog::open(Box::new(MemoryHistoryStore::new()));
        assert!(!log.record_response(42, ProviderId::Claude, "x"));
    }

    #[test]
    fn test_clear_removes_stored_value() {
        let store = MemoryHistoryStore::new();
        let mut log = HistoryLog::open(Box::new(store.clone()));
        log.prepend(entry(1));
        assert!(store.raw().is_some());

        log.clear().unwrap();
        assert!(log.is_empty());
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn test_max_id() {
        let mut log = HistoryLog::open(Box::new(MemoryHistoryStore::new()));
        assert_eq!(log.max_id(), None);
        log.prepend(entry(7));
        log.prepend(entry(3));
        assert_eq!(log.max_id(), Some(7));
    }
}
