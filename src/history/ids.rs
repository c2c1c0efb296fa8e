use chrono::{DateTime, Utc};

/// Hands out history ids derived from wall-clock milliseconds.
///
/// Ids are strictly increasing: two queries created in the same millisecond (or
/// after the clock steps backwards) get `last + 1` instead of a duplicate.
#[derive(Debug, Clone, Default)]
pub struct HistoryIdGenerator {
    last: u64,
}

impl HistoryIdGenerator {
    /// Start above every id already in use
    pub fn seeded(max_existing: Option<u64>) -> Self {
        Self { last: max_existing.unwrap_or(0) }
    }

    pub fn next_at(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}
