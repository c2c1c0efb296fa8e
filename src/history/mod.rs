//! Persistent query history
//!
//! The log is one JSON array of [`HistoryEntry`](crate::models::HistoryEntry)
//! records, newest first. It is loaded once at startup and saved after every
//! change through a [`HistoryStore`]:
//! - [`FileHistoryStore`]: `history.json` in the data directory
//!   (`~/.local/share/ai-compare/` on Linux, `~/Library/Application Support/ai-compare/` on macOS)
//! - [`MemoryHistoryStore`]: in-process, for tests
//!
//! There is no schema versioning. A stored log that no longer parses is logged
//! and replaced by an empty one.

pub mod ids;
pub mod log;
pub mod store;

pub use ids::HistoryIdGenerator;
pub use log::HistoryLog;
pub use store::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
