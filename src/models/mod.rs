//! Data models shared by the dispatcher, the history log and the front ends.
//!
//! - [`ProviderId`] / [`ProviderMap`] - the closed set of four providers and a map
//!   that always carries one value per provider
//! - [`Message`] - one transcript turn replayed to a provider
//! - [`ResponseSlot`] - display state of one provider pane
//! - [`HistoryEntry`] - a persisted query with its four responses

pub mod history;
pub mod message;
pub mod provider;
pub mod slot;

pub use history::HistoryEntry;
pub use message::{Message, Role};
pub use provider::{ProviderId, ProviderMap};
pub use slot::{ERROR_PREFIX, LOADING_TEXT, ResponseSlot};
