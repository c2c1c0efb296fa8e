//! Query fan-out and response collection
//!
//! A submitted question becomes a [`PendingQuery`] with one outgoing message
//! list per provider. The [`Dispatcher`] spawns one task per provider; each
//! task sends back a [`Completion`] tagged with the query id. The [`Session`]
//! applies completions one at a time, so every mode shares a single reducer:
//!
//! ```text
//! submit -> Session::begin -> Dispatcher::dispatch -> 4 tasks
//!                                                       |
//!                    Session::apply <- channel <--------+
//! ```

pub mod dispatcher;
pub mod engine;
pub mod memory;
pub mod mode;
pub mod session;

pub use dispatcher::Dispatcher;
pub use engine::Engine;
pub use memory::ConversationMemory;
pub use mode::{HistoryConfig, Mode, ModeConfig, PaneLayout};
pub use session::{Completion, DisplaySource, PendingQuery, QueryId, Session};
