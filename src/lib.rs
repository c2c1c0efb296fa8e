//! AI Compare - ask four AI chat providers the same question side by side
//!
//! One question fans out to Claude, ChatGPT, Grok and Perplexity in parallel.
//! Each answer lands in its own pane as soon as it arrives, independent of the
//! others. Depending on the [`Mode`], the library also:
//!
//! - Keeps a per-provider conversation transcript that is replayed on the next call
//! - Records every query and its four responses in a persisted history log
//! - Lets past entries be browsed read-only
//!
//! # Example
//!
//! ```no_run
//! use ai_compare::{AppConfig, Engine, Mode};
//!
//! let config = AppConfig::from_env()?;
//! let rt = tokio::runtime::Runtime::new()?;
//! let mut engine = Engine::from_config(&config, Mode::Grid, rt.handle().clone())?;
//!
//! engine.submit("What is 2+2?");
//! rt.block_on(async {
//!     while let Some(completion) = engine.next_completion().await {
//!         println!("{}: {}", completion.provider, completion.display_text());
//!     }
//! });
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod history;
pub mod logging;
pub mod models;
pub mod providers;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use dispatch::{Completion, Engine, Mode, Session};
pub use history::{FileHistoryStore, HistoryLog, HistoryStore};
pub use models::{HistoryEntry, ProviderId, ResponseSlot};
pub use providers::ProviderError;
