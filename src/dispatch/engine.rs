use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use super::dispatcher::Dispatcher;
use super::mode::Mode;
use super::session::{Completion, QueryId, Session};
use crate::config::{ApiKeySet, AppConfig};
use crate::history::{FileHistoryStore, HistoryStore};
use crate::models::ProviderMap;
use crate::providers::{ProviderAdapter, ReqwestTransport, Transport, build_adapters};

/// The comparison engine every mode drives: a [`Session`] fed by a [`Dispatcher`].
///
/// Completions are queued on a channel and only touch the session when the
/// owner calls [`Engine::drain`] or [`Engine::next_completion`], so all state
/// changes happen on the owner's thread.
pub struct Engine {
    mode: Mode,
    session: Session,
    dispatcher: Dispatcher,
    keys: ApiKeySet,
    completions: UnboundedReceiver<Completion>,
}

impl Engine {
    pub fn new(
        mode: Mode,
        store: Box<dyn HistoryStore>,
        transport: Arc<dyn Transport>,
        adapters: ProviderMap<Arc<dyn ProviderAdapter>>,
        keys: ApiKeySet,
        runtime: Handle,
    ) -> Self {
        let (sender, completions) = mpsc::unbounded_channel();
        Self {
            mode,
            session: Session::new(mode.config().history, store),
            dispatcher: Dispatcher::new(transport, adapters, runtime, sender),
            keys,
            completions,
        }
    }

    /// Engine talking to the real providers with the on-disk history log
    pub fn from_config(config: &AppConfig, mode: Mode, runtime: Handle) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        let store = FileHistoryStore::new(config.history_path());
        info!(?mode, history = %store.path().display(), keys = ?config.keys, "starting engine");

        Ok(Self::new(
            mode,
            Box::new(store),
            transport,
            build_adapters(&config.providers),
            config.keys.clone(),
            runtime,
        ))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn keys(&self) -> &ApiKeySet {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut ApiKeySet {
        &mut self.keys
    }

    /// Submit a question to all four providers.
    ///
    /// Returns `None` without calling anything when the question is blank.
    pub fn submit(&mut self, question: &str) -> Option<QueryId> {
        let query = self.session.begin(question, Utc::now())?;
        self.dispatcher.dispatch(&query, &self.keys);
        Some(query.id)
    }

    /// Apply every completion that has arrived so far, in arrival order
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut applied = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            self.session.apply(&completion);
            applied.push(completion);
        }
        applied
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.session.in_flight_count() == 0 {
            return None;
        }
        let completion = self.completions.recv().await?;
        self.session.apply(&completion);
        Some(completion)
    }
}
