use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::session::{Completion, PendingQuery};
use crate::config::ApiKeySet;
use crate::models::{ProviderId, ProviderMap};
use crate::providers::{ProviderAdapter, Transport, call_provider};

/// Fans one query out to every provider as independent tasks.
///
/// Nothing waits for a task: each reports its [`Completion`] on the channel
/// whenever it finishes, and a dropped receiver simply discards it.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    adapters: ProviderMap<Arc<dyn ProviderAdapter>>,
    runtime: Handle,
    completions: UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        adapters: ProviderMap<Arc<dyn ProviderAdapter>>,
        runtime: Handle,
        completions: UnboundedSender<Completion>,
    ) -> Self {
        Self { transport, adapters, runtime, completions }
    }

    /// Spawn one call per provider for `query`
    pub fn dispatch(&self, query: &PendingQuery, keys: &ApiKeySet) {
        debug!(query_id = query.id, "dispatching query");
        for provider in ProviderId::ALL {
            self.spawn_call(query, provider, keys.get(provider).to_string());
        }
    }

    fn spawn_call(&self, query: &PendingQuery, provider: ProviderId, api_key: String) {
        let transport = Arc::clone(&self.transport);
        let adapter = Arc::clone(&self.adapters[provider]);
        let sender = self.completions.clone();
        let messages = query.messages[provider].clone();
        let query_id = query.id;

        if api_key.is_empty() {
            debug!(%provider, "no API key configured, calling anyway");
        }

        self.runtime.spawn(async move {
            let result = call_provider(transport.as_ref(), adapter.as_ref(), &messages, &api_key).await;
            if let Err(e) = &result {
                warn!(%provider, query_id, "provider call failed: {}", e);
            }
            let _ = sender.send(Completion { query_id, provider, result });
        });
    }
}
