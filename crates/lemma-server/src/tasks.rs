use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::state::AppState;

pub const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

pub const ACCOUNT_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Start the periodic maintenance tasks: expired cache entries are purged
/// every ten minutes and stale unvalidated accounts are removed daily.
pub fn spawn_maintenance(state: AppState) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    if state.caches.is_enabled() {
        let caches = state.caches.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + CACHE_PURGE_INTERVAL, CACHE_PURGE_INTERVAL);
            loop {
                ticker.tick().await;
                let purged = caches.purge_expired();
                tracing::debug!(purged, "cache entries purged");
            }
        }));
    }

    let accounts = state.accounts.clone();
    handles.push(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + ACCOUNT_CLEANUP_INTERVAL, ACCOUNT_CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = accounts.cleanup(Utc::now()).await {
                tracing::error!(error = %e, "account cleanup failed");
            }
        }
    }));

    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lemma_gate::FixedVerifier;
    use lemma_ledger::MemoryMailer;
    use lemma_store::InMemoryGraphStore;

    use crate::config::ServerConfig;

    fn state(cache_duration_mins: u64) -> AppState {
        let config = ServerConfig {
            cache_duration_mins,
            ..ServerConfig::default()
        };
        AppState::new(
            config,
            Arc::new(InMemoryGraphStore::new()),
            Arc::new(FixedVerifier::accept_all()),
            Arc::new(MemoryMailer::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn purge_task_only_with_enabled_caches() {
        let with_cache = spawn_maintenance(state(15));
        assert_eq!(with_cache.len(), 2);

        let without_cache = spawn_maintenance(state(0));
        assert_eq!(without_cache.len(), 1);

        for handle in with_cache.into_iter().chain(without_cache) {
            handle.abort();
            assert!(handle.await.unwrap_err().is_cancelled());
        }
    }
}
