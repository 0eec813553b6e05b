use std::sync::Arc;
use std::time::Duration;

use lemma_cache::{build_cache, ResponseCache};
use lemma_chain::{ChainResolver, ChainView};
use lemma_codec::AddressCodec;
use lemma_gate::{BotVerifier, CreationGate};
use lemma_ledger::{AccountService, Mailer, NodeCreator, SearchHit, SearchService};
use lemma_store::GraphStore;
use lemma_types::Actor;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// One response cache per value type, all with the configured lifetime.
#[derive(Clone)]
pub struct Caches {
    pub chains: Arc<dyn ResponseCache<ChainView>>,
    pub searches: Arc<dyn ResponseCache<Vec<SearchHit>>>,
    pub logins: Arc<dyn ResponseCache<Actor>>,
}

impl Caches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            chains: build_cache(ttl),
            searches: build_cache(ttl),
            logins: build_cache(ttl),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.chains.is_enabled()
    }

    /// Drop expired entries from every cache.
    pub fn purge_expired(&self) -> usize {
        self.chains.purge_expired() + self.searches.purge_expired() + self.logins.purge_expired()
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub creator: Arc<NodeCreator>,
    pub resolver: Arc<ChainResolver>,
    pub search: Arc<SearchService>,
    pub accounts: Arc<AccountService>,
    pub caches: Caches,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn GraphStore>,
        verifier: Arc<dyn BotVerifier>,
        mailer: Arc<dyn Mailer>,
    ) -> ServerResult<Self> {
        let codec = Arc::new(AddressCodec::new(&config.codec)?);
        let caches = Caches::new(config.cache_ttl()?);
        let timeout = config.query_timeout();

        let gate = CreationGate::with_default_stages(config.gate.clone(), Arc::clone(&verifier));
        let creator = NodeCreator::new(Arc::clone(&store), Arc::clone(&codec), gate);
        let resolver = ChainResolver::new(Arc::clone(&store), codec, Arc::clone(&caches.chains))
            .with_query_timeout(timeout);
        let search =
            SearchService::new(Arc::clone(&store), Arc::clone(&caches.searches)).with_query_timeout(timeout);
        let accounts = AccountService::new(
            store,
            verifier,
            mailer,
            Arc::clone(&caches.logins),
            config.server_url.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            creator: Arc::new(creator),
            resolver: Arc::new(resolver),
            search: Arc::new(search),
            accounts: Arc::new(accounts),
            caches,
        })
    }
}
