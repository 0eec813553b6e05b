use std::sync::Arc;
use std::time::Duration;

use lemma_cache::ResponseCache;
use lemma_codec::AddressCodec;
use lemma_store::{GraphStore, Txn};
use lemma_types::{Address, FacetFilter, NodeId};

use crate::backfill::backfill_owners;
use crate::error::{ChainError, ChainResult};
use crate::tree::project;
use crate::view::ChainView;
use crate::walk::collect_ancestry;

/// Hops walked when no depth is requested, and the cap on any requested depth.
pub const DEFAULT_MAX_DEPTH_CEILING: usize = 256;

/// Reconstructs a node's ancestor chain on read.
pub struct ChainResolver {
    store: Arc<dyn GraphStore>,
    codec: Arc<AddressCodec>,
    cache: Arc<dyn ResponseCache<ChainView>>,
    query_timeout: Option<Duration>,
    max_depth_ceiling: usize,
}

impl ChainResolver {
    pub fn new(
        store: Arc<dyn GraphStore>,
        codec: Arc<AddressCodec>,
        cache: Arc<dyn ResponseCache<ChainView>>,
    ) -> Self {
        Self {
            store,
            codec,
            cache,
            query_timeout: None,
            max_depth_ceiling: DEFAULT_MAX_DEPTH_CEILING,
        }
    }

    /// Bound the whole read transaction. `None` or zero disables the bound.
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn with_max_depth_ceiling(mut self, ceiling: usize) -> Self {
        self.max_depth_ceiling = ceiling;
        self
    }

    /// Resolve `raw_address` into its chain, following at most `depth` hops
    /// along edges allowed by `filter`.
    ///
    /// Malformed addresses, unknown hashids and owner-scope mismatches are
    /// all [`ChainError::RefNotFound`].
    pub async fn resolve(
        &self,
        raw_address: &str,
        depth: Option<usize>,
        filter: &FacetFilter,
    ) -> ChainResult<ChainView> {
        let address = Address::parse(raw_address).map_err(|_| ChainError::RefNotFound)?;

        let cache_key = format!(
            "chain-{address}-{}-{}",
            depth.map(|d| d.to_string()).unwrap_or_default(),
            filter.cache_key()
        );
        if let Some(view) = self.cache.get(&cache_key) {
            tracing::debug!(key = %cache_key, "chain cache hit");
            return Ok(view);
        }
        tracing::debug!(key = %cache_key, "chain cache miss");

        let id = self
            .codec
            .decode(&address.hashid)
            .map_err(|_| ChainError::RefNotFound)?;
        let max_depth = depth
            .unwrap_or(self.max_depth_ceiling)
            .min(self.max_depth_ceiling);

        let load = self.load(&address, id, max_depth, filter);
        let view = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, load)
                .await
                .map_err(|_| ChainError::Timeout)??,
            None => load.await?,
        };

        self.cache.put(cache_key, view.clone());
        Ok(view)
    }

    async fn load(
        &self,
        address: &Address,
        id: NodeId,
        max_depth: usize,
        filter: &FacetFilter,
    ) -> ChainResult<ChainView> {
        let mut txn = self.store.begin_read_only().await?;
        let view = read_chain(txn.as_mut(), address, id, max_depth, filter).await;
        txn.discard().await;
        view
    }
}

async fn read_chain(
    txn: &mut dyn Txn,
    address: &Address,
    id: NodeId,
    max_depth: usize,
    filter: &FacetFilter,
) -> ChainResult<ChainView> {
    let handles = txn.find_by_hashids(std::slice::from_ref(&address.hashid)).await?;
    let handle = handles
        .into_iter()
        .find(|h| h.id == id)
        .ok_or(ChainError::RefNotFound)?;
    if !address.scope_matches(handle.owner_name.as_deref()) {
        return Err(ChainError::RefNotFound);
    }

    let root = txn
        .nodes_by_id(&[id])
        .await?
        .into_iter()
        .next()
        .ok_or(ChainError::RefNotFound)?;

    let fetched = collect_ancestry(txn, root, max_depth, filter).await?;
    let mut tree = project(id, &fetched, max_depth, filter).ok_or(ChainError::RefNotFound)?;
    backfill_owners(&mut tree);
    ChainView::from_tree(&tree)
}
