use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lemma_cache::ResponseCache;
use lemma_store::{tokenize, GraphStore, NodeRecord};
use lemma_types::Address;

use crate::error::{LedgerError, LedgerResult};

/// One search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub data: Value,
    pub search_title: Option<String>,
    pub search_synopsis: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SearchHit {
    fn from_record(record: NodeRecord) -> LedgerResult<Self> {
        let data = serde_json::from_str(&record.data)
            .map_err(|_| LedgerError::CorruptPayload(record.hashid.clone()))?;
        Ok(Self {
            id: Address::new(record.owner_name, record.hashid).to_string(),
            data,
            search_title: record.search_title,
            search_synopsis: record.search_synopsis,
            created_at: record.created_at,
        })
    }
}

/// Text search over searchable nodes, newest first.
pub struct SearchService {
    store: Arc<dyn GraphStore>,
    cache: Arc<dyn ResponseCache<Vec<SearchHit>>>,
    query_timeout: Option<Duration>,
}

impl SearchService {
    pub fn new(store: Arc<dyn GraphStore>, cache: Arc<dyn ResponseCache<Vec<SearchHit>>>) -> Self {
        Self {
            store,
            cache,
            query_timeout: None,
        }
    }

    /// Bound each search read. `None` or zero disables the bound.
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Nodes whose title contains every term, or whose synopsis does.
    /// Blank input matches nothing.
    pub async fn search(&self, raw_terms: &str) -> LedgerResult<Vec<SearchHit>> {
        let terms = tokenize(raw_terms);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let key = format!("search-{}", terms.join(" "));
        if let Some(hits) = self.cache.get(&key) {
            tracing::debug!(%key, "search cache hit");
            return Ok(hits);
        }
        tracing::debug!(%key, "search cache miss");

        let hits = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, self.load(&terms))
                .await
                .map_err(|_| LedgerError::Timeout)??,
            None => self.load(&terms).await?,
        };
        self.cache.put(key, hits.clone());
        Ok(hits)
    }

    async fn load(&self, terms: &[String]) -> LedgerResult<Vec<SearchHit>> {
        let mut txn = self.store.begin_read_only().await?;
        let records = txn.search(terms).await;
        txn.discard().await;
        records?.into_iter().map(SearchHit::from_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_cache::{NoCache, TtlCache};
    use lemma_store::{InMemoryGraphStore, NewNode};

    async fn searchable(store: &InMemoryGraphStore, hashid: &str, title: Option<&str>, synopsis: Option<&str>) {
        let mut txn = store.begin().await.unwrap();
        let id = txn
            .insert_node(NewNode {
                owner: None,
                data: format!(r#"{{"h":"{hashid}"}}"#),
                searchable: true,
                search_title: title.map(String::from),
                search_synopsis: synopsis.map(String::from),
                parents: Vec::new(),
            })
            .await
            .unwrap();
        txn.set_hashid(id, hashid.into()).await.unwrap();
        txn.commit().await.unwrap();
    }

    fn service(store: &InMemoryGraphStore) -> SearchService {
        SearchService::new(Arc::new(store.clone()), Arc::new(NoCache))
    }

    #[tokio::test]
    async fn matches_title_or_synopsis() {
        let store = InMemoryGraphStore::new();
        searchable(&store, "aaaaaa", Some("Rust ownership"), None).await;
        searchable(&store, "bbbbbb", None, Some("a note on ownership in rust")).await;
        searchable(&store, "cccccc", Some("Rust"), Some("ownership")).await;

        let hits = service(&store).search("rust  OWNERSHIP").await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["bbbbbb", "aaaaaa"]);
        assert_eq!(hits[1].data, serde_json::json!({"h": "aaaaaa"}));
        assert_eq!(hits[1].search_title.as_deref(), Some("Rust ownership"));
    }

    #[tokio::test]
    async fn blank_terms_match_nothing() {
        let store = InMemoryGraphStore::new();
        searchable(&store, "aaaaaa", Some("anything"), None).await;
        assert!(service(&store).search("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_are_cached_until_expiry() {
        let store = InMemoryGraphStore::new();
        searchable(&store, "aaaaaa", Some("graph"), None).await;
        let cache: Arc<TtlCache<Vec<SearchHit>>> = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let service = SearchService::new(Arc::new(store.clone()), cache.clone());

        assert_eq!(service.search("graph").await.unwrap().len(), 1);
        searchable(&store, "bbbbbb", Some("graph"), None).await;
        // Stale until the entry expires.
        assert_eq!(service.search("graph").await.unwrap().len(), 1);
        assert_eq!(cache.len(), 1);
    }
}
