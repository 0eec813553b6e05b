//! In-memory graph store for tests and single-process deployments.
//!
//! [`InMemoryGraphStore`] keeps committed state in `HashMap`s behind a
//! `RwLock`. Write transactions buffer their mutations and
//! apply them under one write lock at commit, after checking hashid, account
//! name and email uniqueness. Identities come from atomic counters at insert
//! time, so an aborted transaction burns the identity it reserved.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use lemma_types::{AccountId, NodeId};

use crate::error::{StoreError, StoreResult};
use crate::record::{AccountRecord, NewAccount, NewNode, NodeHandle, NodeRecord, ParentEdge};
use crate::search::matches_all_terms;
use crate::traits::{GraphStore, Txn};

#[derive(Debug, Clone)]
struct StoredNode {
    id: NodeId,
    hashid: String,
    owner: Option<AccountId>,
    data: String,
    searchable: bool,
    search_title: Option<String>,
    search_synopsis: Option<String>,
    created_at: DateTime<Utc>,
    parents: Vec<ParentEdge>,
}

#[derive(Debug, Default)]
struct State {
    nodes: HashMap<NodeId, StoredNode>,
    by_hashid: HashMap<String, NodeId>,
    accounts: HashMap<AccountId, AccountRecord>,
    by_name: HashMap<String, AccountId>,
    by_email: HashMap<String, AccountId>,
}

impl State {
    fn record(&self, node: &StoredNode) -> NodeRecord {
        NodeRecord {
            id: node.id,
            hashid: node.hashid.clone(),
            owner_name: self.owner_name(node.owner),
            data: node.data.clone(),
            searchable: node.searchable,
            search_title: node.search_title.clone(),
            search_synopsis: node.search_synopsis.clone(),
            created_at: node.created_at,
            parents: node.parents.clone(),
        }
    }

    fn owner_name(&self, owner: Option<AccountId>) -> Option<String> {
        owner
            .and_then(|id| self.accounts.get(&id))
            .map(|account| account.name.clone())
    }

    fn newest_first(&self, mut nodes: Vec<&StoredNode>) -> Vec<NodeRecord> {
        nodes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        nodes.into_iter().map(|node| self.record(node)).collect()
    }

    fn remove_account(&mut self, id: AccountId) {
        if let Some(account) = self.accounts.remove(&id) {
            self.by_name.remove(&account.name);
            self.by_email.remove(&account.email);
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: RwLock<State>,
    next_node: AtomicU64,
    next_account: AtomicU64,
}

impl Shared {
    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

/// An in-memory implementation of [`GraphStore`].
///
/// Cloning yields another handle to the same data. Data is lost when the
/// last handle is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryGraphStore {
    shared: Arc<Shared>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State::default()),
                next_node: AtomicU64::new(1),
                next_account: AtomicU64::new(1),
            }),
        }
    }

    /// Number of committed nodes.
    pub fn node_count(&self) -> usize {
        self.shared.read().map(|s| s.nodes.len()).unwrap_or_default()
    }

    /// Number of committed accounts.
    pub fn account_count(&self) -> usize {
        self.shared.read().map(|s| s.accounts.len()).unwrap_or_default()
    }

    fn txn(&self, read_only: bool) -> MemoryTxn {
        MemoryTxn {
            shared: Arc::clone(&self.shared),
            read_only,
            nodes: Vec::new(),
            accounts: Vec::new(),
            activations: Vec::new(),
            cleanup_before: None,
        }
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn begin(&self) -> StoreResult<Box<dyn Txn>> {
        Ok(Box::new(self.txn(false)))
    }

    async fn begin_read_only(&self) -> StoreResult<Box<dyn Txn>> {
        Ok(Box::new(self.txn(true)))
    }
}

#[derive(Debug)]
struct PendingNode {
    id: NodeId,
    node: NewNode,
    hashid: Option<String>,
    created_at: DateTime<Utc>,
}

struct MemoryTxn {
    shared: Arc<Shared>,
    read_only: bool,
    nodes: Vec<PendingNode>,
    accounts: Vec<AccountRecord>,
    activations: Vec<(AccountId, String)>,
    cleanup_before: Option<DateTime<Utc>>,
}

impl MemoryTxn {
    fn writable(&self) -> StoreResult<()> {
        if self.read_only {
            Err(StoreError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn check(&self, state: &State) -> StoreResult<()> {
        let mut hashids = HashSet::new();
        let pending_ids: HashSet<NodeId> = self.nodes.iter().map(|p| p.id).collect();
        for pending in &self.nodes {
            let hashid = pending.hashid.as_ref().ok_or_else(|| {
                StoreError::Conflict(format!("node {} has no address", pending.id))
            })?;
            if state.by_hashid.contains_key(hashid) || !hashids.insert(hashid) {
                return Err(StoreError::Conflict(format!("hashid {hashid} already assigned")));
            }
            for edge in &pending.node.parents {
                if !state.nodes.contains_key(&edge.target) && !pending_ids.contains(&edge.target) {
                    return Err(StoreError::Conflict(format!("parent {} does not exist", edge.target)));
                }
            }
        }

        let mut names = HashSet::new();
        let mut emails = HashSet::new();
        for account in &self.accounts {
            if state.by_name.contains_key(&account.name) || !names.insert(&account.name) {
                return Err(StoreError::Conflict(format!("account name {} is taken", account.name)));
            }
            if state.by_email.contains_key(&account.email) || !emails.insert(&account.email) {
                return Err(StoreError::Conflict(format!("email {} is taken", account.email)));
            }
        }

        for (id, _) in &self.activations {
            if !state.accounts.contains_key(id) {
                return Err(StoreError::NotFound(format!("account {id}")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Txn for MemoryTxn {
    async fn find_by_hashids(&mut self, hashids: &[String]) -> StoreResult<Vec<NodeHandle>> {
        let state = self.shared.read()?;
        Ok(hashids
            .iter()
            .filter_map(|h| state.by_hashid.get(h))
            .filter_map(|id| state.nodes.get(id))
            .map(|node| NodeHandle {
                id: node.id,
                hashid: node.hashid.clone(),
                owner_name: state.owner_name(node.owner),
            })
            .collect())
    }

    async fn nodes_by_id(&mut self, ids: &[NodeId]) -> StoreResult<Vec<NodeRecord>> {
        let state = self.shared.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.nodes.get(id))
            .map(|node| state.record(node))
            .collect())
    }

    async fn search(&mut self, terms: &[String]) -> StoreResult<Vec<NodeRecord>> {
        let state = self.shared.read()?;
        let matching = state
            .nodes
            .values()
            .filter(|node| {
                node.searchable
                    && matches_all_terms(
                        node.search_title.as_deref(),
                        node.search_synopsis.as_deref(),
                        terms,
                    )
            })
            .collect();
        Ok(state.newest_first(matching))
    }

    async fn owned_nodes(&mut self, owner: AccountId) -> StoreResult<Vec<NodeRecord>> {
        let state = self.shared.read()?;
        let owned = state
            .nodes
            .values()
            .filter(|node| node.owner == Some(owner))
            .collect();
        Ok(state.newest_first(owned))
    }

    async fn account_by_name(&mut self, name: &str) -> StoreResult<Option<AccountRecord>> {
        let state = self.shared.read()?;
        Ok(state
            .by_name
            .get(name)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn account_by_email(&mut self, email: &str) -> StoreResult<Option<AccountRecord>> {
        let state = self.shared.read()?;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn account_by_code(&mut self, code: &str) -> StoreResult<Option<AccountRecord>> {
        let state = self.shared.read()?;
        Ok(state
            .accounts
            .values()
            .find(|a| a.activation_code.as_deref() == Some(code))
            .cloned())
    }

    async fn insert_node(&mut self, node: NewNode) -> StoreResult<NodeId> {
        self.writable()?;
        let id = NodeId::new(self.shared.next_node.fetch_add(1, Ordering::SeqCst));
        self.nodes.push(PendingNode {
            id,
            node,
            hashid: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn set_hashid(&mut self, id: NodeId, hashid: String) -> StoreResult<()> {
        self.writable()?;
        let pending = self
            .nodes
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("node {id} is not pending in this transaction")))?;
        pending.hashid = Some(hashid);
        Ok(())
    }

    async fn insert_account(&mut self, account: NewAccount) -> StoreResult<AccountId> {
        self.writable()?;
        let id = AccountId::new(self.shared.next_account.fetch_add(1, Ordering::SeqCst));
        self.accounts.push(AccountRecord {
            id,
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            validated: false,
            activation_code: Some(account.activation_code),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn activate_account(&mut self, id: AccountId, next_code: String) -> StoreResult<()> {
        self.writable()?;
        self.activations.push((id, next_code));
        Ok(())
    }

    async fn delete_unvalidated_before(&mut self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        self.writable()?;
        let count = {
            let state = self.shared.read()?;
            state
                .accounts
                .values()
                .filter(|a| !a.validated && a.created_at < cutoff)
                .count()
        };
        self.cleanup_before = Some(cutoff);
        Ok(count)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        if self.read_only {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        let mut state = shared.write()?;
        self.check(&state)?;

        let this = *self;
        let (node_count, account_count) = (this.nodes.len(), this.accounts.len());

        for account in this.accounts {
            state.by_name.insert(account.name.clone(), account.id);
            state.by_email.insert(account.email.clone(), account.id);
            state.accounts.insert(account.id, account);
        }

        for pending in this.nodes {
            let Some(hashid) = pending.hashid else {
                continue;
            };
            state.by_hashid.insert(hashid.clone(), pending.id);
            state.nodes.insert(
                pending.id,
                StoredNode {
                    id: pending.id,
                    hashid,
                    owner: pending.node.owner,
                    data: pending.node.data,
                    searchable: pending.node.searchable,
                    search_title: pending.node.search_title,
                    search_synopsis: pending.node.search_synopsis,
                    created_at: pending.created_at,
                    parents: pending.node.parents,
                },
            );
        }

        for (id, next_code) in this.activations {
            if let Some(account) = state.accounts.get_mut(&id) {
                account.validated = true;
                account.activation_code = Some(next_code);
            }
        }

        if let Some(cutoff) = this.cleanup_before {
            let expired: Vec<AccountId> = state
                .accounts
                .values()
                .filter(|a| !a.validated && a.created_at < cutoff)
                .map(|a| a.id)
                .collect();
            for id in expired {
                state.remove_account(id);
            }
        }

        tracing::debug!(nodes = node_count, accounts = account_count, "transaction committed");
        Ok(())
    }

    async fn discard(self: Box<Self>) {
        if !self.nodes.is_empty() || !self.accounts.is_empty() {
            tracing::debug!(
                nodes = self.nodes.len(),
                accounts = self.accounts.len(),
                "transaction discarded"
            );
        }
    }
}
