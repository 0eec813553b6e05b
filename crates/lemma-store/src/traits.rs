use async_trait::async_trait;
use chrono::{DateTime, Utc};

use lemma_types::{AccountId, NodeId};

use crate::error::StoreResult;
use crate::record::{AccountRecord, NewAccount, NewNode, NodeHandle, NodeRecord};

/// Transactional access to the node graph and accounts.
///
/// All implementations must satisfy these invariants:
/// - Reads inside a transaction see committed state as of the read.
/// - Mutations are buffered and become visible only on [`Txn::commit`].
/// - A transaction that is discarded or dropped leaves no trace.
/// - Committed nodes are immutable and never deleted.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a transaction that may mutate.
    async fn begin(&self) -> StoreResult<Box<dyn Txn>>;

    /// Open a transaction that rejects every mutation.
    async fn begin_read_only(&self) -> StoreResult<Box<dyn Txn>>;
}

/// One unit of work against a [`GraphStore`].
///
/// Dropping a transaction without committing discards it. Batched reads
/// silently skip identities or hashids that do not exist.
#[async_trait]
pub trait Txn: Send {
    /// Look up nodes by hashid in one round-trip.
    async fn find_by_hashids(&mut self, hashids: &[String]) -> StoreResult<Vec<NodeHandle>>;

    /// Fetch full node records in one round-trip, in the order requested.
    async fn nodes_by_id(&mut self, ids: &[NodeId]) -> StoreResult<Vec<NodeRecord>>;

    /// Searchable nodes matching the tokenized `terms`, newest first.
    async fn search(&mut self, terms: &[String]) -> StoreResult<Vec<NodeRecord>>;

    /// Every node owned by `owner`, newest first.
    async fn owned_nodes(&mut self, owner: AccountId) -> StoreResult<Vec<NodeRecord>>;

    async fn account_by_name(&mut self, name: &str) -> StoreResult<Option<AccountRecord>>;

    async fn account_by_email(&mut self, email: &str) -> StoreResult<Option<AccountRecord>>;

    async fn account_by_code(&mut self, code: &str) -> StoreResult<Option<AccountRecord>>;

    /// Buffer a new node and return the identity reserved for it.
    async fn insert_node(&mut self, node: NewNode) -> StoreResult<NodeId>;

    /// Attach the public hashid to a node inserted by this transaction.
    async fn set_hashid(&mut self, id: NodeId, hashid: String) -> StoreResult<()>;

    async fn insert_account(&mut self, account: NewAccount) -> StoreResult<AccountId>;

    /// Mark an account validated and replace its activation code.
    async fn activate_account(&mut self, id: AccountId, next_code: String) -> StoreResult<()>;

    /// Delete unvalidated accounts created before `cutoff`. Returns how many
    /// currently qualify.
    async fn delete_unvalidated_before(&mut self, cutoff: DateTime<Utc>) -> StoreResult<usize>;

    /// Apply every buffered mutation atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Abandon the transaction.
    async fn discard(self: Box<Self>);
}
