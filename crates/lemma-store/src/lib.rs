//! Graph storage for Lemma Chain.
//!
//! The request-facing logic never talks to a database directly. It opens a
//! [`Txn`] from a [`GraphStore`], performs batched reads and buffered writes,
//! and either commits or discards. Any transactional graph database can back
//! these traits; [`InMemoryGraphStore`] is the reference backend used by the
//! server binary and by tests.

pub mod error;
pub mod memory;
pub mod record;
pub mod search;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryGraphStore;
pub use record::{AccountRecord, NewAccount, NewNode, NodeHandle, NodeRecord, ParentEdge};
pub use search::{matches_all_terms, tokenize};
pub use traits::{GraphStore, Txn};
