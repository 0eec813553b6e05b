//! Chain resolution for Lemma Chain.
//!
//! A chain is the ancestor DAG reachable from a node by following parent
//! edges. Resolution happens in four steps:
//!
//! 1. [`walk::collect_ancestry`] fetches ancestors breadth-first, one batched
//!    store read per level, each node at most once.
//! 2. [`tree::project`] builds the response tree from the fetched records,
//!    repeating shared ancestors under every path and cutting cycles.
//! 3. [`backfill::backfill_owners`] copies owner names onto occurrences that
//!    arrived without them.
//! 4. [`ChainView`] is the serialised form, cached by [`ChainResolver`].

pub mod backfill;
pub mod error;
pub mod resolver;
pub mod tree;
pub mod view;
pub mod walk;

pub use backfill::backfill_owners;
pub use error::{ChainError, ChainResult};
pub use resolver::{ChainResolver, DEFAULT_MAX_DEPTH_CEILING};
pub use tree::ChainNode;
pub use view::ChainView;
