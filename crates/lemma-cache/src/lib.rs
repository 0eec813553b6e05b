//! Response caching for Lemma Chain.
//!
//! Caches are advisory. Entries expire after a fixed TTL and are never
//! invalidated on write; nodes are immutable, so the only staleness a reader
//! can observe is an owner whose account was removed within the window.
//!
//! A zero duration disables caching entirely via [`NoCache`].

pub mod memory;
pub mod traits;

pub use memory::{NoCache, TtlCache};
pub use traits::{build_cache, ResponseCache};
