//! Foundation types for Lemma Chain.
//!
//! Every other Lemma crate depends on `lemma-types`. Nothing in here touches
//! the store or the network; these are the value types and grammars shared by
//! node creation and chain resolution.
//!
//! # Key Types
//!
//! - [`NodeId`] / [`AccountId`]: internal store identities, never shown to clients
//! - [`Address`]: public `[@owner/]hashid` reference to a node
//! - [`ParentRef`]: `facet:[@owner/]hashid` edge declaration used at creation
//! - [`FacetLabel`] / [`FacetFilter`]: typed edge labels and resolver filters
//! - [`Actor`]: the authenticated account behind one request

pub mod account;
pub mod address;
pub mod error;
pub mod facet;
pub mod id;

pub use account::{normalize_account_name, normalize_email, validate_account_name, validate_email, Actor};
pub use address::{Address, ParentRef};
pub use error::{TypeError, TypeResult};
pub use facet::{FacetFilter, FacetLabel, MAX_FACET_LEN};
pub use id::{AccountId, NodeId};
