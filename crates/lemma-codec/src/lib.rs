//! Address codec for Lemma Chain.
//!
//! Node identities are store-assigned integers. Clients only ever see the
//! short, salted [hashids](https://hashids.org) form produced here. Encoding
//! is deterministic for a fixed [`CodecConfig`], so the salt must never change
//! once addresses have been handed out.

pub mod codec;
pub mod config;
pub mod error;

pub use codec::AddressCodec;
pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};
