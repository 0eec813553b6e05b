//! Reference grammar.
//!
//! ```text
//! address    := ["@" owner "/"] hashid
//! parent-ref := facet ":" address
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::facet::FacetLabel;

const INVALID_PARENT: &str = "invalid parent ref";
const MISSING_PARENT: &str = "provided parent ref does not exist";

/// A public node address, optionally scoped to an owner.
///
/// The owner segment is kept exactly as written (minus the `@`). Comparing
/// it against the true owner is the caller's job.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub owner: Option<String>,
    pub hashid: String,
}

impl Address {
    pub fn new(owner: Option<String>, hashid: impl Into<String>) -> Self {
        Self {
            owner,
            hashid: hashid.into(),
        }
    }

    pub fn unowned(hashid: impl Into<String>) -> Self {
        Self::new(None, hashid)
    }

    pub fn owned(owner: impl Into<String>, hashid: impl Into<String>) -> Self {
        Self::new(Some(owner.into()), hashid)
    }

    /// Parse `[@owner/]hashid`.
    pub fn parse(raw: &str) -> TypeResult<Self> {
        let trimmed = raw.trim();
        let invalid = || TypeError::InvalidAddress(raw.to_string());
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            [hashid] => Ok(Self::unowned(*hashid)),
            [owner, hashid] => {
                let owner = owner.strip_prefix('@').ok_or_else(invalid)?.trim();
                if owner.is_empty() || hashid.is_empty() {
                    return Err(invalid());
                }
                Ok(Self::owned(owner, *hashid))
            }
            _ => Err(invalid()),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Returns `true` when the declared owner-scope matches `actual` exactly:
    /// both absent, or both present with equal names.
    pub fn scope_matches(&self, actual: Option<&str>) -> bool {
        self.owner.as_deref() == actual
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "@{owner}/{}", self.hashid),
            None => f.write_str(&self.hashid),
        }
    }
}

/// A typed parent edge as written in a creation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentRef {
    pub facet: FacetLabel,
    pub target: Address,
}

impl ParentRef {
    /// Parse `facet:[@owner/]hashid`.
    ///
    /// Only the first `:` separates the facet; the remainder is the address.
    /// An owner segment lacking its `@` can never name an existing node and
    /// is reported as such.
    pub fn parse(raw: &str) -> TypeResult<Self> {
        let invalid = || TypeError::InvalidParentRef(INVALID_PARENT.into());

        let trimmed = raw.trim();
        let (facet, remainder) = trimmed.split_once(':').ok_or_else(invalid)?;
        let facet = FacetLabel::parse(facet)?;

        let remainder = remainder.trim();
        if remainder.is_empty() {
            return Err(invalid());
        }

        let target = match remainder.split_once('/') {
            None => Address::unowned(remainder),
            Some((owner, hashid)) => {
                if owner.is_empty() {
                    return Err(invalid());
                }
                let owner = owner
                    .strip_prefix('@')
                    .ok_or_else(|| TypeError::InvalidParentRef(MISSING_PARENT.into()))?
                    .trim();
                if owner.is_empty() || hashid.is_empty() {
                    return Err(invalid());
                }
                Address::owned(owner, hashid)
            }
        };

        Ok(Self { facet, target })
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.facet, self.target)
    }
}
