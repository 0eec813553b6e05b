//! Facet labels: the free-form semantic type carried by a parent edge.
//!
//! Rules for a label:
//! - Must be non-empty after trimming
//! - At most [`MAX_FACET_LEN`] characters
//! - Must not contain `"`, `@` or `/`

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Maximum length of a facet label, in characters.
pub const MAX_FACET_LEN: usize = 75;

/// Characters that would make a label ambiguous inside a reference string.
const FORBIDDEN_CHARS: &[char] = &['"', '@', '/'];

/// A validated facet label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetLabel(String);

impl FacetLabel {
    /// Validate and wrap a label. Surrounding whitespace is trimmed.
    pub fn parse(raw: &str) -> TypeResult<Self> {
        let label = raw.trim();
        if label.is_empty() {
            return Err(TypeError::InvalidFacet(
                "invalid parent: ref type must not be empty".into(),
            ));
        }
        if label.chars().count() > MAX_FACET_LEN {
            return Err(TypeError::InvalidFacet(format!(
                "invalid parent: ref type must be at most {MAX_FACET_LEN} characters"
            )));
        }
        if label.contains(FORBIDDEN_CHARS) {
            return Err(TypeError::InvalidFacet(
                "invalid parent: ref type must not contain \", @ or /".into(),
            ));
        }
        Ok(Self(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FacetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FacetLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A set of facet labels restricting which edges a traversal may follow.
///
/// The empty filter allows every edge. Labels are kept sorted so that two
/// filters with the same members always produce the same [`cache_key`].
///
/// [`cache_key`]: FacetFilter::cache_key
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilter(BTreeSet<FacetLabel>);

impl FacetFilter {
    /// The filter that allows every edge.
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"cites, extends"`.
    ///
    /// Blank entries are dropped; every remaining entry must be a valid label.
    pub fn parse_list(raw: &str) -> TypeResult<Self> {
        let mut set = BTreeSet::new();
        for part in raw.split(',') {
            if part.trim().is_empty() {
                continue;
            }
            set.insert(FacetLabel::parse(part)?);
        }
        Ok(Self(set))
    }

    pub fn from_labels(labels: impl IntoIterator<Item = FacetLabel>) -> Self {
        Self(labels.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if an edge labelled `facet` may be followed.
    pub fn allows(&self, facet: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|label| label.as_str() == facet)
    }

    /// Sorted, comma-joined form used in cache keys.
    pub fn cache_key(&self) -> String {
        self.0
            .iter()
            .map(FacetLabel::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_labels() {
        assert_eq!(FacetLabel::parse("cites").unwrap().as_str(), "cites");
        assert_eq!(FacetLabel::parse("  extends ").unwrap().as_str(), "extends");
        assert!(FacetLabel::parse("has space").is_ok());
        assert!(FacetLabel::parse(&"x".repeat(MAX_FACET_LEN)).is_ok());
    }

    #[test]
    fn reject_empty_label() {
        let err = FacetLabel::parse("   ").unwrap_err();
        assert_eq!(err.to_string(), "invalid parent: ref type must not be empty");
    }

    #[test]
    fn reject_long_label() {
        let err = FacetLabel::parse(&"x".repeat(MAX_FACET_LEN + 1)).unwrap_err();
        assert_eq!(err.to_string(), "invalid parent: ref type must be at most 75 characters");
    }

    #[test]
    fn reject_forbidden_chars() {
        assert!(FacetLabel::parse("a\"b").is_err());
        assert!(FacetLabel::parse("a@b").is_err());
        assert!(FacetLabel::parse("a/b").is_err());
    }

    #[test]
    fn empty_filter_allows_everything() {
        let filter = FacetFilter::any();
        assert!(filter.is_empty());
        assert!(filter.allows("cites"));
        assert!(filter.allows("anything"));
    }

    #[test]
    fn filter_restricts_edges() {
        let filter = FacetFilter::parse_list("cites").unwrap();
        assert!(filter.allows("cites"));
        assert!(!filter.allows("extends"));
    }

    #[test]
    fn parse_list_drops_blanks_and_sorts() {
        let filter = FacetFilter::parse_list(" extends,, cites ,").unwrap();
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.cache_key(), "cites,extends");
    }

    #[test]
    fn cache_key_ignores_input_order() {
        let a = FacetFilter::parse_list("b,a").unwrap();
        let b = FacetFilter::parse_list("a,b").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn parse_list_rejects_bad_label() {
        assert!(FacetFilter::parse_list("cites,@bad").is_err());
    }
}
