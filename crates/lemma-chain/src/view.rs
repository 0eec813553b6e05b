use serde::{Deserialize, Serialize};
use serde_json::Value;

use lemma_types::Address;

use crate::error::{ChainError, ChainResult};
use crate::tree::ChainNode;

/// Serialised form of a resolved chain.
///
/// ```json
/// {"id":"@alice/abc123","data":{"x":1},"refs":[{"id":"def456","data":{},"refs":[],"ref_type":"cites"}]}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainView {
    pub id: String,
    pub data: Value,
    pub refs: Vec<ChainView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
}

impl ChainView {
    /// Render a projected tree. Fails if any stored payload is not JSON.
    pub fn from_tree(node: &ChainNode) -> ChainResult<Self> {
        let data = serde_json::from_str(&node.data)
            .map_err(|_| ChainError::CorruptPayload(node.hashid.clone()))?;
        let refs = node
            .parents
            .iter()
            .map(ChainView::from_tree)
            .collect::<ChainResult<Vec<_>>>()?;

        Ok(Self {
            id: Address::new(node.owner.clone(), node.hashid.clone()).to_string(),
            data,
            refs,
            ref_type: node.facet.as_ref().map(|f| f.as_str().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_types::{FacetLabel, NodeId};

    fn node(hashid: &str, owner: Option<&str>, data: &str, facet: Option<&str>) -> ChainNode {
        ChainNode {
            id: NodeId::new(1),
            hashid: hashid.into(),
            owner: owner.map(String::from),
            data: data.into(),
            facet: facet.map(|f| FacetLabel::parse(f).unwrap()),
            parents: Vec::new(),
        }
    }

    #[test]
    fn root_omits_ref_type() {
        let view = ChainView::from_tree(&node("abc123", None, r#"{"x":1}"#, None)).unwrap();
        assert_eq!(
            serde_json::to_string(&view).unwrap(),
            r#"{"id":"abc123","data":{"x":1},"refs":[]}"#
        );
    }

    #[test]
    fn owned_parent_carries_prefix_and_facet() {
        let mut root = node("abc123", None, "{}", None);
        root.parents.push(node("def456", Some("alice"), r#"{"y":2}"#, Some("cites")));
        let view = ChainView::from_tree(&root).unwrap();
        assert_eq!(
            serde_json::to_string(&view).unwrap(),
            r#"{"id":"abc123","data":{},"refs":[{"id":"@alice/def456","data":{"y":2},"refs":[],"ref_type":"cites"}]}"#
        );
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let err = ChainView::from_tree(&node("abc123", None, "{not json", None)).unwrap_err();
        assert!(matches!(err, ChainError::CorruptPayload(h) if h == "abc123"));
    }
}
