use serde::{Deserialize, Serialize};
use serde_json::Value;

use lemma_types::{Actor, ParentRef};

/// Body of a create-node request, as submitted by the client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    /// Account name or email the node should belong to.
    #[serde(default)]
    pub owner: Option<String>,
    /// Parent references of the form `facet:[@owner/]hashid`.
    #[serde(default)]
    pub parents: Option<Vec<String>>,
    /// A JSON object, or a string containing one.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub search_title: Option<String>,
    #[serde(default)]
    pub search_synopsis: Option<String>,
    #[serde(default)]
    pub recaptcha_code: String,
}

impl CreateNodeRequest {
    /// Convenience constructor for an object payload.
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn parent_refs(&self) -> &[String] {
        self.parents.as_deref().unwrap_or_default()
    }
}

/// The normalised node produced by a passing gate run.
///
/// Parent references are parsed but not yet resolved against the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeDraft {
    /// Compacted JSON object text.
    pub data: String,
    pub searchable: bool,
    pub search_title: Option<String>,
    pub search_synopsis: Option<String>,
    /// Set when the request claimed ownership and the claim was verified.
    pub owner: Option<Actor>,
    pub parents: Vec<ParentRef>,
}
