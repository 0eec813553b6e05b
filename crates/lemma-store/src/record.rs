use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lemma_types::{AccountId, FacetLabel, NodeId};

/// A typed edge from a node to one of its parents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEdge {
    pub target: NodeId,
    pub facet: FacetLabel,
}

/// A node as handed to [`Txn::insert_node`](crate::Txn::insert_node).
///
/// The store assigns the identity and creation timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNode {
    pub owner: Option<AccountId>,
    /// Compacted JSON object text.
    pub data: String,
    pub searchable: bool,
    pub search_title: Option<String>,
    pub search_synopsis: Option<String>,
    pub parents: Vec<ParentEdge>,
}

/// The minimal view of a node needed to check a reference against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHandle {
    pub id: NodeId,
    pub hashid: String,
    /// Name of the owning account; `None` for unowned nodes and for nodes
    /// whose owner account no longer exists.
    pub owner_name: Option<String>,
}

/// A committed node with its outgoing parent edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub hashid: String,
    /// Owning account name, when the backend expanded it.
    pub owner_name: Option<String>,
    pub data: String,
    pub searchable: bool,
    pub search_title: Option<String>,
    pub search_synopsis: Option<String>,
    pub created_at: DateTime<Utc>,
    pub parents: Vec<ParentEdge>,
}

impl NodeRecord {
    pub fn handle(&self) -> NodeHandle {
        NodeHandle {
            id: self.id,
            hashid: self.hashid.clone(),
            owner_name: self.owner_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activation_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub validated: bool,
    pub activation_code: Option<String>,
    pub created_at: DateTime<Utc>,
}
