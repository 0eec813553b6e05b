use std::collections::{HashMap, HashSet, VecDeque};

use lemma_store::NodeRecord;
use lemma_types::{FacetFilter, FacetLabel, NodeId};

/// One occurrence of a node in a resolved chain.
///
/// A node reachable along several paths appears once per path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainNode {
    pub id: NodeId,
    pub hashid: String,
    pub owner: Option<String>,
    /// Compacted JSON object text.
    pub data: String,
    /// Label of the edge this occurrence was reached through; `None` at the root.
    pub facet: Option<FacetLabel>,
    pub parents: Vec<ChainNode>,
}

impl ChainNode {
    fn from_record(record: &NodeRecord, facet: Option<FacetLabel>) -> Self {
        Self {
            id: record.id,
            hashid: record.hashid.clone(),
            owner: record.owner_name.clone(),
            data: record.data.clone(),
            facet,
            parents: Vec::new(),
        }
    }

    /// Total number of occurrences in this subtree, including `self`.
    pub fn occurrences(&self) -> usize {
        1 + self.parents.iter().map(ChainNode::occurrences).sum::<usize>()
    }
}

/// Build the chain tree rooted at `root` from records fetched by the walk.
///
/// Edges are followed in stored order, limited to `max_depth` hops and to
/// facets allowed by `filter`. Edges to records that were not fetched are
/// dropped. An edge back to a node already on the current path is cut.
///
/// Each identity has its parents expanded once, at the first occurrence
/// found at its shortest distance from the root. Every other occurrence is
/// emitted as a leaf, so the tree stays linear in the number of edges.
pub fn project(
    root: NodeId,
    fetched: &HashMap<NodeId, NodeRecord>,
    max_depth: usize,
    filter: &FacetFilter,
) -> Option<ChainNode> {
    let mut projection = Projection {
        fetched,
        max_depth,
        filter,
        distances: distances(root, fetched, max_depth, filter),
        expanded: HashSet::new(),
        path: HashSet::new(),
    };
    projection.node(root, None, 0)
}

/// Shortest hop count from `root` to every reachable fetched record.
fn distances(
    root: NodeId,
    fetched: &HashMap<NodeId, NodeRecord>,
    max_depth: usize,
    filter: &FacetFilter,
) -> HashMap<NodeId, usize> {
    let mut distances = HashMap::new();
    if !fetched.contains_key(&root) {
        return distances;
    }
    distances.insert(root, 0);
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let depth = distances[&id];
        if depth >= max_depth {
            continue;
        }
        let Some(record) = fetched.get(&id) else {
            continue;
        };
        for edge in &record.parents {
            if filter.allows(edge.facet.as_str())
                && fetched.contains_key(&edge.target)
                && !distances.contains_key(&edge.target)
            {
                distances.insert(edge.target, depth + 1);
                queue.push_back(edge.target);
            }
        }
    }
    distances
}

struct Projection<'a> {
    fetched: &'a HashMap<NodeId, NodeRecord>,
    max_depth: usize,
    filter: &'a FacetFilter,
    distances: HashMap<NodeId, usize>,
    expanded: HashSet<NodeId>,
    path: HashSet<NodeId>,
}

impl Projection<'_> {
    fn node(&mut self, id: NodeId, facet: Option<FacetLabel>, depth: usize) -> Option<ChainNode> {
        let record = self.fetched.get(&id)?;
        let mut node = ChainNode::from_record(record, facet);
        if depth >= self.max_depth
            || self.distances.get(&id) != Some(&depth)
            || !self.expanded.insert(id)
        {
            return Some(node);
        }

        self.path.insert(id);
        for edge in &record.parents {
            if !self.filter.allows(edge.facet.as_str()) {
                continue;
            }
            if self.path.contains(&edge.target) {
                tracing::warn!(node = %id, parent = %edge.target, "cycle in stored chain cut");
                continue;
            }
            if let Some(child) = self.node(edge.target, Some(edge.facet.clone()), depth + 1) {
                node.parents.push(child);
            }
        }
        self.path.remove(&id);

        Some(node)
    }
}
