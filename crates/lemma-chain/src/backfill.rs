use std::collections::HashMap;

use lemma_types::NodeId;

use crate::tree::ChainNode;

/// Copy owner names onto occurrences that lack them.
///
/// Some backends expand a node's owner only on its first occurrence in a
/// traversal. Pass one records `identity -> owner` from every occurrence that
/// carries one; pass two fills the rest from that table. Genuinely unowned
/// nodes have no entry and stay unowned.
pub fn backfill_owners(root: &mut ChainNode) {
    let mut owners = HashMap::new();
    collect_owners(root, &mut owners);
    if !owners.is_empty() {
        fill_owners(root, &owners);
    }
}

fn collect_owners(node: &ChainNode, owners: &mut HashMap<NodeId, String>) {
    if let Some(owner) = &node.owner {
        owners.entry(node.id).or_insert_with(|| owner.clone());
    }
    for parent in &node.parents {
        collect_owners(parent, owners);
    }
}

fn fill_owners(node: &mut ChainNode, owners: &HashMap<NodeId, String>) {
    if node.owner.is_none() {
        node.owner = owners.get(&node.id).cloned();
    }
    for parent in &mut node.parents {
        fill_owners(parent, owners);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, owner: Option<&str>, parents: Vec<ChainNode>) -> ChainNode {
        ChainNode {
            id: NodeId::new(id),
            hashid: format!("h{id}"),
            owner: owner.map(String::from),
            data: "{}".into(),
            facet: None,
            parents,
        }
    }

    #[test]
    fn fills_repeated_occurrence() {
        // Ancestor 1 reached twice, owner expanded only on the first path.
        let mut root = node(
            4,
            None,
            vec![
                node(2, None, vec![node(1, Some("alice"), vec![])]),
                node(3, None, vec![node(1, None, vec![])]),
            ],
        );
        backfill_owners(&mut root);
        assert_eq!(root.parents[0].parents[0].owner.as_deref(), Some("alice"));
        assert_eq!(root.parents[1].parents[0].owner.as_deref(), Some("alice"));
    }

    #[test]
    fn fills_even_when_owner_appears_later() {
        let mut root = node(
            4,
            None,
            vec![
                node(2, None, vec![node(1, None, vec![])]),
                node(3, None, vec![node(1, Some("alice"), vec![])]),
            ],
        );
        backfill_owners(&mut root);
        assert_eq!(root.parents[0].parents[0].owner.as_deref(), Some("alice"));
    }

    #[test]
    fn unowned_nodes_stay_unowned() {
        let mut root = node(2, Some("bob"), vec![node(1, None, vec![])]);
        backfill_owners(&mut root);
        assert_eq!(root.owner.as_deref(), Some("bob"));
        assert_eq!(root.parents[0].owner, None);
    }
}
