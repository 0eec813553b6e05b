use std::collections::{HashMap, HashSet};

use lemma_store::{NodeRecord, StoreResult, Txn};
use lemma_types::{FacetFilter, NodeId};

/// Fetch every ancestor of `root` reachable within `max_depth` hops along
/// edges allowed by `filter`.
///
/// The walk is breadth-first with one `nodes_by_id` round-trip per level.
/// Each identity is requested at most once, so the walk terminates even if
/// the store hands back a cycle. Identities the store does not return are
/// simply absent from the result.
pub async fn collect_ancestry(
    txn: &mut dyn Txn,
    root: NodeRecord,
    max_depth: usize,
    filter: &FacetFilter,
) -> StoreResult<HashMap<NodeId, NodeRecord>> {
    let mut requested: HashSet<NodeId> = HashSet::new();
    requested.insert(root.id);
    let mut frontier = vec![root.id];
    let mut fetched = HashMap::new();
    fetched.insert(root.id, root);

    for level in 1..=max_depth {
        let mut next = Vec::new();
        for id in &frontier {
            let Some(node) = fetched.get(id) else {
                continue;
            };
            for edge in &node.parents {
                if filter.allows(edge.facet.as_str()) && requested.insert(edge.target) {
                    next.push(edge.target);
                }
            }
        }
        if next.is_empty() {
            break;
        }

        let records = txn.nodes_by_id(&next).await?;
        tracing::trace!(level, requested = next.len(), found = records.len(), "fetched ancestor level");
        frontier = records.iter().map(|r| r.id).collect();
        fetched.extend(records.into_iter().map(|r| (r.id, r)));
    }

    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_store::{GraphStore, InMemoryGraphStore, NewNode, ParentEdge};
    use lemma_types::FacetLabel;

    async fn node(store: &InMemoryGraphStore, parents: &[(&str, NodeId)]) -> NodeId {
        let mut txn = store.begin().await.unwrap();
        let id = txn
            .insert_node(NewNode {
                owner: None,
                data: "{}".into(),
                searchable: false,
                search_title: None,
                search_synopsis: None,
                parents: parents
                    .iter()
                    .map(|(facet, target)| ParentEdge {
                        target: *target,
                        facet: FacetLabel::parse(facet).unwrap(),
                    })
                    .collect(),
            })
            .await
            .unwrap();
        txn.set_hashid(id, format!("h{}", id.get())).await.unwrap();
        txn.commit().await.unwrap();
        id
    }

    async fn walk(store: &InMemoryGraphStore, root: NodeId, depth: usize, filter: &FacetFilter) -> Vec<NodeId> {
        let mut txn = store.begin_read_only().await.unwrap();
        let root = txn.nodes_by_id(&[root]).await.unwrap().remove(0);
        let fetched = collect_ancestry(txn.as_mut(), root, depth, filter).await.unwrap();
        let mut ids: Vec<NodeId> = fetched.into_keys().collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn fetches_within_depth() {
        let store = InMemoryGraphStore::new();
        let a = node(&store, &[]).await;
        let b = node(&store, &[("cites", a)]).await;
        let c = node(&store, &[("cites", b)]).await;

        assert_eq!(walk(&store, c, 10, &FacetFilter::any()).await, vec![a, b, c]);
        assert_eq!(walk(&store, c, 1, &FacetFilter::any()).await, vec![b, c]);
        assert_eq!(walk(&store, c, 0, &FacetFilter::any()).await, vec![c]);
    }

    #[tokio::test]
    async fn skips_filtered_edges() {
        let store = InMemoryGraphStore::new();
        let a = node(&store, &[]).await;
        let b = node(&store, &[]).await;
        let c = node(&store, &[("cites", a), ("extends", b)]).await;

        let filter = FacetFilter::parse_list("extends").unwrap();
        assert_eq!(walk(&store, c, 10, &filter).await, vec![b, c]);
    }

    #[tokio::test]
    async fn shared_ancestor_fetched_once() {
        let store = InMemoryGraphStore::new();
        let a = node(&store, &[]).await;
        let b = node(&store, &[("cites", a)]).await;
        let c = node(&store, &[("cites", a), ("cites", b)]).await;

        assert_eq!(walk(&store, c, 10, &FacetFilter::any()).await, vec![a, b, c]);
    }
}
