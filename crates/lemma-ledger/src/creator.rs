use std::collections::HashMap;
use std::sync::Arc;

use lemma_codec::AddressCodec;
use lemma_gate::{CreateNodeRequest, CreationGate, NodeDraft};
use lemma_store::{GraphStore, NewNode, NodeHandle, ParentEdge, Txn};
use lemma_types::{Actor, Address, NodeId};

use crate::error::{LedgerError, LedgerResult};

/// Creates nodes.
///
/// The request first passes the [`CreationGate`]. Parent references are then
/// resolved and the node is written inside one store transaction: insert,
/// derive the address from the new identity, attach it, commit. Any failure
/// discards the transaction, so a node without an address is never visible.
pub struct NodeCreator {
    store: Arc<dyn GraphStore>,
    codec: Arc<AddressCodec>,
    gate: CreationGate,
}

impl NodeCreator {
    pub fn new(store: Arc<dyn GraphStore>, codec: Arc<AddressCodec>, gate: CreationGate) -> Self {
        Self { store, codec, gate }
    }

    pub fn gate(&self) -> &CreationGate {
        &self.gate
    }

    /// Create a node on behalf of `actor` and return its public address.
    pub async fn create(
        &self,
        request: &CreateNodeRequest,
        actor: Option<Actor>,
    ) -> LedgerResult<Address> {
        let report = self.gate.evaluate(request, actor).await?;
        let elapsed = report.elapsed;
        let draft = report.into_draft()?;

        let mut txn = self.store.begin().await?;
        let id = match self.write(txn.as_mut(), &draft).await {
            Ok(id) => id,
            Err(e) => {
                txn.discard().await;
                return Err(e);
            }
        };
        txn.commit().await?;

        let address = self
            .codec
            .address(id, draft.owner.as_ref().map(|owner| owner.name.as_str()));
        tracing::info!(
            %address,
            parents = draft.parents.len(),
            gate_us = elapsed.as_micros() as u64,
            "node created"
        );
        Ok(address)
    }

    async fn write(&self, txn: &mut dyn Txn, draft: &NodeDraft) -> LedgerResult<NodeId> {
        let parents = resolve_parents(txn, draft).await?;
        let id = txn
            .insert_node(NewNode {
                owner: draft.owner.as_ref().map(|owner| owner.id),
                data: draft.data.clone(),
                searchable: draft.searchable,
                search_title: draft.search_title.clone(),
                search_synopsis: draft.search_synopsis.clone(),
                parents,
            })
            .await?;
        txn.set_hashid(id, self.codec.encode(id)).await?;
        Ok(id)
    }
}

/// Look up every parent in one batched read and turn the references into
/// edges. A missing target and a wrong owner-scope are the same error.
async fn resolve_parents(txn: &mut dyn Txn, draft: &NodeDraft) -> LedgerResult<Vec<ParentEdge>> {
    if draft.parents.is_empty() {
        return Ok(Vec::new());
    }

    let mut hashids: Vec<String> = draft
        .parents
        .iter()
        .map(|parent| parent.target.hashid.clone())
        .collect();
    hashids.sort();
    hashids.dedup();

    let found: HashMap<String, NodeHandle> = txn
        .find_by_hashids(&hashids)
        .await?
        .into_iter()
        .map(|handle| (handle.hashid.clone(), handle))
        .collect();

    draft
        .parents
        .iter()
        .map(|parent| -> LedgerResult<ParentEdge> {
            let handle = found
                .get(&parent.target.hashid)
                .filter(|handle| parent.target.scope_matches(handle.owner_name.as_deref()))
                .ok_or(LedgerError::ParentNotFound)?;
            Ok(ParentEdge {
                target: handle.id,
                facet: parent.facet.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_codec::CodecConfig;
    use lemma_gate::{FixedVerifier, GateConfig, Rejection};
    use lemma_store::{InMemoryGraphStore, NewAccount};
    use serde_json::json;

    struct Fixture {
        store: InMemoryGraphStore,
        creator: NodeCreator,
    }

    fn fixture() -> Fixture {
        let store = InMemoryGraphStore::new();
        let codec = Arc::new(AddressCodec::new(&CodecConfig::default()).unwrap());
        let gate = CreationGate::with_default_stages(
            GateConfig::default(),
            Arc::new(FixedVerifier::accept_all()),
        );
        Fixture {
            creator: NodeCreator::new(Arc::new(store.clone()), codec, gate),
            store,
        }
    }

    async fn account(store: &InMemoryGraphStore, name: &str) -> Actor {
        let mut txn = store.begin().await.unwrap();
        let email = format!("{name}@example.com");
        let id = txn
            .insert_account(NewAccount {
                name: name.into(),
                email: email.clone(),
                password_hash: String::new(),
                activation_code: format!("code-{name}"),
            })
            .await
            .unwrap();
        txn.commit().await.unwrap();
        Actor {
            id,
            name: name.into(),
            email,
        }
    }

    fn request(owner: Option<&str>, parents: &[&str]) -> CreateNodeRequest {
        CreateNodeRequest {
            owner: owner.map(String::from),
            parents: Some(parents.iter().map(|p| p.to_string()).collect()),
            ..CreateNodeRequest::with_data(json!({"x": 1}))
        }
    }

    // ----------------------------------------------------------
    // Addresses
    // ----------------------------------------------------------

    #[tokio::test]
    async fn unowned_node_has_bare_address() {
        let fx = fixture();
        let address = fx.creator.create(&request(None, &[]), None).await.unwrap();
        assert!(!address.is_owned());
        assert!(!address.to_string().starts_with('@'));
        assert_eq!(address.hashid.len(), 6);
        assert_eq!(fx.store.node_count(), 1);
    }

    #[tokio::test]
    async fn owned_node_is_scoped() {
        let fx = fixture();
        let alice = account(&fx.store, "alice").await;
        let address = fx
            .creator
            .create(&request(Some("@alice"), &[]), Some(alice))
            .await
            .unwrap();
        assert_eq!(address.to_string(), format!("@alice/{}", address.hashid));
    }

    // ----------------------------------------------------------
    // Parents
    // ----------------------------------------------------------

    #[tokio::test]
    async fn parent_scope_must_match_owner() {
        let fx = fixture();
        let alice = account(&fx.store, "alice").await;
        let owned = fx
            .creator
            .create(&request(Some("alice"), &[]), Some(alice))
            .await
            .unwrap();

        let good = format!("cites:{owned}");
        assert!(fx.creator.create(&request(None, &[&good]), None).await.is_ok());

        for bad in [
            format!("cites:@bob/{}", owned.hashid),
            format!("cites:{}", owned.hashid),
        ] {
            let err = fx.creator.create(&request(None, &[&bad]), None).await.unwrap_err();
            assert!(matches!(err, LedgerError::ParentNotFound), "{bad}");
            assert_eq!(err.to_string(), "provided parent ref does not exist");
        }
        assert_eq!(fx.store.node_count(), 2);
    }

    #[tokio::test]
    async fn missing_parent_writes_nothing() {
        let fx = fixture();
        let first = fx.creator.create(&request(None, &[]), None).await.unwrap();
        let refs = [format!("cites:{first}"), "extends:zzzzzz".to_string()];
        let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
        let err = fx.creator.create(&request(None, &refs), None).await.unwrap_err();
        assert!(matches!(err, LedgerError::ParentNotFound));
        assert_eq!(fx.store.node_count(), 1);
    }

    #[tokio::test]
    async fn repeated_parent_is_kept_per_facet() {
        let fx = fixture();
        let first = fx.creator.create(&request(None, &[]), None).await.unwrap();
        let refs = [format!("cites:{first}"), format!("extends:{first}")];
        let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
        let child = fx.creator.create(&request(None, &refs), None).await.unwrap();

        let mut txn = fx.store.begin_read_only().await.unwrap();
        let handle = txn.find_by_hashids(&[child.hashid.clone()]).await.unwrap().remove(0);
        let record = txn.nodes_by_id(&[handle.id]).await.unwrap().remove(0);
        let facets: Vec<&str> = record.parents.iter().map(|e| e.facet.as_str()).collect();
        assert_eq!(facets, vec!["cites", "extends"]);
    }

    // ----------------------------------------------------------
    // Gate
    // ----------------------------------------------------------

    #[tokio::test]
    async fn oversized_payload_rejected_before_store() {
        let fx = fixture();
        let big = "x".repeat(13 * 1024);
        let request = CreateNodeRequest::with_data(json!({ "big": big }));
        let err = fx.creator.create(&request, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(Rejection::PayloadInvalid(_))));
        assert_eq!(err.to_string(), "data payload must be less than 12kB");
        assert_eq!(fx.store.node_count(), 0);
    }

    #[tokio::test]
    async fn ownership_without_login_rejected() {
        let fx = fixture();
        let err = fx.creator.create(&request(Some("alice"), &[]), None).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(Rejection::LoginRequired)));
    }
}
