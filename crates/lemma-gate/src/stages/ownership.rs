use async_trait::async_trait;

use crate::error::GateResult;
use crate::request::CreateNodeRequest;
use crate::stage::{GateContext, GateStage, Rejection, StageDecision};

/// Ownership stage.
///
/// A node may only be created under the logged-in account. The claim may
/// name the account or its email, with or without a leading `@`.
pub struct OwnershipStage;

#[async_trait]
impl GateStage for OwnershipStage {
    fn name(&self) -> &str {
        "ownership"
    }

    async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        context: &mut GateContext,
    ) -> GateResult<StageDecision> {
        let Some(raw) = &request.owner else {
            return Ok(StageDecision::Pass);
        };

        let trimmed = raw.trim();
        let claim = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if claim.is_empty() {
            return Ok(StageDecision::Fail(Rejection::PayloadInvalid("owner is invalid".into())));
        }

        match &context.actor {
            None => Ok(StageDecision::Fail(Rejection::LoginRequired)),
            Some(actor) if actor.answers_to(claim) => {
                context.draft.owner = Some(actor.clone());
                Ok(StageDecision::Pass)
            }
            Some(_) => Ok(StageDecision::Fail(Rejection::OwnershipUnauthorized)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemma_types::{AccountId, Actor};

    fn alice() -> Actor {
        Actor {
            id: AccountId::new(1),
            name: "alice".into(),
            email: "alice@example.com".into(),
        }
    }

    async fn run(owner: Option<&str>, actor: Option<Actor>) -> (StageDecision, GateContext) {
        let request = CreateNodeRequest {
            owner: owner.map(String::from),
            ..CreateNodeRequest::default()
        };
        let mut context = GateContext::new(actor);
        let decision = OwnershipStage.evaluate(&request, &mut context).await.unwrap();
        (decision, context)
    }

    #[tokio::test]
    async fn no_claim_passes_without_login() {
        let (decision, context) = run(None, None).await;
        assert!(decision.is_pass());
        assert!(context.draft.owner.is_none());
    }

    #[tokio::test]
    async fn claim_requires_login() {
        let (decision, _) = run(Some("alice"), None).await;
        assert_eq!(decision, StageDecision::Fail(Rejection::LoginRequired));
    }

    #[tokio::test]
    async fn claim_by_name_or_email() {
        for claim in ["alice", "@alice", " Alice ", "alice@example.com"] {
            let (decision, context) = run(Some(claim), Some(alice())).await;
            assert!(decision.is_pass(), "{claim:?}");
            assert_eq!(context.draft.owner, Some(alice()));
        }
    }

    #[tokio::test]
    async fn claim_for_someone_else_rejected() {
        let (decision, context) = run(Some("bob"), Some(alice())).await;
        assert_eq!(decision, StageDecision::Fail(Rejection::OwnershipUnauthorized));
        assert!(context.draft.owner.is_none());
    }

    #[tokio::test]
    async fn blank_claim_rejected() {
        let (decision, _) = run(Some(" @ "), Some(alice())).await;
        assert_eq!(
            decision,
            StageDecision::Fail(Rejection::PayloadInvalid("owner is invalid".into()))
        );
    }
}
