use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GateResult;
use crate::request::CreateNodeRequest;
use crate::stage::{GateContext, GateStage, Rejection, StageDecision};
use crate::verifier::BotVerifier;

/// Bot check stage.
///
/// An unreachable verifier counts as a failed check.
pub struct BotCheckStage {
    verifier: Arc<dyn BotVerifier>,
}

impl BotCheckStage {
    pub fn new(verifier: Arc<dyn BotVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl GateStage for BotCheckStage {
    fn name(&self) -> &str {
        "bot-check"
    }

    async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        _context: &mut GateContext,
    ) -> GateResult<StageDecision> {
        match self.verifier.verify(&request.recaptcha_code).await {
            Ok(true) => Ok(StageDecision::Pass),
            Ok(false) => Ok(StageDecision::Fail(Rejection::BotCheckFailed)),
            Err(e) => {
                tracing::warn!(error = %e, "bot verification unavailable");
                Ok(StageDecision::Fail(Rejection::BotCheckFailed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GateError;
    use crate::verifier::FixedVerifier;

    struct Unreachable;

    #[async_trait]
    impl BotVerifier for Unreachable {
        async fn verify(&self, _code: &str) -> GateResult<bool> {
            Err(GateError::Verifier("connection refused".into()))
        }
    }

    async fn run(verifier: Arc<dyn BotVerifier>) -> StageDecision {
        BotCheckStage::new(verifier)
            .evaluate(&CreateNodeRequest::default(), &mut GateContext::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn accepted_code_passes() {
        assert!(run(Arc::new(FixedVerifier::accept_all())).await.is_pass());
    }

    #[tokio::test]
    async fn rejected_code_fails() {
        assert_eq!(
            run(Arc::new(FixedVerifier::reject_all())).await,
            StageDecision::Fail(Rejection::BotCheckFailed)
        );
    }

    #[tokio::test]
    async fn verifier_error_fails() {
        assert_eq!(
            run(Arc::new(Unreachable)).await,
            StageDecision::Fail(Rejection::BotCheckFailed)
        );
    }
}
