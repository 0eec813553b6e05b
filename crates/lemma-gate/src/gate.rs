use std::sync::Arc;
use std::time::{Duration, Instant};

use lemma_types::Actor;

use crate::config::GateConfig;
use crate::error::GateResult;
use crate::request::{CreateNodeRequest, NodeDraft};
use crate::stage::{GateContext, GateStage, Rejection, StageDecision, StageResult};
use crate::stages::{BotCheckStage, OwnershipStage, ParentRefStage, PayloadStage, SearchStage};
use crate::verifier::BotVerifier;

// ---------------------------------------------------------------------------
// GateReport
// ---------------------------------------------------------------------------

/// The outcome of running a request through the full gate pipeline.
#[derive(Clone, Debug)]
pub struct GateReport {
    /// First failing stage's rejection, or `None` if every stage passed.
    pub rejection: Option<Rejection>,
    /// Normalised request; complete only when accepted.
    pub draft: NodeDraft,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
}

impl GateReport {
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }

    /// The draft if accepted, the rejection otherwise.
    pub fn into_draft(self) -> Result<NodeDraft, Rejection> {
        match self.rejection {
            None => Ok(self.draft),
            Some(rejection) => Err(rejection),
        }
    }
}

// ---------------------------------------------------------------------------
// CreationGate
// ---------------------------------------------------------------------------

/// The creation gate: an ordered pipeline of stages that every create-node
/// request must pass before the store is touched.
pub struct CreationGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl CreationGate {
    /// Create a gate with an empty pipeline.
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the standard pipeline:
    /// Payload -> Search -> BotCheck -> Ownership -> ParentRefs
    pub fn with_default_stages(config: GateConfig, verifier: Arc<dyn BotVerifier>) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(PayloadStage::new(&gate.config)));
        gate.add_stage(Box::new(SearchStage::new(&gate.config)));
        gate.add_stage(Box::new(BotCheckStage::new(verifier)));
        gate.add_stage(Box::new(OwnershipStage));
        gate.add_stage(Box::new(ParentRefStage::new(&gate.config)));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a request through the pipeline on behalf of `actor`.
    ///
    /// The pipeline is **fail-fast**: the first failing stage stops
    /// evaluation and its rejection is reported.
    pub async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        actor: Option<Actor>,
    ) -> GateResult<GateReport> {
        let pipeline_start = Instant::now();
        let mut context = GateContext::new(actor);
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(request, &mut context).await?;
            let elapsed = stage_start.elapsed();

            let reason = match &decision {
                StageDecision::Pass => None,
                StageDecision::Fail(rejection) => Some(rejection.to_string()),
            };
            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason,
                elapsed,
            };
            tracing::debug!(
                stage = %result.stage_name,
                passed = result.passed,
                elapsed_us = elapsed.as_micros() as u64,
                "gate stage evaluated"
            );

            stage_results.push(result.clone());
            context.previous_stages.push(result);

            if let StageDecision::Fail(rejection) = decision {
                return Ok(GateReport {
                    rejection: Some(rejection),
                    draft: context.draft,
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GateReport {
            rejection: None,
            draft: context.draft,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::FixedVerifier;
    use lemma_types::AccountId;
    use serde_json::json;

    fn gate(accept_bots: bool) -> CreationGate {
        let verifier: Arc<dyn BotVerifier> = if accept_bots {
            Arc::new(FixedVerifier::accept_all())
        } else {
            Arc::new(FixedVerifier::reject_all())
        };
        CreationGate::with_default_stages(GateConfig::default(), verifier)
    }

    fn alice() -> Actor {
        Actor {
            id: AccountId::new(1),
            name: "alice".into(),
            email: "alice@example.com".into(),
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn default_pipeline_has_five_stages() {
        assert_eq!(gate(true).stage_count(), 5);
        assert_eq!(CreationGate::new(GateConfig::default()).stage_count(), 0);
    }

    #[tokio::test]
    async fn empty_pipeline_accepts() {
        let gate = CreationGate::new(GateConfig::default());
        let report = gate.evaluate(&CreateNodeRequest::default(), None).await.unwrap();
        assert!(report.is_accepted());
        assert!(report.stage_results.is_empty());
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn valid_request_produces_draft() {
        let request = CreateNodeRequest {
            owner: Some("alice".into()),
            parents: Some(vec!["cites:abc123".into()]),
            data: Some(json!({"x": 1})),
            searchable: true,
            search_title: Some(" Title ".into()),
            ..CreateNodeRequest::default()
        };
        let report = gate(true).evaluate(&request, Some(alice())).await.unwrap();
        assert!(report.is_accepted());
        assert_eq!(report.stage_results.len(), 5);
        assert!(report.stage_results.iter().all(|r| r.passed));

        let draft = report.into_draft().unwrap();
        assert_eq!(draft.data, r#"{"x":1}"#);
        assert_eq!(draft.search_title.as_deref(), Some("Title"));
        assert_eq!(draft.owner, Some(alice()));
        assert_eq!(draft.parents.len(), 1);
    }

    #[tokio::test]
    async fn fail_fast_on_first_failure() {
        // Payload and ownership both invalid; only payload is reported.
        let request = CreateNodeRequest {
            owner: Some("alice".into()),
            ..CreateNodeRequest::default()
        };
        let report = gate(true).evaluate(&request, None).await.unwrap();
        assert!(!report.is_accepted());
        assert_eq!(report.stage_results.len(), 1);
        assert_eq!(report.stage_results[0].stage_name, "payload");
        assert_eq!(
            report.stage_results[0].reason.as_deref(),
            Some("data payload must not be empty")
        );
    }

    #[tokio::test]
    async fn bot_check_runs_before_ownership() {
        let request = CreateNodeRequest {
            owner: Some("alice".into()),
            ..CreateNodeRequest::with_data(json!({"x": 1}))
        };
        let report = gate(false).evaluate(&request, None).await.unwrap();
        assert_eq!(report.into_draft().unwrap_err(), Rejection::BotCheckFailed);
    }

    #[tokio::test]
    async fn ownership_runs_before_parent_parsing() {
        let request = CreateNodeRequest {
            owner: Some("alice".into()),
            parents: Some(vec!["garbage".into()]),
            ..CreateNodeRequest::with_data(json!({"x": 1}))
        };
        let report = gate(true).evaluate(&request, None).await.unwrap();
        assert_eq!(report.into_draft().unwrap_err(), Rejection::LoginRequired);
    }
}
