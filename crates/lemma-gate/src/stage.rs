use std::time::Duration;

use async_trait::async_trait;

use lemma_types::Actor;

use crate::error::GateResult;
use crate::request::{CreateNodeRequest, NodeDraft};

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Why a request was turned away. The display text is the client-facing
/// message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("{0}")]
    PayloadInvalid(String),

    #[error("{0}")]
    SearchMetadataInvalid(String),

    #[error("recaptcha invalid")]
    BotCheckFailed,

    #[error("owner requires login")]
    LoginRequired,

    #[error("owner does not match logged in account")]
    OwnershipUnauthorized,

    #[error("{0}")]
    ParentReferenceInvalid(String),

    #[error("max {0} parent refs permitted")]
    TooManyParents(usize),
}

impl Rejection {
    /// Returns `true` for rejections caused by missing or wrong credentials.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::LoginRequired | Self::OwnershipUnauthorized)
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; the request is rejected.
    Fail(Rejection),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// State threaded through every stage of one evaluation.
#[derive(Debug, Default)]
pub struct GateContext {
    /// The logged-in account, if any.
    pub actor: Option<Actor>,
    /// Normalised fields accumulated by earlier stages.
    pub draft: NodeDraft,
    /// Results from stages that have already run in this evaluation.
    pub previous_stages: Vec<StageResult>,
}

impl GateContext {
    pub fn new(actor: Option<Actor>) -> Self {
        Self {
            actor,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// GateStage
// ---------------------------------------------------------------------------

/// One step of the creation pipeline.
///
/// A stage inspects the request, may record normalised values in
/// `context.draft`, and either passes or rejects. `Err` is reserved for
/// failures unrelated to the request's validity.
#[async_trait]
pub trait GateStage: Send + Sync {
    /// Short name used in stage results and logs.
    fn name(&self) -> &str;

    async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        context: &mut GateContext,
    ) -> GateResult<StageDecision>;
}
