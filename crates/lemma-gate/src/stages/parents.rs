use async_trait::async_trait;

use lemma_types::ParentRef;

use crate::config::GateConfig;
use crate::error::GateResult;
use crate::request::CreateNodeRequest;
use crate::stage::{GateContext, GateStage, Rejection, StageDecision};

/// Parent reference stage.
///
/// The count limit is enforced before any reference is parsed. Existence and
/// owner-scope checks need the store and happen at commit time.
pub struct ParentRefStage {
    max_parents: usize,
}

impl ParentRefStage {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            max_parents: config.max_parents,
        }
    }
}

#[async_trait]
impl GateStage for ParentRefStage {
    fn name(&self) -> &str {
        "parent-refs"
    }

    async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        context: &mut GateContext,
    ) -> GateResult<StageDecision> {
        let raw_refs = request.parent_refs();
        if raw_refs.len() > self.max_parents {
            return Ok(StageDecision::Fail(Rejection::TooManyParents(self.max_parents)));
        }

        let mut parents = Vec::with_capacity(raw_refs.len());
        for raw in raw_refs {
            match ParentRef::parse(raw) {
                Ok(parent) => parents.push(parent),
                Err(e) => {
                    return Ok(StageDecision::Fail(Rejection::ParentReferenceInvalid(e.to_string())))
                }
            }
        }

        context.draft.parents = parents;
        Ok(StageDecision::Pass)
    }
}
