use async_trait::async_trait;
use serde_json::Value;

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::request::CreateNodeRequest;
use crate::stage::{GateContext, GateStage, Rejection, StageDecision};

/// Payload validation stage.
///
/// `data` must be present and must be a JSON object, either inline or as a
/// string holding one. The size bound applies to the compacted text, which is
/// what gets stored.
pub struct PayloadStage {
    max_payload_kb: usize,
}

impl PayloadStage {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            max_payload_kb: config.max_payload_kb,
        }
    }

    fn fail(reason: impl Into<String>) -> GateResult<StageDecision> {
        Ok(StageDecision::Fail(Rejection::PayloadInvalid(reason.into())))
    }
}

#[async_trait]
impl GateStage for PayloadStage {
    fn name(&self) -> &str {
        "payload"
    }

    async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        context: &mut GateContext,
    ) -> GateResult<StageDecision> {
        let object = match &request.data {
            None => return Self::fail("data payload must not be empty"),
            Some(Value::Object(map)) => Value::Object(map.clone()),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(parsed @ Value::Object(_)) => parsed,
                _ => return Self::fail("data payload must be valid json object"),
            },
            Some(_) => return Self::fail("data payload must be valid json object"),
        };

        let compact =
            serde_json::to_string(&object).map_err(|e| GateError::stage(self.name(), e.to_string()))?;
        if compact.len() > self.max_payload_kb * 1024 {
            return Self::fail(format!(
                "data payload must be less than {}kB",
                self.max_payload_kb
            ));
        }

        context.draft.data = compact;
        Ok(StageDecision::Pass)
    }
}
