use async_trait::async_trait;

use crate::config::GateConfig;
use crate::error::GateResult;
use crate::request::CreateNodeRequest;
use crate::stage::{GateContext, GateStage, Rejection, StageDecision};

/// Search metadata stage.
///
/// Titles and synopses are trimmed before their checks, whether or not the
/// node is searchable.
pub struct SearchStage {
    max_title_len: usize,
    max_synopsis_len: usize,
}

impl SearchStage {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            max_title_len: config.max_title_len,
            max_synopsis_len: config.max_synopsis_len,
        }
    }
}

fn check_field(value: Option<&str>, field: &str, max_len: usize) -> Result<Option<String>, Rejection> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::SearchMetadataInvalid(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(Rejection::SearchMetadataInvalid(format!(
            "{field} must be less than {max_len} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[async_trait]
impl GateStage for SearchStage {
    fn name(&self) -> &str {
        "search"
    }

    async fn evaluate(
        &self,
        request: &CreateNodeRequest,
        context: &mut GateContext,
    ) -> GateResult<StageDecision> {
        if request.searchable && request.search_title.is_none() && request.search_synopsis.is_none() {
            return Ok(StageDecision::Fail(Rejection::SearchMetadataInvalid(
                "when searchable is true, a search title or search synopsis is required".into(),
            )));
        }

        let checked = check_field(request.search_title.as_deref(), "search title", self.max_title_len)
            .and_then(|title| {
                check_field(
                    request.search_synopsis.as_deref(),
                    "search synopsis",
                    self.max_synopsis_len,
                )
                .map(|synopsis| (title, synopsis))
            });

        match checked {
            Ok((title, synopsis)) => {
                context.draft.searchable = request.searchable;
                context.draft.search_title = title;
                context.draft.search_synopsis = synopsis;
                Ok(StageDecision::Pass)
            }
            Err(rejection) => Ok(StageDecision::Fail(rejection)),
        }
    }
}
