/// Errors that stop gate evaluation without a verdict on the request.
///
/// A request that is merely invalid is not an error; it produces a
/// [`Rejection`](crate::Rejection).
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The bot verifier could not be reached or answered garbage.
    #[error("bot verifier failed: {0}")]
    Verifier(String),

    /// A stage returned an unexpected error.
    #[error("stage error in '{stage}': {message}")]
    StageError { stage: String, message: String },
}

impl GateError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

pub type GateResult<T> = Result<T, GateError>;
