use lemma_gate::{GateError, Rejection};
use lemma_store::StoreError;

/// Errors produced by the write and account services.
///
/// Display text of the client-facing variants is sent to clients verbatim.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The creation gate turned the request away.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// A parent reference names no node, or its owner-scope is wrong.
    #[error("provided parent ref does not exist")]
    ParentNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Unknown account or wrong password.
    #[error("login failed")]
    AuthenticationFailed,

    #[error("account requires email verification")]
    AccountUnvalidated,

    #[error("account not found")]
    AccountNotFound,

    #[error("query timed out")]
    Timeout,

    #[error("query cancelled")]
    Cancelled,

    #[error("corrupt payload on node {0}")]
    CorruptPayload(String),

    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => Self::Timeout,
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Store(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
