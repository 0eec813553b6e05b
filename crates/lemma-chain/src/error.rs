use lemma_store::StoreError;

/// Errors from chain resolution.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The address is malformed, names no node, or its owner-scope does not
    /// match the node's owner.
    #[error("can't find ref")]
    RefNotFound,

    /// The read did not finish within the query timeout.
    #[error("chain query timed out")]
    Timeout,

    /// The caller went away before the read finished.
    #[error("chain query cancelled")]
    Cancelled,

    /// A stored payload is not valid JSON.
    #[error("corrupt payload on node {0}")]
    CorruptPayload(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ChainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => Self::Timeout,
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Store(other),
        }
    }
}

pub type ChainResult<T> = Result<T, ChainError>;
