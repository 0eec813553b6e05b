/// Errors from graph store operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A mutation was attempted through a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// Commit would violate a uniqueness or completeness constraint.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// A mutation referenced a record the transaction cannot see.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend gave up on a deadline.
    #[error("store operation timed out")]
    Timeout,

    /// The backend observed the caller going away.
    ///
    /// In-process cancellation is a dropped future, which drops the open
    /// transaction with it. Only backends with their own session state
    /// report this variant; the in-memory store never does.
    #[error("store operation cancelled")]
    Cancelled,

    /// Failure inside the storage backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
