use thiserror::Error;

/// Errors produced while parsing or validating foundation types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A `[@owner/]hashid` address could not be parsed.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// A `facet:[@owner/]hashid` parent reference could not be parsed.
    ///
    /// The payload is the user-facing message.
    #[error("{0}")]
    InvalidParentRef(String),

    /// A facet label broke the length or character rules.
    #[error("{0}")]
    InvalidFacet(String),

    #[error("invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),
}

pub type TypeResult<T> = Result<T, TypeError>;
