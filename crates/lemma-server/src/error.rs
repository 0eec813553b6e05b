use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use lemma_chain::ChainError;
use lemma_ledger::LedgerError;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("codec error: {0}")]
    Codec(#[from] lemma_codec::CodecError),

    #[error("gate error: {0}")]
    Gate(#[from] lemma_gate::GateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

const INTERNAL_MESSAGE: &str = "something went wrong. Try again";

/// A failed request, rendered as a status code and an optional
/// `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Credentials missing, wrong or not yet usable. Unknown accounts and
    /// wrong passwords carry no message.
    #[error("unauthorized")]
    Unauthorized(Option<String>),

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request timed out")]
    Timeout,

    #[error("request aborted")]
    Cancelled,

    /// The cause is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = |status: StatusCode, message: &str| (status, Json(json!({ "error": message }))).into_response();
        match self {
            Self::BadRequest(message) => body(StatusCode::BAD_REQUEST, &message),
            Self::Unauthorized(Some(message)) => body(StatusCode::UNAUTHORIZED, &message),
            Self::Unauthorized(None) => StatusCode::UNAUTHORIZED.into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
            Self::Timeout => StatusCode::REQUEST_TIMEOUT.into_response(),
            Self::Cancelled => StatusCode::NO_CONTENT.into_response(),
            Self::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::Rejected(rejection) if rejection.is_authorization() => {
                Self::Unauthorized(Some(rejection.to_string()))
            }
            LedgerError::Rejected(_)
            | LedgerError::ParentNotFound
            | LedgerError::Validation(_)
            | LedgerError::Conflict(_) => Self::BadRequest(err.to_string()),
            LedgerError::AuthenticationFailed => Self::Unauthorized(None),
            LedgerError::AccountUnvalidated => Self::Unauthorized(Some(err.to_string())),
            LedgerError::AccountNotFound => Self::NotFound,
            LedgerError::Timeout => Self::Timeout,
            LedgerError::Cancelled => Self::Cancelled,
            LedgerError::CorruptPayload(_)
            | LedgerError::Gate(_)
            | LedgerError::Store(_)
            | LedgerError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        match &err {
            ChainError::RefNotFound => Self::BadRequest(err.to_string()),
            ChainError::Timeout => Self::Timeout,
            ChainError::Cancelled => Self::Cancelled,
            ChainError::CorruptPayload(_) | ChainError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}
