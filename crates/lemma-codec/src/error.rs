use thiserror::Error;

/// Errors raised by the address codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The codec parameters cannot produce a usable alphabet.
    #[error("invalid codec configuration: {0}")]
    InvalidConfig(String),

    /// The string is not an address this codec could have produced.
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
