use thiserror::Error;

/// EnvelopeError covers every way an incoming message can fail to become a
/// usable domain value. All variants are non-fatal: the caller logs and
/// drops the message.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid UTF-8 in envelope: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope carries unknown type {0:?}")]
    UnknownType(String),

    #[error("envelope is missing required field {0:?}")]
    MissingField(&'static str),

    #[error("numeric field {0:?} is not finite")]
    NonFinite(&'static str),

    #[error("order quantity must be strictly positive, got {0}")]
    NonPositiveQuantity(f64),
}
