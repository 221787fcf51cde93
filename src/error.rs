//! Unified SDK error types.

use crate::shared::{ParseError, Symbol};
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("Optimistic update rejected: {0}")]
    Optimistic(#[from] OptimisticError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Admission-control errors from the provider rate limiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Request for '{key}' waited {waited_ms}ms in the queue and timed out")]
    QueueTimeout { key: String, waited_ms: u64 },
}

/// Reasons an optimistic swap is refused before any balance is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimisticError {
    #[error("An optimistic update is already pending (tx {tx_hash:?})")]
    AlreadyActive { tx_hash: Option<String> },

    #[error("Unknown token: {0}")]
    UnknownToken(Symbol),

    #[error("Insufficient {symbol} balance: have {available}, need {requested}")]
    InsufficientBalance {
        symbol: Symbol,
        available: u128,
        requested: u128,
    },
}
