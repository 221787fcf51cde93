//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Rich domain types (validated, business-logic-ready)
//! - `wire.rs` — Raw serde structs matching provider responses
//! - `convert.rs` — `TryFrom`/`From` conversions with validation
//! - `client.rs` — Sub-client with rate-limited HTTP methods

pub mod activity;
pub mod balance;
pub mod portfolio;
pub mod price;
pub mod token;

use crate::shared::units::UnitsError;
use crate::shared::ParseError;
use thiserror::Error;

/// Why a single provider feed entry was skipped.
///
/// Feed conversion is per entry: one malformed row never rejects the whole
/// snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("{0}")]
    Address(#[from] ParseError),

    #[error("{0}")]
    Amount(#[from] UnitsError),

    #[error("Invalid price '{input}' for {symbol}")]
    Price { symbol: String, input: String },

    #[error("Unknown activity type '{0}'")]
    ActivityType(String),

    #[error("Invalid timestamp '{input}': {reason}")]
    Timestamp { input: String, reason: String },
}
