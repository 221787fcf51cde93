//! Price domain — spot prices for supported tokens.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::domain::token::TokenConfig;
use crate::shared::Symbol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest known price of one supported token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrice {
    pub symbol: Symbol,
    /// Quote currency (USD) per whole token.
    pub price: f64,
    pub estimated_gas: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl TokenPrice {
    pub fn empty(token: &TokenConfig) -> Self {
        Self {
            symbol: token.symbol.clone(),
            price: 0.0,
            estimated_gas: String::new(),
            last_updated: None,
        }
    }
}

/// One validated row of a price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub price: f64,
    pub estimated_gas: String,
}
