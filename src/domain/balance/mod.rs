//! Balance domain — per-token wallet balances.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::domain::token::TokenConfig;
use crate::shared::{format_units, serde_util, usd_value, Address, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current balance of one supported token.
///
/// `formatted` and `usd_value` are derived from `value`, `decimals` and the
/// token's price; they are only ever written together through
/// [`TokenBalance::set_value`] and [`TokenBalance::reprice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: Symbol,
    /// Smallest on-chain unit.
    #[serde(with = "serde_util::u128_string")]
    pub value: u128,
    pub decimals: u8,
    pub formatted: String,
    pub usd_value: f64,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl TokenBalance {
    /// Zero balance for a freshly registered token.
    pub fn empty(token: &TokenConfig) -> Self {
        Self {
            symbol: token.symbol.clone(),
            value: 0,
            decimals: token.decimals,
            formatted: format_units(0, token.decimals),
            usd_value: 0.0,
            loading: false,
            error: None,
            last_updated: None,
        }
    }

    /// Overwrite the amount and recompute the derived fields at `price`.
    pub fn set_value(&mut self, value: u128, price: f64) {
        self.value = value;
        self.formatted = format_units(value, self.decimals);
        self.usd_value = usd_value(value, self.decimals, price);
    }

    /// Recompute `usd_value` for a new price; the amount is untouched.
    pub fn reprice(&mut self, price: f64) {
        self.usd_value = usd_value(self.value, self.decimals, price);
    }

    pub fn has_balance(&self) -> bool {
        self.value > 0
    }
}

/// One validated row of a balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceObservation {
    pub address: Address,
    pub amount: u128,
    pub decimals: u8,
    pub symbol: String,
    pub chain_id: u64,
}
