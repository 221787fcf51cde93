//! Wire types for the balance indexer (REST).

use serde::{Deserialize, Serialize};

/// One token balance as the indexer reports it.
///
/// Address and amount stay raw strings here so one malformed row can be
/// skipped during conversion instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceFeedEntry {
    pub address: String,
    pub amount: String,
    pub decimals: u8,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub chain_id: u64,
}

/// REST response for a wallet's balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub balances: Vec<BalanceFeedEntry>,
}
