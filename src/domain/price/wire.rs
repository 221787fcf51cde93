//! Wire types for the pricing provider (REST).

use crate::shared::serde_util::string_or_number;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price of one token. The feed is keyed by symbol, so the symbol is not
/// repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeedEntry {
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub price: String,
    #[serde(
        rename = "estimatedGas",
        default,
        deserialize_with = "string_or_number::deserialize"
    )]
    pub estimated_gas: String,
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// REST response for a batch of prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricesResponse {
    pub prices: HashMap<String, PriceFeedEntry>,
}
