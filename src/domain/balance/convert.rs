//! Conversion: BalanceFeedEntry → BalanceObservation (TryFrom + validation).

use super::wire::BalanceFeedEntry;
use super::BalanceObservation;
use crate::domain::FeedError;
use crate::shared::{parse_units, Address};

impl TryFrom<&BalanceFeedEntry> for BalanceObservation {
    type Error = FeedError;

    fn try_from(entry: &BalanceFeedEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            address: Address::parse(&entry.address)?,
            amount: parse_units(&entry.amount)?,
            decimals: entry.decimals,
            symbol: entry.symbol.clone(),
            chain_id: entry.chain_id,
        })
    }
}
