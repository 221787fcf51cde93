//! Activity domain — the wallet's on-chain event log.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::shared::{serde_util, Address};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use convert::events_from_feed;

/// Kind of activity reported by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Receive,
    Send,
    Swap,
    Mint,
    Burn,
    Approve,
    Call,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receive => "receive",
            Self::Send => "send",
            Self::Swap => "swap",
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::Approve => "approve",
            Self::Call => "call",
        }
    }

    /// How this kind of event moved the wallet's holdings, if it is modeled.
    ///
    /// Swaps move two assets but the indexer reports a single leg, so they are
    /// not modeled; approvals and contract calls move nothing.
    pub fn balance_effect(&self) -> Option<BalanceEffect> {
        match self {
            Self::Receive | Self::Mint => Some(BalanceEffect::Credit),
            Self::Send | Self::Burn => Some(BalanceEffect::Debit),
            Self::Swap | Self::Approve | Self::Call => None,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receive" => Ok(Self::Receive),
            "send" => Ok(Self::Send),
            "swap" => Ok(Self::Swap),
            "mint" => Ok(Self::Mint),
            "burn" => Ok(Self::Burn),
            "approve" => Ok(Self::Approve),
            "call" => Ok(Self::Call),
            other => Err(other.to_string()),
        }
    }
}

/// Direction of a modeled balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEffect {
    /// The wallet gained the asset.
    Credit,
    /// The wallet lost the asset.
    Debit,
}

/// Symbol/decimals the indexer attaches to token transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// One validated activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_type: ActivityType,
    /// `None` for the chain's native asset.
    pub token_address: Option<Address>,
    /// Smallest on-chain unit.
    #[serde(with = "serde_util::u128_string")]
    pub value: u128,
    pub block_time: DateTime<Utc>,
    pub asset_type: String,
    pub token_metadata: Option<TokenMetadata>,
}

impl ActivityEvent {
    /// UTC calendar day the event was mined on.
    pub fn day(&self) -> NaiveDate {
        self.block_time.date_naive()
    }
}
