//! Wire types for the activity indexer (REST).

use super::TokenMetadata;
use serde::{Deserialize, Serialize};

/// One activity row as the indexer reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFeedEntry {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub token_address: Option<String>,
    pub value: String,
    /// ISO-8601 / RFC 3339.
    pub block_time: String,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub token_metadata: Option<TokenMetadata>,
}

/// REST response for a wallet's activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activity: Vec<ActivityFeedEntry>,
}
