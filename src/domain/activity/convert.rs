//! Conversion: ActivityFeedEntry → ActivityEvent (TryFrom + validation).

use super::wire::ActivityFeedEntry;
use super::{ActivityEvent, ActivityType};
use crate::domain::FeedError;
use crate::shared::{parse_units, Address};
use chrono::{DateTime, Utc};

impl TryFrom<&ActivityFeedEntry> for ActivityEvent {
    type Error = FeedError;

    fn try_from(entry: &ActivityFeedEntry) -> Result<Self, Self::Error> {
        let event_type: ActivityType = entry.event_type.parse().map_err(FeedError::ActivityType)?;

        let token_address = match entry.token_address.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(addr) => Some(Address::parse(addr)?),
        };

        let block_time = DateTime::parse_from_rfc3339(entry.block_time.trim())
            .map_err(|e| FeedError::Timestamp {
                input: entry.block_time.clone(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Self {
            event_type,
            token_address,
            value: parse_units(&entry.value)?,
            block_time,
            asset_type: entry.asset_type.clone(),
            token_metadata: entry.token_metadata.clone(),
        })
    }
}

/// Convert a whole activity feed, skipping (and logging) malformed rows.
pub fn events_from_feed(entries: &[ActivityFeedEntry]) -> Vec<ActivityEvent> {
    entries
        .iter()
        .filter_map(|entry| match ActivityEvent::try_from(entry) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed activity entry");
                None
            }
        })
        .collect()
}
