//! Activity sub-client — the wallet's event log and derived history.

use crate::client::WalletClient;
use crate::domain::activity::{events_from_feed, ActivityEvent};
use crate::domain::portfolio::{PortfolioHistoryReconstructor, PortfolioPoint};
use crate::error::SdkError;
use crate::network::BALANCES_PROVIDER_KEY;
use crate::shared::{Address, Timeframe};
use crate::store::BalancePriceStore;

pub struct Activity<'a> {
    pub(crate) client: &'a WalletClient,
}

impl<'a> Activity<'a> {
    /// Fetch the full activity log for `wallet`, skipping malformed entries.
    ///
    /// The activity indexer shares the `"balances"` limiter.
    pub async fn fetch(&self, wallet: &Address) -> Result<Vec<ActivityEvent>, SdkError> {
        let http = &self.client.http;
        let resp = self
            .client
            .limiters
            .balances
            .execute(BALANCES_PROVIDER_KEY, || http.get_activity(wallet))
            .await??;
        Ok(events_from_feed(&resp.activity))
    }

    /// Fetch the activity log and replay it against `store`.
    pub async fn history(
        &self,
        store: &BalancePriceStore,
        wallet: &Address,
        timeframe: Timeframe,
    ) -> Result<Vec<PortfolioPoint>, SdkError> {
        let events = self.fetch(wallet).await?;
        Ok(PortfolioHistoryReconstructor::new(store).reconstruct(&events, timeframe))
    }
}
