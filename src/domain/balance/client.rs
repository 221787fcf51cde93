//! Balances sub-client — rate-limited balance snapshots.

use crate::client::WalletClient;
use crate::domain::balance::wire::BalanceFeedEntry;
use crate::error::SdkError;
use crate::network::BALANCES_PROVIDER_KEY;
use crate::shared::Address;
use crate::store::{BalancePriceStore, BalanceUpdate};

pub struct Balances<'a> {
    pub(crate) client: &'a WalletClient,
}

impl<'a> Balances<'a> {
    /// Fetch the raw balance snapshot for `wallet`.
    ///
    /// Waits for admission on the `"balances"` limiter first.
    pub async fn fetch(&self, wallet: &Address) -> Result<Vec<BalanceFeedEntry>, SdkError> {
        let http = &self.client.http;
        let resp = self
            .client
            .limiters
            .balances
            .execute(BALANCES_PROVIDER_KEY, || http.get_balances(wallet))
            .await??;
        Ok(resp.balances)
    }

    /// Fetch and reconcile into `store`.
    ///
    /// Marks balances as loading while the request is in flight. On failure
    /// the error is recorded on the store, which keeps its last known
    /// balances, and also returned.
    pub async fn refresh(
        &self,
        store: &mut BalancePriceStore,
        wallet: &Address,
    ) -> Result<BalanceUpdate, SdkError> {
        store.set_balances_loading(true);
        match self.fetch(wallet).await {
            Ok(feed) => {
                let outcome = store.update_balances(&feed);
                store.set_balances_loading(false);
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(wallet = %wallet, error = %err, "Balance refresh failed");
                store.set_balances_error(err.to_string());
                Err(err)
            }
        }
    }
}
