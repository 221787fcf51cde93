//! Prices sub-client — rate-limited price snapshots.

use crate::client::WalletClient;
use crate::domain::price::wire::PriceFeedEntry;
use crate::domain::price::PriceQuote;
use crate::error::SdkError;
use crate::network::PRICING_PROVIDER_KEY;
use crate::shared::Symbol;
use crate::store::BalancePriceStore;
use std::collections::HashMap;

pub struct Prices<'a> {
    pub(crate) client: &'a WalletClient,
}

impl<'a> Prices<'a> {
    /// Fetch raw price entries keyed by symbol.
    ///
    /// Waits for admission on the `"pricing"` limiter first.
    pub async fn fetch(&self, symbols: &[Symbol]) -> Result<HashMap<String, PriceFeedEntry>, SdkError> {
        let http = &self.client.http;
        let resp = self
            .client
            .limiters
            .pricing
            .execute(PRICING_PROVIDER_KEY, || http.get_prices(symbols))
            .await??;
        Ok(resp.prices)
    }

    /// Fetch and validate prices for every registered token.
    ///
    /// Malformed entries are skipped.
    pub async fn quotes(&self) -> Result<Vec<PriceQuote>, SdkError> {
        let symbols: Vec<Symbol> = self.client.registry.symbols().cloned().collect();
        let feed = self.fetch(&symbols).await?;

        let mut quotes: Vec<PriceQuote> = feed
            .iter()
            .filter_map(|(symbol, entry)| match PriceQuote::try_from((symbol.as_str(), entry)) {
                Ok(quote) => Some(quote),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping malformed price entry");
                    None
                }
            })
            .collect();
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(quotes)
    }

    /// Fetch prices for every token in `store` and revalue its balances.
    ///
    /// Returns how many symbols were priced. On failure the error is recorded
    /// on the store and returned; the previous prices stay in place.
    pub async fn refresh(&self, store: &mut BalancePriceStore) -> Result<usize, SdkError> {
        let symbols: Vec<Symbol> = store.registry().symbols().cloned().collect();
        store.set_prices_loading(true);
        match self.fetch(&symbols).await {
            Ok(feed) => {
                let applied = store.update_prices(&feed);
                store.set_prices_loading(false);
                Ok(applied)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Price refresh failed");
                store.set_prices_error(err.to_string());
                Err(err)
            }
        }
    }
}
