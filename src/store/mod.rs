//! Balance/price state container — app-owned, SDK-provided update logic.
//!
//! The store is the single source of truth for what the wallet holds and what
//! it is worth. It is reconciled wholesale from provider snapshots and can be
//! mutated locally, and reversibly, for one pending swap at a time.
//!
//! Every mutation is synchronous. Provider failures are recorded on the
//! loading-state records instead of being returned, so readers always see the
//! last known values.

mod listeners;
mod optimistic;

pub use listeners::{ListenerId, StoreEvent};
pub use optimistic::{OptimisticSwap, OptimisticUpdateState};

use crate::domain::balance::wire::BalanceFeedEntry;
use crate::domain::balance::{BalanceObservation, TokenBalance};
use crate::domain::price::wire::PriceFeedEntry;
use crate::domain::price::{PriceQuote, TokenPrice};
use crate::domain::token::TokenRegistry;
use crate::error::OptimisticError;
use crate::shared::Symbol;

use chrono::{DateTime, Utc};
use listeners::Listeners;
use std::collections::{BTreeMap, HashMap};

/// Loading/error record for one kind of provider fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Loading/error records for both feeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadingState {
    pub balances: FetchStatus,
    pub prices: FetchStatus,
}

/// Outcome of [`BalancePriceStore::update_balances`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceUpdate {
    Applied { matched: usize, skipped: usize },
    /// An optimistic swap is pending; the snapshot was parked.
    Deferred,
}

/// Canonical balances and prices for the supported token set.
#[derive(Debug)]
pub struct BalancePriceStore {
    registry: TokenRegistry,
    balances: BTreeMap<Symbol, TokenBalance>,
    prices: BTreeMap<Symbol, TokenPrice>,
    loading: LoadingState,
    optimistic: OptimisticUpdateState,
    deferred_balances: Option<Vec<BalanceFeedEntry>>,
    generation: u64,
    listeners: Listeners,
}

impl BalancePriceStore {
    /// Zero-valued balances and prices for every registered token.
    pub fn new(registry: TokenRegistry) -> Self {
        let balances = registry
            .tokens()
            .iter()
            .map(|t| (t.symbol.clone(), TokenBalance::empty(t)))
            .collect();
        let prices = registry
            .tokens()
            .iter()
            .map(|t| (t.symbol.clone(), TokenPrice::empty(t)))
            .collect();

        Self {
            registry,
            balances,
            prices,
            loading: LoadingState::default(),
            optimistic: OptimisticUpdateState::default(),
            deferred_balances: None,
            generation: 0,
            listeners: Listeners::default(),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn balances(&self) -> &BTreeMap<Symbol, TokenBalance> {
        &self.balances
    }

    pub fn balance(&self, symbol: &Symbol) -> Option<&TokenBalance> {
        self.balances.get(symbol)
    }

    pub fn prices(&self) -> &BTreeMap<Symbol, TokenPrice> {
        &self.prices
    }

    /// Current price of `symbol`, `0.0` if it was never priced.
    pub fn price(&self, symbol: &Symbol) -> f64 {
        self.prices.get(symbol).map_or(0.0, |p| p.price)
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn optimistic(&self) -> &OptimisticUpdateState {
        &self.optimistic
    }

    /// Bumped by every applied balance mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_deferred_balances(&self) -> bool {
        self.deferred_balances.is_some()
    }

    /// Sum of every balance's USD value.
    pub fn total_usd_value(&self) -> f64 {
        self.balances.values().map(|b| b.usd_value).sum()
    }

    /// Balances with a non-zero amount.
    pub fn tokens_with_balance(&self) -> Vec<&TokenBalance> {
        self.balances.values().filter(|b| b.has_balance()).collect()
    }

    /// USD value held in tokens flagged as stablecoins.
    pub fn stablecoin_balance(&self) -> f64 {
        self.balances
            .values()
            .filter(|b| self.registry.is_stablecoin(&b.symbol))
            .map(|b| b.usd_value)
            .sum()
    }

    /// Run a selector against the current state.
    pub fn select<T>(&self, selector: impl FnOnce(&Self) -> T) -> T {
        selector(self)
    }

    // ── Subscriptions ────────────────────────────────────────────────────

    /// Register a listener called after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&StoreEvent, &BalancePriceStore) + Send + Sync + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&self, event: StoreEvent) {
        self.listeners.notify(&event, self);
    }

    // ── Loading state ────────────────────────────────────────────────────

    pub fn set_balances_loading(&mut self, loading: bool) {
        self.loading.balances.loading = loading;
        for balance in self.balances.values_mut() {
            balance.loading = loading;
        }
        self.emit(StoreEvent::LoadingChanged);
    }

    /// Record a failed balance fetch. Last known balances stay readable.
    pub fn set_balances_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.loading.balances.loading = false;
        self.loading.balances.error = Some(error.clone());
        for balance in self.balances.values_mut() {
            balance.loading = false;
            balance.error = Some(error.clone());
        }
        self.emit(StoreEvent::LoadingChanged);
    }

    pub fn set_prices_loading(&mut self, loading: bool) {
        self.loading.prices.loading = loading;
        self.emit(StoreEvent::LoadingChanged);
    }

    /// Record a failed price fetch. Last known prices stay readable.
    pub fn set_prices_error(&mut self, error: impl Into<String>) {
        self.loading.prices.loading = false;
        self.loading.prices.error = Some(error.into());
        self.emit(StoreEvent::LoadingChanged);
    }

    // ── Reconciliation ───────────────────────────────────────────────────

    /// Replace every balance with an authoritative snapshot.
    ///
    /// All amounts are reset to zero first, then each entry is matched to a
    /// supported token by address and valued at the token's current price.
    /// Entries for unsupported addresses, or with malformed amounts, are
    /// skipped.
    ///
    /// While an optimistic swap is pending the snapshot is parked instead
    /// (only the newest one is kept); see
    /// [`revert_optimistic_swap`](Self::revert_optimistic_swap) and
    /// [`confirm_optimistic_swap`](Self::confirm_optimistic_swap).
    pub fn update_balances(&mut self, feed: &[BalanceFeedEntry]) -> BalanceUpdate {
        if self.optimistic.is_active() {
            tracing::debug!(
                entries = feed.len(),
                tx_hash = ?self.optimistic.tx_hash(),
                "Optimistic swap pending, deferring balance snapshot"
            );
            self.deferred_balances = Some(feed.to_vec());
            self.emit(StoreEvent::BalancesDeferred);
            return BalanceUpdate::Deferred;
        }
        self.apply_balance_feed(feed)
    }

    fn apply_balance_feed(&mut self, feed: &[BalanceFeedEntry]) -> BalanceUpdate {
        let now = Utc::now();

        for balance in self.balances.values_mut() {
            let price = self.prices.get(&balance.symbol).map_or(0.0, |p| p.price);
            balance.set_value(0, price);
        }

        let mut matched = 0;
        let mut skipped = 0;
        for entry in feed {
            let obs = match BalanceObservation::try_from(entry) {
                Ok(obs) => obs,
                Err(err) => {
                    tracing::warn!(address = %entry.address, error = %err, "Skipping malformed balance entry");
                    skipped += 1;
                    continue;
                }
            };
            let Some(token) = self.registry.by_address(&obs.address) else {
                skipped += 1;
                continue;
            };
            if obs.decimals != token.decimals {
                tracing::warn!(
                    symbol = %token.symbol,
                    feed_decimals = obs.decimals,
                    configured_decimals = token.decimals,
                    "Balance feed decimals disagree with configuration, using configured value"
                );
            }

            let price = self.prices.get(&token.symbol).map_or(0.0, |p| p.price);
            if let Some(balance) = self.balances.get_mut(&token.symbol) {
                balance.set_value(obs.amount, price);
                balance.error = None;
                balance.last_updated = Some(now);
                matched += 1;
            }
        }

        self.loading.balances.error = None;
        self.loading.balances.last_updated = Some(now);
        self.generation += 1;

        tracing::info!(
            matched,
            skipped,
            generation = self.generation,
            total_usd = self.total_usd_value(),
            "Reconciled balances"
        );
        self.emit(StoreEvent::BalancesUpdated {
            generation: self.generation,
        });
        BalanceUpdate::Applied { matched, skipped }
    }

    /// Apply a price snapshot keyed by symbol and revalue affected balances.
    ///
    /// Returns how many supported symbols were updated.
    pub fn update_prices(&mut self, feed: &HashMap<String, PriceFeedEntry>) -> usize {
        let now = Utc::now();
        let mut applied = 0;

        for (symbol, entry) in feed {
            let quote = match PriceQuote::try_from((symbol.as_str(), entry)) {
                Ok(q) => q,
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping malformed price entry");
                    continue;
                }
            };
            let Some(price) = self.prices.get_mut(&quote.symbol) else {
                continue;
            };
            price.price = quote.price;
            price.estimated_gas = quote.estimated_gas;
            price.last_updated = Some(now);
            if let Some(balance) = self.balances.get_mut(&quote.symbol) {
                balance.reprice(quote.price);
            }
            applied += 1;
        }

        self.loading.prices.error = None;
        self.loading.prices.last_updated = Some(now);
        self.emit(StoreEvent::PricesUpdated);
        applied
    }

    // ── Optimistic swaps ─────────────────────────────────────────────────

    /// Reflect a swap in balances before it confirms.
    ///
    /// Snapshots the full balance map for rollback, debits the sell token and
    /// credits the buy token. Refused, with no state change, when another
    /// swap is pending, either token is unsupported, or the sell balance is
    /// too small.
    pub fn apply_optimistic_swap(&mut self, swap: OptimisticSwap) -> Result<(), OptimisticError> {
        if self.optimistic.is_active() {
            return Err(OptimisticError::AlreadyActive {
                tx_hash: self.optimistic.tx_hash().map(str::to_string),
            });
        }
        for symbol in [&swap.sell_symbol, &swap.buy_symbol] {
            if !self.balances.contains_key(symbol) {
                return Err(OptimisticError::UnknownToken(symbol.clone()));
            }
        }
        let available = self.balances[&swap.sell_symbol].value;
        if available < swap.sell_amount {
            return Err(OptimisticError::InsufficientBalance {
                symbol: swap.sell_symbol.clone(),
                available,
                requested: swap.sell_amount,
            });
        }

        self.optimistic
            .begin(self.balances.clone(), swap.tx_hash.clone(), self.generation);

        let sell_price = self.price(&swap.sell_symbol);
        if let Some(sell) = self.balances.get_mut(&swap.sell_symbol) {
            let value = sell.value - swap.sell_amount;
            sell.set_value(value, sell_price);
        }
        let buy_price = self.price(&swap.buy_symbol);
        if let Some(buy) = self.balances.get_mut(&swap.buy_symbol) {
            let value = buy.value.saturating_add(swap.buy_amount);
            buy.set_value(value, buy_price);
        }
        self.generation += 1;

        tracing::debug!(
            sell = %swap.sell_symbol,
            buy = %swap.buy_symbol,
            sell_amount = %swap.sell_amount,
            buy_amount = %swap.buy_amount,
            "Applied optimistic swap"
        );
        self.emit(StoreEvent::OptimisticApplied {
            generation: self.generation,
        });
        Ok(())
    }

    /// Attach the transaction hash once the swap has been submitted.
    pub fn set_optimistic_tx_hash(&mut self, tx_hash: impl Into<String>) -> bool {
        if !self.optimistic.is_active() {
            return false;
        }
        self.optimistic.set_tx_hash(tx_hash.into());
        true
    }

    /// Roll balances back to the pre-swap snapshot.
    ///
    /// Amounts are restored exactly and revalued at current prices, which may
    /// have moved while the swap was pending.
    ///
    /// A snapshot parked during the swap is applied afterwards, since it is
    /// newer than the rollback target. No-op (returns `false`) when nothing is
    /// pending.
    pub fn revert_optimistic_swap(&mut self) -> bool {
        let Some(snapshot) = self.optimistic.take() else {
            return false;
        };
        self.balances = snapshot;
        for balance in self.balances.values_mut() {
            let price = self.prices.get(&balance.symbol).map_or(0.0, |p| p.price);
            balance.reprice(price);
        }
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Reverted optimistic swap");
        self.emit(StoreEvent::OptimisticReverted {
            generation: self.generation,
        });

        if let Some(feed) = self.deferred_balances.take() {
            self.apply_balance_feed(&feed);
        }
        true
    }

    /// Keep the optimistic balances and drop the rollback snapshot.
    ///
    /// A snapshot parked during the swap predates the transaction and is
    /// discarded; the next fetch reconciles. Returns `false` when nothing is
    /// pending.
    pub fn confirm_optimistic_swap(&mut self) -> bool {
        if self.optimistic.take().is_none() {
            return false;
        }
        if self.deferred_balances.take().is_some() {
            tracing::debug!("Discarding balance snapshot parked during confirmed swap");
        }
        self.emit(StoreEvent::OptimisticConfirmed);
        true
    }
}
