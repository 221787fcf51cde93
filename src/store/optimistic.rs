//! Optimistic swap bookkeeping.

use crate::domain::balance::TokenBalance;
use crate::shared::Symbol;
use std::collections::BTreeMap;

/// A swap the UI wants reflected in balances before it confirms on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticSwap {
    pub sell_symbol: Symbol,
    pub buy_symbol: Symbol,
    /// Smallest unit of the sell token.
    pub sell_amount: u128,
    /// Smallest unit of the buy token.
    pub buy_amount: u128,
    pub tx_hash: Option<String>,
}

impl OptimisticSwap {
    pub fn new(
        sell_symbol: impl Into<Symbol>,
        buy_symbol: impl Into<Symbol>,
        sell_amount: u128,
        buy_amount: u128,
    ) -> Self {
        Self {
            sell_symbol: sell_symbol.into(),
            buy_symbol: buy_symbol.into(),
            sell_amount,
            buy_amount,
            tx_hash: None,
        }
    }

    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }
}

/// The single optimistic-mutation slot.
///
/// Active exactly when a rollback snapshot is held.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimisticUpdateState {
    original_balances: Option<BTreeMap<Symbol, TokenBalance>>,
    tx_hash: Option<String>,
    base_generation: u64,
}

impl OptimisticUpdateState {
    pub fn is_active(&self) -> bool {
        self.original_balances.is_some()
    }

    /// Balances as they were right before the pending swap.
    pub fn original_balances(&self) -> Option<&BTreeMap<Symbol, TokenBalance>> {
        self.original_balances.as_ref()
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    /// Store generation the snapshot was taken at.
    pub fn base_generation(&self) -> u64 {
        self.base_generation
    }

    pub(crate) fn begin(
        &mut self,
        snapshot: BTreeMap<Symbol, TokenBalance>,
        tx_hash: Option<String>,
        generation: u64,
    ) {
        self.original_balances = Some(snapshot);
        self.tx_hash = tx_hash;
        self.base_generation = generation;
    }

    pub(crate) fn set_tx_hash(&mut self, tx_hash: String) {
        self.tx_hash = Some(tx_hash);
    }

    /// Clear the slot, handing back the snapshot if there was one.
    pub(crate) fn take(&mut self) -> Option<BTreeMap<Symbol, TokenBalance>> {
        self.tx_hash = None;
        self.original_balances.take()
    }
}
