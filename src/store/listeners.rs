//! Change notification for [`BalancePriceStore`](super::BalancePriceStore).

use super::BalancePriceStore;
use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What just changed in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// An authoritative balance snapshot was applied.
    BalancesUpdated { generation: u64 },
    /// A balance snapshot arrived while an optimistic swap was pending and
    /// was parked.
    BalancesDeferred,
    PricesUpdated,
    LoadingChanged,
    OptimisticApplied { generation: u64 },
    OptimisticConfirmed,
    OptimisticReverted { generation: u64 },
}

type Listener = Box<dyn Fn(&StoreEvent, &BalancePriceStore) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&self, event: &StoreEvent, store: &BalancePriceStore) {
        for (_, listener) in &self.entries {
            listener(event, store);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
