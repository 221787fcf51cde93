//! Backward replay of the activity log into a daily value series.
//!
//! Historical prices are not available, so every past day is valued at
//! today's prices. The series therefore shows how holdings changed, not how
//! their market value moved.

use super::PortfolioPoint;
use crate::domain::activity::{ActivityEvent, BalanceEffect};
use crate::shared::{usd_value, Symbol, Timeframe};
use crate::store::BalancePriceStore;
use chrono::{Days, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Derives a [`PortfolioPoint`] series from the current state of a store.
///
/// Pure: it only reads the store and never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioHistoryReconstructor<'a> {
    store: &'a BalancePriceStore,
}

impl<'a> PortfolioHistoryReconstructor<'a> {
    pub fn new(store: &'a BalancePriceStore) -> Self {
        Self { store }
    }

    /// Series ending today (UTC).
    pub fn reconstruct(&self, activity: &[ActivityEvent], timeframe: Timeframe) -> Vec<PortfolioPoint> {
        self.reconstruct_at(activity, timeframe, Utc::now().date_naive())
    }

    /// Series of `timeframe.days() + 1` points covering `[today - N, today]`,
    /// oldest first.
    ///
    /// Walking back one day at a time, the events of the following day are
    /// undone: receives and mints are subtracted, sends and burns are added
    /// back. Swaps, approvals and calls are left alone. Events that resolve to
    /// no supported token are ignored. Balances that would go negative are
    /// clamped to zero at the end of each day.
    pub fn reconstruct_at(
        &self,
        activity: &[ActivityEvent],
        timeframe: Timeframe,
        today: NaiveDate,
    ) -> Vec<PortfolioPoint> {
        let days = timeframe.days();
        let by_day = self.net_changes_by_day(activity);

        let mut holdings: BTreeMap<Symbol, u128> = self
            .store
            .balances()
            .iter()
            .map(|(symbol, balance)| (symbol.clone(), balance.value))
            .collect();

        let mut points = Vec::with_capacity(days as usize + 1);
        let mut day = today;
        points.push(PortfolioPoint {
            date: day,
            value: self.value_of(&holdings),
        });

        for _ in 0..days {
            if let Some(changes) = by_day.get(&day) {
                undo_day(&mut holdings, changes);
            }
            let Some(previous) = day.checked_sub_days(Days::new(1)) else {
                break;
            };
            day = previous;
            points.push(PortfolioPoint {
                date: day,
                value: self.value_of(&holdings),
            });
        }

        points.reverse();
        tracing::debug!(
            timeframe = %timeframe,
            points = points.len(),
            events = activity.len(),
            "Reconstructed portfolio history"
        );
        points
    }

    /// Net signed movement per symbol, grouped by the UTC day it happened.
    fn net_changes_by_day(&self, activity: &[ActivityEvent]) -> BTreeMap<NaiveDate, BTreeMap<Symbol, i128>> {
        let registry = self.store.registry();
        let mut by_day: BTreeMap<NaiveDate, BTreeMap<Symbol, i128>> = BTreeMap::new();

        for event in activity {
            let Some(effect) = event.event_type.balance_effect() else {
                continue;
            };
            let Some(token) = registry.resolve(event.token_address.as_ref()) else {
                continue;
            };
            let amount = i128::try_from(event.value).unwrap_or(i128::MAX);
            let signed = match effect {
                BalanceEffect::Credit => amount,
                BalanceEffect::Debit => -amount,
            };
            let net = by_day
                .entry(event.day())
                .or_default()
                .entry(token.symbol.clone())
                .or_insert(0);
            *net = net.saturating_add(signed);
        }
        by_day
    }

    /// USD value of `holdings` at today's prices.
    fn value_of(&self, holdings: &BTreeMap<Symbol, u128>) -> f64 {
        holdings
            .iter()
            .map(|(symbol, amount)| {
                let decimals = self.store.balance(symbol).map_or(0, |b| b.decimals);
                usd_value(*amount, decimals, self.store.price(symbol))
            })
            .sum()
    }
}

fn undo_day(holdings: &mut BTreeMap<Symbol, u128>, changes: &BTreeMap<Symbol, i128>) {
    for (symbol, net) in changes {
        let Some(held) = holdings.get_mut(symbol) else {
            continue;
        };
        let current = i128::try_from(*held).unwrap_or(i128::MAX);
        let before = current.saturating_sub(*net).max(0);
        *held = before as u128;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::ActivityType;
    use crate::domain::balance::wire::BalanceFeedEntry;
    use crate::domain::price::wire::PriceFeedEntry;
    use crate::domain::token::{TokenConfig, TokenRegistry};
    use crate::shared::Address;
    use chrono::{DateTime, TimeZone};
    use std::collections::HashMap;

    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const WBTC: &str = "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn at(days_ago: u64, hour: u32) -> DateTime<Utc> {
        let date = today() - Days::new(days_ago);
        Utc.from_utc_datetime(&date.and_hms_opt(hour, 30, 0).unwrap())
    }

    fn store(usdc: &str, eth: &str) -> BalancePriceStore {
        let registry = TokenRegistry::new(vec![
            TokenConfig::new("ETH", Address::zero(), 18).native(),
            TokenConfig::new("USDC", Address::parse(USDC).unwrap(), 6).stablecoin(),
            TokenConfig::new("WBTC", Address::parse(WBTC).unwrap(), 8),
        ])
        .unwrap();
        let mut store = BalancePriceStore::new(registry);

        let prices: HashMap<String, PriceFeedEntry> = [("ETH", "2000"), ("USDC", "1"), ("WBTC", "60000")]
            .into_iter()
            .map(|(s, p)| {
                (
                    s.to_string(),
                    PriceFeedEntry {
                        price: p.to_string(),
                        estimated_gas: String::new(),
                        decimals: None,
                    },
                )
            })
            .collect();
        store.update_prices(&prices);
        store.update_balances(&[
            BalanceFeedEntry {
                address: USDC.to_string(),
                amount: usdc.to_string(),
                decimals: 6,
                symbol: "USDC".to_string(),
                chain_id: 1,
            },
            BalanceFeedEntry {
                address: Address::ZERO.to_string(),
                amount: eth.to_string(),
                decimals: 18,
                symbol: "ETH".to_string(),
                chain_id: 1,
            },
        ]);
        store
    }

    fn event(event_type: ActivityType, token: Option<&str>, value: u128, block_time: DateTime<Utc>) -> ActivityEvent {
        ActivityEvent {
            event_type,
            token_address: token.map(|a| Address::parse(a).unwrap()),
            value,
            block_time,
            asset_type: "erc20".to_string(),
            token_metadata: None,
        }
    }

    fn values(points: &[PortfolioPoint]) -> Vec<f64> {
        points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_empty_activity_is_flat_at_current_total() {
        let store = store("1500000", "1000000000000000000");
        let total = store.total_usd_value();
        for timeframe in Timeframe::ALL {
            let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&[], timeframe, today());
            assert_eq!(points.len(), timeframe.days() as usize + 1);
            assert!(points.iter().all(|p| p.value == total), "{timeframe}");
        }
    }

    #[test]
    fn test_dates_are_contiguous_and_oldest_first() {
        let store = store("0", "0");
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&[], Timeframe::Days30, today());
        assert_eq!(points.first().unwrap().date, today() - Days::new(30));
        assert_eq!(points.last().unwrap().date, today());
        for pair in points.windows(2) {
            assert_eq!(pair[0].date + Days::new(1), pair[1].date);
        }
    }

    #[test]
    fn test_single_receive_appears_on_its_day() {
        let store = store("5000000", "0");
        let activity = [event(ActivityType::Receive, Some(USDC), 5_000_000, at(2, 14))];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Days7, today());

        assert_eq!(points.len(), 8);
        assert_eq!(values(&points), [0.0, 0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0]);
        assert_eq!(points[5].date, today() - Days::new(2));
    }

    #[test]
    fn test_send_is_added_back() {
        let store = store("1000000", "0");
        let activity = [event(ActivityType::Send, Some(USDC), 3_000_000, at(0, 9))];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Day1, today());
        assert_eq!(values(&points), [4.0, 1.0]);
    }

    #[test]
    fn test_mint_and_burn() {
        let store = store("10000000", "0");
        let activity = [
            event(ActivityType::Mint, Some(USDC), 4_000_000, at(1, 1)),
            event(ActivityType::Burn, Some(USDC), 1_000_000, at(3, 1)),
        ];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Days7, today());
        assert_eq!(values(&points), [7.0, 7.0, 7.0, 7.0, 6.0, 6.0, 10.0, 10.0]);
    }

    #[test]
    fn test_swap_approve_and_call_are_not_reversed() {
        let store = store("2000000", "0");
        let activity = [
            event(ActivityType::Swap, Some(USDC), 2_000_000, at(1, 5)),
            event(ActivityType::Approve, Some(USDC), 2_000_000, at(1, 6)),
            event(ActivityType::Call, None, 1, at(1, 7)),
        ];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Days7, today());
        assert!(points.iter().all(|p| p.value == 2.0));
    }

    #[test]
    fn test_native_events_resolve_without_address() {
        let store = store("0", "1000000000000000000");
        let activity = [event(ActivityType::Receive, None, 1_000_000_000_000_000_000, at(0, 12))];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Day1, today());
        assert_eq!(values(&points), [0.0, 2000.0]);
    }

    #[test]
    fn test_unsupported_token_is_skipped() {
        let store = store("1000000", "0");
        let activity = [event(
            ActivityType::Receive,
            Some("0x1111111111111111111111111111111111111111"),
            1_000_000,
            at(0, 12),
        )];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Day1, today());
        assert_eq!(values(&points), [1.0, 1.0]);
    }

    #[test]
    fn test_negative_balances_clamp_to_zero() {
        // Received more than currently held: the history is incomplete.
        let store = store("1000000", "0");
        let activity = [
            event(ActivityType::Receive, Some(USDC), 3_000_000, at(1, 12)),
            event(ActivityType::Send, Some(USDC), 2_000_000, at(2, 12)),
        ];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Days7, today());
        assert_eq!(values(&points), [2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 1.0, 1.0]);
        assert!(points.iter().all(|p| p.value >= 0.0));
    }

    #[test]
    fn test_same_day_events_net_before_clamping() {
        let store = store("1000000", "0");
        let activity = [
            event(ActivityType::Receive, Some(USDC), 3_000_000, at(0, 8)),
            event(ActivityType::Send, Some(USDC), 2_500_000, at(0, 20)),
        ];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Day1, today());
        assert_eq!(values(&points), [0.5, 1.0]);
    }

    #[test]
    fn test_events_outside_window_are_ignored() {
        let store = store("1000000", "0");
        let activity = [
            event(ActivityType::Receive, Some(USDC), 1_000_000, at(40, 12)),
            event(ActivityType::Receive, Some(USDC), 1_000_000, at(0, 12) + chrono::Duration::days(1)),
        ];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Days7, today());
        assert!(points.iter().all(|p| p.value == 1.0));
    }

    #[test]
    fn test_uses_todays_prices_for_every_day() {
        let store = store("0", "2000000000000000000");
        let activity = [event(ActivityType::Receive, None, 1_000_000_000_000_000_000, at(0, 0))];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct_at(&activity, Timeframe::Day1, today());
        assert_eq!(values(&points), [2000.0, 4000.0]);
    }

    #[test]
    fn test_reconstruct_does_not_mutate_store() {
        let store = store("1000000", "0");
        let before = store.balances().clone();
        let activity = [event(ActivityType::Receive, Some(USDC), 1_000_000, at(0, 1))];
        let points = PortfolioHistoryReconstructor::new(&store).reconstruct(&activity, Timeframe::Days7);
        assert_eq!(points.len(), 8);
        assert_eq!(store.balances(), &before);
    }
}
