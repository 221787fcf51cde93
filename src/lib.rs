//! # Wallet Dashboard SDK
//!
//! The client-side state engine behind a multi-token wallet dashboard: it
//! admits provider calls through per-provider token buckets, keeps one
//! canonical balance/price store with reversible optimistic swaps, and
//! replays the activity log into a daily portfolio-value series.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Newtypes, unit math, token registry, feed types (always available, WASM-safe)
//! 2. **Admission** — `RateLimiter` with per-key buckets and FIFO queues
//! 3. **State** — `BalancePriceStore` and `PortfolioHistoryReconstructor` (synchronous, app-owned)
//! 4. **HTTP API** — `ProviderHttp` with configurable retry policies
//! 5. **High-Level Client** — `WalletClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wallet_dashboard_sdk::prelude::*;
//!
//! let client = WalletClient::builder()
//!     .base_url("http://localhost:3000")
//!     .tokens(TokenRegistry::from_json(TOKENS_JSON)?)
//!     .build()?;
//!
//! let mut store = client.new_store();
//! client.prices().refresh(&mut store).await?;
//! client.balances().refresh(&mut store, &wallet).await?;
//!
//! let chart = client.activity().history(&store, &wallet, Timeframe::Days7).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and unit conversion.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL and provider-key constants.
pub mod network;

// ── Layer 2: Admission ───────────────────────────────────────────────────────

/// Token-bucket rate limiting for provider calls.
pub mod rate_limit;

// ── Layer 3: State ───────────────────────────────────────────────────────────

/// The canonical balance/price store.
pub mod store;

// ── Layer 4: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `WalletClient` — the primary entry point for fetching.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{format_units, parse_units, usd_value, Address, Symbol, Timeframe};

    // Domain types
    pub use crate::domain::activity::{ActivityEvent, ActivityType, BalanceEffect};
    pub use crate::domain::balance::TokenBalance;
    pub use crate::domain::portfolio::{PortfolioHistoryReconstructor, PortfolioPoint};
    pub use crate::domain::price::TokenPrice;
    pub use crate::domain::token::{TokenConfig, TokenRegistry};

    // Errors
    pub use crate::error::{OptimisticError, RateLimitError, SdkError};

    // Network
    pub use crate::network::{BALANCES_PROVIDER_KEY, DEFAULT_API_URL, PRICING_PROVIDER_KEY};

    // Admission
    pub use crate::rate_limit::{ProviderLimiters, RateLimiter, RateLimiterConfig};

    // State containers
    pub use crate::store::{
        BalancePriceStore, BalanceUpdate, ListenerId, OptimisticSwap, StoreEvent,
    };

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        ActivityClient, BalancesClient, PricesClient, WalletClient, WalletClientBuilder,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
}
