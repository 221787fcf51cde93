//! High-level client — `WalletClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared provider limiters, and accessor
//! methods.

use crate::domain::activity::client::Activity;
use crate::domain::balance::client::Balances;
use crate::domain::price::client::Prices;
use crate::domain::token::TokenRegistry;
use crate::error::SdkError;
use crate::http::{ProviderHttp, RetryPolicy};
use crate::rate_limit::{ProviderLimiters, RateLimiterConfig};
use crate::store::BalancePriceStore;

// Re-export sub-client types for convenience.
pub use crate::domain::activity::client::Activity as ActivityClient;
pub use crate::domain::balance::client::Balances as BalancesClient;
pub use crate::domain::price::client::Prices as PricesClient;

/// The primary entry point for fetching provider data.
///
/// Provides nested sub-client accessors for each feed:
/// `client.balances()`, `client.prices()`, `client.activity()`.
///
/// Clones share the HTTP connection pool and the rate limiter state, so every
/// clone counts against the same provider budgets.
#[derive(Clone)]
pub struct WalletClient {
    pub(crate) http: ProviderHttp,
    pub(crate) limiters: ProviderLimiters,
    pub(crate) registry: TokenRegistry,
}

impl WalletClient {
    pub fn builder() -> WalletClientBuilder {
        WalletClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn balances(&self) -> Balances<'_> {
        Balances { client: self }
    }

    pub fn prices(&self) -> Prices<'_> {
        Prices { client: self }
    }

    pub fn activity(&self) -> Activity<'_> {
        Activity { client: self }
    }

    // ── Shared state ─────────────────────────────────────────────────────

    pub fn limiters(&self) -> &ProviderLimiters {
        &self.limiters
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Empty store for this client's token set.
    pub fn new_store(&self) -> BalancePriceStore {
        BalancePriceStore::new(self.registry.clone())
    }

    /// Replace (or clear) the provider API key for every clone.
    pub async fn set_api_key(&self, key: Option<String>) {
        self.http.set_api_key(key).await;
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct WalletClientBuilder {
    base_url: String,
    registry: TokenRegistry,
    balances_limiter: RateLimiterConfig,
    pricing_limiter: RateLimiterConfig,
    retry: RetryPolicy,
    api_key: Option<String>,
}

impl Default for WalletClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            registry: TokenRegistry::default(),
            balances_limiter: RateLimiterConfig::balances_provider(),
            pricing_limiter: RateLimiterConfig::pricing_provider(),
            retry: RetryPolicy::Idempotent,
            api_key: None,
        }
    }
}

impl WalletClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// The supported token set. Required.
    pub fn tokens(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn balances_limiter(mut self, config: RateLimiterConfig) -> Self {
        self.balances_limiter = config;
        self
    }

    pub fn pricing_limiter(mut self, config: RateLimiterConfig) -> Self {
        self.pricing_limiter = config;
        self
    }

    /// Retry policy applied to every provider request.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn build(self) -> Result<WalletClient, SdkError> {
        if self.registry.is_empty() {
            return Err(SdkError::Validation(
                "WalletClient needs at least one configured token".to_string(),
            ));
        }
        for (name, config) in [
            ("balances", &self.balances_limiter),
            ("pricing", &self.pricing_limiter),
        ] {
            if !(config.max_tokens > 0.0) || !(config.refill_per_second > 0.0) {
                return Err(SdkError::Validation(format!(
                    "{name} limiter needs a positive capacity and refill rate"
                )));
            }
        }

        let http = ProviderHttp::with_retry(&self.base_url, self.retry)?.with_api_key(self.api_key);
        Ok(WalletClient {
            http,
            limiters: ProviderLimiters::new(self.balances_limiter, self.pricing_limiter),
            registry: self.registry,
        })
    }
}
