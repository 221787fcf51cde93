//! Network constants for the provider proxies.

/// Default base URL of the dashboard's provider proxy.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Rate-limiter key for the balance / activity indexer.
pub const BALANCES_PROVIDER_KEY: &str = "balances";

/// Rate-limiter key for the pricing / swap-quote provider.
pub const PRICING_PROVIDER_KEY: &str = "pricing";
