//! HTTP client layer — `ProviderHttp` with configurable retry policies.

pub mod client;
pub mod retry;

pub use client::ProviderHttp;
pub use retry::{RetryConfig, RetryPolicy};
