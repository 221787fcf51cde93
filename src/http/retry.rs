//! When and how long `ProviderHttp` waits before asking a provider again.
//!
//! Every provider endpoint is a read, so a failed call can be repeated
//! freely. The policy only decides which failures are worth repeating and the
//! pause before each repeat.

use crate::error::HttpError;
use std::time::Duration;

/// Share of the backoff delay that jitter may add or remove.
const JITTER_SHARE: f64 = 0.25;

/// How a `ProviderHttp` treats failed GETs.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Fail on the first error.
    None,
    /// [`RetryConfig::idempotent`]: transport failures, 429 and 502/503/504
    /// are repeated.
    #[default]
    Idempotent,
    /// Caller-tuned limits and status list.
    Custom(RetryConfig),
}

/// Limits for repeating a provider GET.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Repeats after the first call. A request is sent at most
    /// `max_retries + 1` times.
    pub max_retries: u32,
    /// Pause before the first repeat.
    pub initial_delay: Duration,
    /// Upper bound on any backoff pause.
    pub max_delay: Duration,
    /// Growth of the pause from one repeat to the next.
    pub backoff_factor: f64,
    /// Spread each pause by up to a quarter either way.
    pub jitter: bool,
    /// Statuses worth repeating. Any 4xx not listed here fails at once.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    /// Three repeats, 200ms doubling to at most 10s, jittered.
    pub fn idempotent() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    /// Backoff pause before repeat number `attempt + 1`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let grown = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let secs = grown.min(self.max_delay.as_secs_f64()).max(0.0);
        let spread = if self.jitter {
            1.0 + (rand::random::<f64>() * 2.0 - 1.0) * JITTER_SHARE
        } else {
            1.0
        };
        Duration::from_secs_f64(secs * spread)
    }

    /// Whether `err` is worth another attempt under this config.
    pub fn is_retryable(&self, err: &HttpError) -> bool {
        match err {
            HttpError::ServerError { status, .. } => self.retryable_statuses.contains(status),
            HttpError::RateLimited { .. } => self.retryable_statuses.contains(&429),
            HttpError::Timeout => true,
            HttpError::Reqwest(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                let transient = e.is_connect() || e.is_timeout() || e.is_request();
                #[cfg(target_arch = "wasm32")]
                let transient = e.is_timeout() || e.is_request();
                transient
            }
            _ => false,
        }
    }

    /// Pause before repeating after `err`. A provider's `Retry-After` replaces
    /// the backoff for that attempt.
    pub fn delay_after(&self, err: &HttpError, attempt: u32) -> Duration {
        match err {
            HttpError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms),
            _ => self.delay_for_attempt(attempt),
        }
    }
}
