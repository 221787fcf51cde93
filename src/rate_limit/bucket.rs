//! Token bucket arithmetic. Pure: callers pass `now` in.

use super::RateLimiterConfig;
use std::time::Duration;
use web_time::Instant;

/// One bucket per rate-limited key.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A bucket created on first use starts full.
    pub fn full(config: &RateLimiterConfig, now: Instant) -> Self {
        Self {
            tokens: config.max_tokens,
            last_refill: now,
        }
    }

    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    /// `tokens = min(max_tokens, tokens + elapsed × refill_rate)`.
    pub fn refill(&mut self, config: &RateLimiterConfig, now: Instant) {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_secs_f64() * 1000.0;
        self.tokens = (self.tokens + elapsed_ms * config.refill_per_ms()).min(config.max_tokens);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }

    /// Refill, then take one token if a whole one is available.
    pub fn try_consume(&mut self, config: &RateLimiterConfig, now: Instant) -> bool {
        self.refill(config, now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until one whole token will be available, `Duration::MAX` if the
    /// bucket never refills.
    pub fn wait_time(&self, config: &RateLimiterConfig) -> Duration {
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        let rate = config.refill_per_ms();
        if rate <= 0.0 {
            return Duration::MAX;
        }
        let missing_ms = (1.0 - self.tokens) / rate;
        Duration::from_secs_f64(missing_ms / 1000.0)
    }
}
