//! Token-bucket admission control for outbound provider calls.
//!
//! Each logical resource key (one per provider) owns a bucket and a FIFO
//! queue of waiters. Excess demand waits in the key's queue instead of
//! failing fast; the only failure is a queue timeout.
//!
//! Keys are independent: an exhausted `"balances"` bucket never delays a
//! `"pricing"` call.

mod bucket;

pub use bucket::TokenBucket;

use crate::error::RateLimitError;
use crate::network::{BALANCES_PROVIDER_KEY, PRICING_PROVIDER_KEY};

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use web_time::Instant;

/// Configuration for one limiter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// Bucket capacity (burst size).
    pub max_tokens: f64,
    /// Tokens added per second of elapsed time.
    pub refill_per_second: f64,
    /// A queued request older than this is rejected.
    pub queue_timeout: Duration,
    /// Upper bound on a single sleep of the wait loop.
    pub max_poll_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::balances_provider()
    }
}

impl RateLimiterConfig {
    /// Burst 5, refill 5/s — balance and activity indexer.
    pub fn balances_provider() -> Self {
        Self {
            max_tokens: 5.0,
            refill_per_second: 5.0,
            queue_timeout: Duration::from_secs(30),
            max_poll_interval: Duration::from_millis(100),
        }
    }

    /// Burst 10, refill 10/s — pricing and swap-quote provider.
    pub fn pricing_provider() -> Self {
        Self {
            max_tokens: 10.0,
            refill_per_second: 10.0,
            ..Self::balances_provider()
        }
    }

    pub(crate) fn refill_per_ms(&self) -> f64 {
        self.refill_per_second / 1000.0
    }
}

/// Point-in-time view of one key.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitStatus {
    pub key: String,
    pub tokens: f64,
    pub max_tokens: f64,
    pub queued: usize,
}

#[derive(Debug)]
struct Waiter {
    id: u64,
    enqueued_at: Instant,
}

#[derive(Debug, PartialEq)]
enum Step {
    Admitted,
    TimedOut(Duration),
    Wait(Duration),
    /// The waiter is no longer in its queue and has not taken a token.
    Missing,
}

#[derive(Debug, Default)]
struct Inner {
    buckets: HashMap<String, TokenBucket>,
    queues: HashMap<String, VecDeque<Waiter>>,
    next_waiter_id: u64,
}

impl Inner {
    fn bucket(&mut self, key: &str, config: &RateLimiterConfig, now: Instant) -> &mut TokenBucket {
        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::full(config, now))
    }

    fn queue_len(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, VecDeque::len)
    }

    /// Immediate admission. Never jumps ahead of requests already waiting.
    fn try_admit(&mut self, key: &str, config: &RateLimiterConfig, now: Instant) -> bool {
        if self.queue_len(key) > 0 {
            return false;
        }
        self.bucket(key, config, now).try_consume(config, now)
    }

    fn enqueue(&mut self, key: &str, now: Instant) -> u64 {
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.queues.entry(key.to_string()).or_default().push_back(Waiter {
            id,
            enqueued_at: now,
        });
        id
    }

    fn remove(&mut self, key: &str, id: u64) {
        if let Some(queue) = self.queues.get_mut(key) {
            queue.retain(|w| w.id != id);
            if queue.is_empty() {
                self.queues.remove(key);
            }
        }
    }

    fn step(&mut self, key: &str, id: u64, config: &RateLimiterConfig, now: Instant) -> Step {
        let (enqueued_at, is_head) = match self.queues.get(key) {
            Some(queue) => match queue.iter().position(|w| w.id == id) {
                Some(pos) => (queue[pos].enqueued_at, pos == 0),
                None => return Step::Missing,
            },
            None => return Step::Missing,
        };

        let waited = now.saturating_duration_since(enqueued_at);
        if waited > config.queue_timeout {
            self.remove(key, id);
            return Step::TimedOut(waited);
        }

        if !is_head {
            return Step::Wait(config.max_poll_interval);
        }

        let bucket = self.bucket(key, config, now);
        if bucket.try_consume(config, now) {
            self.remove(key, id);
            Step::Admitted
        } else {
            Step::Wait(bucket.wait_time(config).min(config.max_poll_interval))
        }
    }
}

/// Per-key token-bucket rate limiter.
///
/// Cheap to clone; clones share buckets and queues.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    inner: Arc<Mutex<Inner>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Critical sections never panic midway, so a poisoned lock still holds
        // consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a token without waiting. Returns `false` if the bucket is empty or
    /// other requests are already queued on `key`.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.lock().try_admit(key, &self.config, Instant::now())
    }

    /// Wait for a token on `key`.
    ///
    /// Resolves on the first poll when a token is available and nobody is
    /// queued ahead. Otherwise the request joins the key's FIFO queue and
    /// retries every `min(time_to_next_token, max_poll_interval)` until it is
    /// admitted or has waited longer than `queue_timeout`.
    ///
    /// Dropping the returned future removes the request from the queue.
    pub async fn acquire(&self, key: &str) -> Result<(), RateLimitError> {
        let started = Instant::now();
        let id = {
            let mut inner = self.lock();
            if inner.try_admit(key, &self.config, started) {
                return Ok(());
            }
            inner.enqueue(key, started)
        };

        tracing::debug!(key, waiter = id, "Bucket exhausted, queueing request");
        let mut queued = QueuedRequest {
            limiter: self,
            key,
            id,
            armed: true,
        };

        loop {
            let step = {
                let mut inner = self.lock();
                inner.step(key, queued.id, &self.config, Instant::now())
            };

            match step {
                Step::Admitted => {
                    queued.armed = false;
                    tracing::debug!(key, waiter = queued.id, "Queued request admitted");
                    return Ok(());
                }
                Step::TimedOut(waited) => {
                    queued.armed = false;
                    tracing::warn!(
                        key,
                        waited_ms = waited.as_millis() as u64,
                        "Rate-limited request timed out in queue"
                    );
                    return Err(RateLimitError::QueueTimeout {
                        key: key.to_string(),
                        waited_ms: waited.as_millis() as u64,
                    });
                }
                Step::Wait(delay) => futures_timer::Delay::new(delay).await,
                Step::Missing => {
                    // Rejoin at the tail. The timeout still counts from the first enqueue.
                    let id = self.lock().enqueue(key, started);
                    tracing::warn!(
                        key,
                        lost = queued.id,
                        waiter = id,
                        "Waiter missing from queue, requeued"
                    );
                    queued.id = id;
                }
            }
        }
    }

    /// Acquire a token on `key`, then run `f`.
    pub async fn execute<F, Fut, T>(&self, key: &str, f: F) -> Result<T, RateLimitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire(key).await?;
        Ok(f().await)
    }

    /// Current tokens (as of now) and queue depth for `key`.
    pub fn status(&self, key: &str) -> RateLimitStatus {
        let inner = self.lock();
        let tokens = match inner.buckets.get(key) {
            Some(bucket) => {
                let mut projected = bucket.clone();
                projected.refill(&self.config, Instant::now());
                projected.tokens()
            }
            None => self.config.max_tokens,
        };
        RateLimitStatus {
            key: key.to_string(),
            tokens,
            max_tokens: self.config.max_tokens,
            queued: inner.queue_len(key),
        }
    }

    /// Refill the bucket for `key` (or every bucket) to capacity.
    ///
    /// Queued requests stay queued and are admitted against the fresh bucket.
    pub fn reset(&self, key: Option<&str>) {
        let mut inner = self.lock();
        match key {
            Some(k) => {
                inner.buckets.remove(k);
            }
            None => inner.buckets.clear(),
        }
    }
}

/// Removes a waiter from its queue if the `acquire` future is dropped early.
struct QueuedRequest<'a> {
    limiter: &'a RateLimiter,
    key: &'a str,
    id: u64,
    armed: bool,
}

impl Drop for QueuedRequest<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.limiter.lock().remove(self.key, self.id);
        }
    }
}

/// The two limiter instances used by the dashboard, keyed by provider.
#[derive(Debug, Clone)]
pub struct ProviderLimiters {
    pub balances: RateLimiter,
    pub pricing: RateLimiter,
}

impl Default for ProviderLimiters {
    fn default() -> Self {
        Self::new(
            RateLimiterConfig::balances_provider(),
            RateLimiterConfig::pricing_provider(),
        )
    }
}

impl ProviderLimiters {
    pub fn new(balances: RateLimiterConfig, pricing: RateLimiterConfig) -> Self {
        Self {
            balances: RateLimiter::new(balances),
            pricing: RateLimiter::new(pricing),
        }
    }

    /// Limiter guarding the provider named by `key`.
    pub fn for_key(&self, key: &str) -> Option<&RateLimiter> {
        match key {
            BALANCES_PROVIDER_KEY => Some(&self.balances),
            PRICING_PROVIDER_KEY => Some(&self.pricing),
            _ => None,
        }
    }
}
