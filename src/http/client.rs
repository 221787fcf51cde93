//! Low-level HTTP client — `ProviderHttp`.
//!
//! One method per provider endpoint. Returns wire types (conversion to domain
//! types happens in the sub-clients). Admission control is not applied here;
//! `WalletClient` wraps every call in the matching rate limiter.

use crate::domain::activity::wire::ActivityResponse;
use crate::domain::balance::wire::BalancesResponse;
use crate::domain::price::wire::PricesResponse;
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::shared::{Address, Symbol};

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Low-level HTTP client for the balance, pricing and activity providers.
pub struct ProviderHttp {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
    /// Provider API key. NEVER exposed publicly.
    api_key: Arc<RwLock<Option<String>>>,
}

impl ProviderHttp {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Self::with_retry(base_url, RetryPolicy::Idempotent)
    }

    /// Client whose GET requests all use `retry`.
    pub fn with_retry(base_url: &str, retry: RetryPolicy) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(std::time::Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            retry,
            api_key: Arc::new(RwLock::new(None)),
        })
    }

    /// Pre-set the API key on construction.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = Arc::new(RwLock::new(key));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the API key sent as a bearer token.
    pub(crate) async fn set_api_key(&self, key: Option<String>) {
        *self.api_key.write().await = key;
    }

    pub async fn has_api_key(&self) -> bool {
        self.api_key.read().await.is_some()
    }

    // ── Balances ─────────────────────────────────────────────────────────

    pub async fn get_balances(&self, wallet: &Address) -> Result<BalancesResponse, HttpError> {
        let url = format!("{}/api/balances/{}", self.base_url, wallet);
        self.get(&url).await
    }

    // ── Prices ───────────────────────────────────────────────────────────

    pub async fn get_prices(&self, symbols: &[Symbol]) -> Result<PricesResponse, HttpError> {
        let joined = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/api/prices?symbols={}",
            self.base_url,
            urlencoding::encode(&joined)
        );
        self.get(&url).await
    }

    // ── Activity ─────────────────────────────────────────────────────────

    pub async fn get_activity(&self, wallet: &Address) -> Result<ActivityResponse, HttpError> {
        let url = format!("{}/api/activity/{}", self.base_url, wallet);
        self.get(&url).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.request_with_retry(url, &self.retry).await
    }

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: &RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match retry {
            RetryPolicy::None => {
                return self.do_request(url).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            let err = match self.do_request::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            if !config.is_retryable(&err) {
                return Err(err);
            }

            if attempt < config.max_retries {
                let delay = config.delay_after(&err, attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    max = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying request to {}",
                    url
                );
                futures_timer::Delay::new(delay).await;
            }
            last_error = Some(err);
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let mut req = self.client.get(url);

        if let Some(key) = self.api_key.read().await.as_ref() {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await?;
            return Ok(parsed);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();

        Err(status_to_error(status.as_u16(), body_text, retry_after_ms))
    }
}

/// Map a non-success status to the matching [`HttpError`].
fn status_to_error(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        401 => HttpError::Unauthorized,
        404 => HttpError::NotFound(body),
        408 => HttpError::Timeout,
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}

impl Clone for ProviderHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            retry: self.retry.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn response(status: &str, headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\n{headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    struct CannedProvider {
        url: String,
        hits: Arc<AtomicUsize>,
        requests: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl CannedProvider {
        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    /// Local provider that answers the n-th connection with `responses[n]`,
    /// repeating the last one.
    async fn canned_provider(responses: Vec<String>) -> CannedProvider {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (counter, log) = (hits.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let reply = responses[n.min(responses.len() - 1)].clone();
                let mut buf = [0u8; 4096];
                let read = socket.read(&mut buf).await.unwrap_or(0);
                log.lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&buf[..read]).into_owned());
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        CannedProvider {
            url: format!("http://{addr}"),
            hits,
            requests,
        }
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy::Custom(RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(1),
            jitter: false,
            ..RetryConfig::idempotent()
        })
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_to_error(401, String::new(), None), HttpError::Unauthorized));
        assert!(matches!(status_to_error(404, "gone".into(), None), HttpError::NotFound(b) if b == "gone"));
        assert!(matches!(status_to_error(408, String::new(), None), HttpError::Timeout));
        assert!(matches!(
            status_to_error(429, String::new(), Some(2000)),
            HttpError::RateLimited { retry_after_ms: Some(2000) }
        ));
        assert!(matches!(status_to_error(422, String::new(), None), HttpError::BadRequest(_)));
        assert!(matches!(
            status_to_error(503, "busy".into(), None),
            HttpError::ServerError { status: 503, .. }
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let http = ProviderHttp::new("http://localhost:3000/").unwrap();
        assert_eq!(http.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_api_key_shared_between_clones() {
        let http = ProviderHttp::new("http://localhost:3000").unwrap();
        let clone = http.clone();
        assert!(!clone.has_api_key().await);
        http.set_api_key(Some("secret".to_string())).await;
        assert!(clone.has_api_key().await);
        http.set_api_key(None).await;
        assert!(!clone.has_api_key().await);
    }

    #[tokio::test]
    async fn test_unreachable_provider_fails_without_retry_policy() {
        let http = ProviderHttp::with_retry("http://127.0.0.1:9", RetryPolicy::None).unwrap();
        let err = http.get_balances(&Address::zero()).await.unwrap_err();
        assert!(matches!(err, HttpError::Reqwest(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_retried_until_exhausted() {
        let provider =
            canned_provider(vec![response("503 Service Unavailable", "", "busy")]).await;
        let http = ProviderHttp::with_retry(&provider.url, fast_retry(2)).unwrap();

        let err = http.get_balances(&Address::zero()).await.unwrap_err();
        match err {
            HttpError::MaxRetriesExceeded { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("503"), "{last_error}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.hits(), 3);
    }

    #[tokio::test]
    async fn test_rate_limited_is_retried_until_exhausted() {
        let provider = canned_provider(vec![response(
            "429 Too Many Requests",
            "Retry-After: 0\r\n",
            "",
        )])
        .await;
        let http = ProviderHttp::with_retry(&provider.url, fast_retry(2)).unwrap();

        let err = http.get_balances(&Address::zero()).await.unwrap_err();
        assert!(matches!(err, HttpError::MaxRetriesExceeded { attempts: 3, .. }));
        assert_eq!(provider.hits(), 3);
    }

    #[tokio::test]
    async fn test_bad_request_is_not_retried() {
        let provider = canned_provider(vec![response("400 Bad Request", "", "bad wallet")]).await;
        let http = ProviderHttp::with_retry(&provider.url, fast_retry(2)).unwrap();

        let err = http.get_balances(&Address::zero()).await.unwrap_err();
        assert!(matches!(err, HttpError::BadRequest(body) if body == "bad wallet"));
        assert_eq!(provider.hits(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let provider = canned_provider(vec![
            response("502 Bad Gateway", "", ""),
            response(
                "200 OK",
                "Content-Type: application/json\r\n",
                r#"{"balances": []}"#,
            ),
        ])
        .await;
        let http = ProviderHttp::with_retry(&provider.url, fast_retry(2)).unwrap();

        let resp = http.get_balances(&Address::zero()).await.unwrap();
        assert!(resp.balances.is_empty());
        assert_eq!(provider.hits(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_is_not_slept_when_no_retry_follows() {
        let limited = response("429 Too Many Requests", "Retry-After: 30\r\n", "");

        // 429 not in the retryable list: fail at once.
        let provider = canned_provider(vec![limited.clone()]).await;
        let strict = RetryPolicy::Custom(RetryConfig {
            retryable_statuses: vec![503],
            ..RetryConfig::idempotent()
        });
        let http = ProviderHttp::with_retry(&provider.url, strict).unwrap();
        let started = std::time::Instant::now();
        let err = http.get_balances(&Address::zero()).await.unwrap_err();
        assert!(matches!(err, HttpError::RateLimited { retry_after_ms: Some(30_000) }));
        assert_eq!(provider.hits(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));

        // Retryable, but the only attempt is also the last.
        let provider = canned_provider(vec![limited]).await;
        let http = ProviderHttp::with_retry(&provider.url, fast_retry(0)).unwrap();
        let started = std::time::Instant::now();
        let err = http.get_balances(&Address::zero()).await.unwrap_err();
        assert!(matches!(err, HttpError::MaxRetriesExceeded { attempts: 1, .. }));
        assert_eq!(provider.hits(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_api_key_sent_as_bearer() {
        let ok = response(
            "200 OK",
            "Content-Type: application/json\r\n",
            r#"{"activity": []}"#,
        );
        let provider = canned_provider(vec![ok]).await;
        let http = ProviderHttp::with_retry(&provider.url, RetryPolicy::None)
            .unwrap()
            .with_api_key(Some("dash-key".to_string()));

        http.get_activity(&Address::zero()).await.unwrap();
        http.set_api_key(None).await;
        http.get_activity(&Address::zero()).await.unwrap();

        let requests = provider.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer dash-key"));
        assert!(!requests[1].to_ascii_lowercase().contains("authorization"));
    }
}
