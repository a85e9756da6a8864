//! Retry and pacing wrapper around the portal client.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use iscslayer_api::{AdvancedSearchQuery, Client};
use rand::Rng;

use crate::error::SlayerError;

/// Portal client wrapper that adds bounded retries and optional request
/// pacing.
///
/// Retries cover transport errors and 429/5xx responses, with exponentially
/// backed-off, jittered delays. When a request gap is configured, consecutive
/// requests through this session are spaced at least that far apart to stay
/// under the portal's rate limits; the first request is never delayed.
pub struct PortalSession {
    inner: Client,
    retry: RetryConfig,
    request_gap: Option<Duration>,
    /// Tracks when the last request was sent, for pacing.
    last_request: Mutex<Option<Instant>>,
}

/// Retry knobs, env-overridable like the rest of the tunables.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// Reads `ISCSLAYER_RETRY_MAX` / `ISCSLAYER_RETRY_BASE_MS` /
    /// `ISCSLAYER_RETRY_MAX_MS`. The portal tolerates a single quick retry
    /// well, so that is the default.
    pub fn from_env() -> Self {
        Self {
            max_retries: env_usize("ISCSLAYER_RETRY_MAX", 1),
            base_delay_ms: env_u64("ISCSLAYER_RETRY_BASE_MS", 1000),
            max_delay_ms: env_u64("ISCSLAYER_RETRY_MAX_MS", 15000),
        }
    }

    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

impl PortalSession {
    /// Wraps a portal client with the retry knobs from the environment and
    /// no request pacing.
    pub fn new(client: Client) -> Self {
        Self {
            inner: client,
            retry: RetryConfig::from_env(),
            request_gap: None,
            last_request: Mutex::new(None),
        }
    }

    /// Overrides the retry knobs. Mostly used by tests.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Spaces consecutive requests at least `gap` apart.
    pub fn with_request_gap(mut self, gap: Duration) -> Self {
        self.request_gap = Some(gap);
        self
    }

    /// Logs in to the portal. Not retried: a rejected credential will not
    /// get better on the second try.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), SlayerError> {
        Ok(self.inner.authenticate(username, password).await?)
    }

    /// Fetches the advanced-search results page for one policy number.
    pub async fn fetch_summary(&self, policy_number: &str) -> Result<String, SlayerError> {
        let query = AdvancedSearchQuery::for_policy(policy_number);
        self.with_retry("search", || async {
            self.pace().await;
            Ok(self.inner.search_results(&query).await?)
        })
        .await
    }

    /// Fetches the detail page for an application id.
    pub async fn fetch_detail(&self, app_id: &str) -> Result<String, SlayerError> {
        self.with_retry("detail", || async {
            self.pace().await;
            Ok(self.inner.detail_page(app_id).await?)
        })
        .await
    }

    async fn pace(&self) {
        let Some(gap) = self.request_gap else { return };
        let sleep_dur = {
            let last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            match *last {
                Some(last_time) => {
                    let elapsed = last_time.elapsed();
                    if elapsed < gap {
                        Some(gap - elapsed)
                    } else {
                        None
                    }
                }
                None => None,
            }
        };
        if let Some(dur) = sleep_dur {
            tokio::time::sleep(dur).await;
        }
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    async fn with_retry<T, F, Fut>(&self, label: &str, mut f: F) -> Result<T, SlayerError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, SlayerError>>,
    {
        let mut attempt = 0usize;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} request failed (attempt {}/{}), retrying in {:.1}s",
                        label,
                        attempt,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn is_retryable(err: &SlayerError) -> bool {
    match err {
        SlayerError::Api(api_err) => match api_err {
            iscslayer_api::Error::RequestFailed => true,
            iscslayer_api::Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            iscslayer_api::Error::AuthFailed => false,
        },
        _ => false,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_is_capped() {
        let cfg = RetryConfig {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 250,
        };
        let first = cfg.delay_for_attempt(1);
        let third = cfg.delay_for_attempt(3);
        assert!(first >= Duration::from_millis(80) && first <= Duration::from_millis(120));
        // 100 * 2^2 = 400 is clamped to 250 before jitter.
        assert!(third <= Duration::from_millis(300));
    }

    #[test]
    fn not_found_is_never_retried() {
        assert!(!is_retryable(&SlayerError::PolicyNotFound(
            "SCB-GL-000077835".to_string()
        )));
    }

    #[test]
    fn transport_and_server_errors_are_retryable() {
        assert!(is_retryable(&SlayerError::Api(
            iscslayer_api::Error::RequestFailed
        )));
        assert!(is_retryable(&SlayerError::Api(
            iscslayer_api::Error::HttpStatus {
                status: 503,
                body: String::new(),
            }
        )));
        assert!(!is_retryable(&SlayerError::Api(
            iscslayer_api::Error::HttpStatus {
                status: 404,
                body: String::new(),
            }
        )));
        assert!(!is_retryable(&SlayerError::Api(
            iscslayer_api::Error::AuthFailed
        )));
    }
}
