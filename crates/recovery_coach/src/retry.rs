//! Retry with exponential backoff for the text-generation HTTP calls.
//!
//! Only the request send is retried: 429, 408 and the 5xx gateway family,
//! plus transport errors. Once a stream has started it is never replayed,
//! since fragments may already have reached the transcript.

use anyhow::Result;
use rand::Rng;
use reqwest::{header::RETRY_AFTER, Response, StatusCode};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(20),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Backoff before attempt `attempt + 1`, without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs.max(0.0))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::REQUEST_TIMEOUT
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Seconds from a `Retry-After` header, when the server sent one.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Run `operation` until it yields a 2xx response, a non-retryable status,
/// or `max_attempts` runs out.
pub async fn with_retry<F, Fut>(config: &RetryConfig, provider: &str, operation: F) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=config.max_attempts {
        let mut wait = config.backoff(attempt);

        match operation().await {
            Ok(response) if response.status().is_success() => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", provider, attempt);
                }
                return Ok(response);
            }
            Ok(response) => {
                let status = response.status();
                if let Some(hint) = retry_after(&response) {
                    wait = hint.min(config.max_delay);
                }
                let body = response.text().await.unwrap_or_default();
                if !is_retryable_status(status) {
                    anyhow::bail!("{} API error ({}): {}", provider, status, body);
                }
                tracing::warn!(
                    "{} returned {} on attempt {}/{}: {}",
                    provider,
                    status,
                    attempt,
                    config.max_attempts,
                    body.chars().take(200).collect::<String>()
                );
                last_error = format!("{} ({}): {}", provider, status, body);
            }
            Err(e) => {
                tracing::warn!(
                    "{} network error on attempt {}/{}: {}",
                    provider,
                    attempt,
                    config.max_attempts,
                    e
                );
                last_error = format!("{}: {}", provider, e);
            }
        }

        if attempt < config.max_attempts {
            let sleep_for = wait + Duration::from_millis(rand_jitter());
            tracing::info!("{} retrying in {:.1}s", provider, sleep_for.as_secs_f64());
            tokio::time::sleep(sleep_for).await;
        }
    }

    anyhow::bail!(
        "All {} attempts exhausted. Last error: {}",
        config.max_attempts,
        last_error
    )
}

/// 0-499 ms added on top of each backoff.
fn rand_jitter() -> u64 {
    rand::thread_rng().gen_range(0..500)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.backoff(1), Duration::from_secs(1));
        assert_eq!(cfg.backoff(2), Duration::from_secs(2));
        assert_eq!(cfg.backoff(3), Duration::from_secs(4));
        assert_eq!(cfg.backoff(10), Duration::from_secs(20));
    }

    #[test]
    fn test_jitter_bounded() {
        for _ in 0..200 {
            assert!(rand_jitter() < 500);
        }
    }

    #[tokio::test]
    async fn test_transport_errors_exhaust_attempts() {
        let cfg = RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_factor: 1.0,
        };
        let calls = std::sync::atomic::AtomicU32::new(0);
        let result = with_retry(&cfg, "Test", || async {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(anyhow::anyhow!("connection refused"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert!(result.unwrap_err().to_string().contains("connection refused"));
    }
}
