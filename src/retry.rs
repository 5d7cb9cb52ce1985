//! Bounded retry for the live candidate sampler
//!
//! The random-title endpoint of a small edition is flaky: timeouts, 5xx
//! pages and truncated JSON all show up in practice. [`with_retry`] re-runs a
//! sampling request with exponential backoff until it succeeds, hits an error
//! that will not go away by itself, or spends its budget, at which point
//! [`FallbackCandidates`](crate::topics::FallbackCandidates) switches to the
//! curated list for good.
//!
//! Article fetches and existence probes do not go through here. A failed
//! fetch is recorded as a miss and picked up again by the next run.
//!
//! ```no_run
//! use parallel_corpus::config::RetryConfig;
//! use parallel_corpus::retry::with_retry;
//! use parallel_corpus::Error;
//!
//! # async fn sample() -> Result<Vec<String>, Error> { Ok(Vec::new()) }
//! # async fn example() -> Result<(), Error> {
//! let titles = with_retry(&RetryConfig::default(), sample).await?;
//! println!("{} candidate titles", titles.len());
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Whether an error is worth another attempt
pub trait IsRetryable {
    /// `true` for failures that may clear up on their own
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            // Unexpected API responses are usually a flaky upstream
            Error::CandidateSource(_) => true,
            Error::Config { .. }
            | Error::Persistence(_)
            | Error::Serialization(_)
            | Error::InvalidLanguage(_) => false,
        }
    }
}

/// Run `operation`, retrying retryable failures with exponential backoff
///
/// `config.max_attempts` counts retries, so the operation runs at most
/// `max_attempts + 1` times. The first non-retryable error is returned as is.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut retries = 0;

    let error = loop {
        let e = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(retries, "Succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => e,
        };
        if !e.is_retryable() || retries >= config.max_attempts {
            break e;
        }

        retries += 1;
        let wait = if config.jitter { add_jitter(delay) } else { delay };
        tracing::warn!(
            error = %e,
            retry = retries,
            of = config.max_attempts,
            wait_ms = wait.as_millis(),
            "Transient failure, backing off"
        );
        tokio::time::sleep(wait).await;
        delay = delay.mul_f64(config.backoff_multiplier).min(config.max_delay);
    };

    if error.is_retryable() {
        tracing::error!(error = %error, retries, "Giving up, retry budget spent");
    } else {
        tracing::error!(error = %error, "Not retrying a permanent failure");
    }
    Err(error)
}

/// Stretch `delay` by a uniform random factor in `[1, 2]`
fn add_jitter(delay: Duration) -> Duration {
    let factor: f64 = rand::thread_rng().gen_range(1.0..=2.0);
    delay.mul_f64(factor)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn test_retry_transient_then_succeed() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(2), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(counter.load(Ordering::SeqCst), 3, "initial call plus two retries");
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Permanent)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jitter_stays_within_double_delay() {
        let base = Duration::from_millis(100);
        for _ in 0..50 {
            let jittered = add_jitter(base);
            assert!(jittered >= base);
            assert!(jittered <= base * 2);
        }
    }

    #[test]
    fn test_error_is_retryable_classification() {
        assert!(Error::CandidateSource("unexpected payload".into()).is_retryable());

        assert!(!Error::config("languages", "empty").is_retryable());
        assert!(!Error::InvalidLanguage("xx".into()).is_retryable());
        let disk = Error::from(crate::error::PersistenceError::WriteFailed {
            path: "raw/Sun.json".into(),
            reason: "disk full".into(),
        });
        assert!(!disk.is_retryable());
    }
}
