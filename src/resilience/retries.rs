//! Retry logic.
//!
//! # Responsibilities
//! - Execute an async operation up to `max_attempts` times
//! - Sleep with exponential backoff + jitter between attempts
//!
//! # Design Decisions
//! - Only used for calls that are safe to repeat (per-network notify is
//!   keyed by flow id and network on the backend side)
//! - `max_attempts = 1` disables retry entirely

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::schema::ConfirmationConfig;

/// Retry policy for a repeatable async call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn from_config(config: &ConfirmationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    /// Delay before retry number `retry` (1-based): doubles from `base_delay_ms`,
    /// capped at `max_delay_ms`, plus up to 10% jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 || self.base_delay_ms == 0 {
            return Duration::ZERO;
        }
        let factor = 1u64.checked_shl(retry - 1).unwrap_or(u64::MAX);
        let capped = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        let spread = capped / 10;
        let jitter = if spread == 0 { 0 } else { rand::thread_rng().gen_range(0..spread) };
        Duration::from_millis(capped + jitter)
    }

    /// Run `op` until it succeeds or attempts are exhausted, returning the last error.
    pub async fn run<F, Fut, T, E>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation = label,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = RetryPolicy::none()
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
        };
        let result: Result<u32, String> = policy
            .run("test", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(format!("fail {}", n))
                } else {
                    Ok(n)
                }
            })
            .await;
        assert_eq!(result, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 1,
        };
        let result: Result<(), String> = policy
            .run("test", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(format!("fail {}", n))
            })
            .await;
        assert_eq!(result.unwrap_err(), "fail 1");
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        };
        assert_eq!(policy.delay_for(0), Duration::ZERO);

        let first = policy.delay_for(1).as_millis();
        assert!((100..110).contains(&first));

        let second = policy.delay_for(2).as_millis();
        assert!((200..220).contains(&second));

        let capped = policy.delay_for(40).as_millis();
        assert!((1000..1100).contains(&capped));

        assert_eq!(RetryPolicy::none().delay_for(3), Duration::ZERO);
    }

    #[test]
    fn test_from_config_clamps_zero() {
        let mut config = ConfirmationConfig::default();
        config.max_attempts = 0;
        assert_eq!(RetryPolicy::from_config(&config).max_attempts, 1);
    }
}
