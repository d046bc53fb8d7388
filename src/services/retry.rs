// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exponential backoff for rate-limited backend calls.
//!
//! Only `AppError::RateLimited` is retried. Every other error is returned
//! to the caller on the first occurrence.

use crate::config::Config;
use crate::error::AppError;
use std::future::Future;
use std::time::Duration;

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry; doubles for each further retry.
    pub base_delay: Duration,
    /// Retries after the initial attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_delay: config.retry_base_delay,
            max_retries: config.max_retries,
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Sum of all delays when every attempt is rate limited.
    pub fn total_delay(&self) -> Duration {
        (0..self.max_retries)
            .map(|retry| self.delay_for(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Run `op`, retrying on rate limiting according to `policy`.
///
/// Once retries are exhausted the last `RateLimited` error is returned.
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut retry = 0;

    loop {
        match op().await {
            Err(e) if e.is_rate_limited() && retry < policy.max_retries => {
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    operation = what,
                    retry = retry + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(operation = what, retries = retry, "Rate limit retries exhausted");
                return Err(e);
            }
            other => return other,
        }
    }
}
