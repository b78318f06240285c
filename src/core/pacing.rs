use crate::utils::error::Result;
use crate::utils::validation::{
    validate_duration, validate_positive_number, validate_range, Validate,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};

pub const DEFAULT_BATCH_SIZE: usize = 15;
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(5);

/// Average time of one generateContent call, used only for the ETA.
const ESTIMATED_REQUEST_TIME: Duration = Duration::from_millis(1500);

/// Upper bound for every configurable wait.
pub const MAX_WAIT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Calls per quota window; a pause follows every full window.
    pub batch_size: usize,
    pub batch_pause: Duration,
    /// Minimum gap between the end of one call and the start of the next.
    pub request_delay: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per company, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Sleep taken after the failed `attempt` (1-based); saturates instead of
    /// overflowing.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            backoff_multiplier: 2,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: DEFAULT_BATCH_PAUSE,
            request_delay: DEFAULT_REQUEST_DELAY,
            retry: RetryPolicy::default(),
        }
    }
}

impl RateLimitConfig {
    /// No waiting at all. Handy for tests against a local mock server.
    pub fn immediate() -> Self {
        Self {
            batch_size: usize::MAX,
            batch_pause: Duration::ZERO,
            request_delay: Duration::ZERO,
            retry: RetryPolicy {
                initial_backoff: Duration::ZERO,
                ..RetryPolicy::default()
            },
        }
    }

    /// Rough wall-clock estimate for `count` companies when every call
    /// succeeds on the first attempt.
    pub fn estimate(&self, count: usize) -> Duration {
        if count == 0 {
            return Duration::ZERO;
        }
        let gaps = count - 1;
        let pauses = gaps / self.batch_size.max(1);
        let delays = gaps - pauses;
        let times = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);

        ESTIMATED_REQUEST_TIME
            .saturating_mul(times(count))
            .saturating_add(self.request_delay.saturating_mul(times(delays)))
            .saturating_add(
                self.batch_pause
                    .max(self.request_delay)
                    .saturating_mul(times(pauses)),
            )
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("rate_limit.batch_size", self.batch_size, 1)?;
        validate_range("rate_limit.max_attempts", self.retry.max_attempts, 1, 10)?;
        validate_range("rate_limit.backoff_multiplier", self.retry.backoff_multiplier, 1, 10)?;
        validate_duration("rate_limit.batch_pause", self.batch_pause, MAX_WAIT)?;
        validate_duration("rate_limit.request_delay", self.request_delay, MAX_WAIT)?;
        validate_duration("rate_limit.initial_backoff", self.retry.initial_backoff, MAX_WAIT)?;
        Ok(())
    }
}

/// Sequential pacing state for the request loop.
///
/// Call [`wait_turn`](Self::wait_turn) before a company's first attempt and
/// [`finish_call`](Self::finish_call) once the company is done, whatever the
/// outcome.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    last_finished: Option<Instant>,
    calls_in_window: usize,
    total_calls: usize,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_finished: None,
            calls_in_window: 0,
            total_calls: 0,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls
    }

    pub async fn wait_turn(&self) {
        if let Some(last) = self.last_finished {
            match last.checked_add(self.config.request_delay) {
                Some(deadline) => sleep_until(deadline).await,
                None => sleep(self.config.request_delay).await,
            }
        }
    }

    /// Records a finished company and takes the quota pause when a window is
    /// full or the provider is still rate limiting. No pause once nothing
    /// remains.
    pub async fn finish_call(&mut self, remaining: usize, rate_limited: bool) {
        self.total_calls += 1;
        self.calls_in_window += 1;
        self.last_finished = Some(Instant::now());

        if remaining == 0 {
            return;
        }

        let window_full = self.calls_in_window >= self.config.batch_size;
        if window_full || rate_limited {
            if rate_limited && !window_full {
                tracing::warn!(
                    "⏱ Still rate limited after {} requests. Pausing {:?} early",
                    self.total_calls,
                    self.config.batch_pause
                );
            } else {
                tracing::info!(
                    "⏱ {} requests completed. Waiting {:?} for rate limit...",
                    self.total_calls,
                    self.config.batch_pause
                );
            }
            sleep(self.config.batch_pause).await;
            self.calls_in_window = 0;
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. `op` receives the 1-based attempt number.
pub async fn call_with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let backoff = policy.backoff_for(attempt);
                tracing::warn!(
                    "⚠️ Attempt {}/{} for {} failed: {}. Retrying in {:?}...",
                    attempt,
                    max_attempts,
                    label,
                    e,
                    backoff
                );
                sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!("❌ Too many retries for {}: {}", label, e);
                } else {
                    tracing::error!("❌ Request for {} failed: {}", label, e);
                }
                return Err(e);
            }
        }
    }
}
