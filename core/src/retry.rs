//! Bounded retry with linear backoff.
//!
//! # Design
//! Attempt `n` that fails is followed by a wait of `n * base_delay` before
//! attempt `n + 1`, up to `max_attempts` tries in total. The error from the
//! final attempt is returned unchanged. By default every `ApiError` is
//! retried, 4xx included; `retry_client_errors(false)` stops at the first
//! 4xx instead.

use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::ApiError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            retry_client_errors: true,
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one try.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    pub fn retry_client_errors(mut self, retry: bool) -> Self {
        self.retry_client_errors = retry;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait between attempt `attempt` and the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    fn should_retry(&self, err: &ApiError) -> bool {
        self.retry_client_errors || !err.is_client_error()
    }

    /// Run `op` until it succeeds or the policy gives up.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, C, F>(&self, clock: &C, mut op: F) -> Result<T, ApiError>
    where
        C: Clock + ?Sized,
        F: FnMut(u32) -> Result<T, ApiError>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => {
                    debug!(attempt, error = %err, "retries exhausted");
                    return Err(err);
                }
                Err(err) if !self.should_retry(&err) => {
                    debug!(attempt, error = %err, "not retrying client error");
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "request failed, retrying"
                    );
                    clock.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
