use std::time::Duration;

/// High-level classification of a failed attempt for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server asked us to slow down (HTTP 429).
    Throttled,
    /// Transport-level failure (connect, DNS, timeout, reset).
    Network,
    /// Anything else; never retried.
    Fatal,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Throttled | ErrorKind::Network)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: the delay starts at `initial_delay` and doubles
/// after every retry. No jitter and no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
}

/// Backoff multiplier applied after each retry.
pub const BACKOFF_MULTIPLIER: u32 = 2;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Delay to wait after the given failed attempt (1-based), ignoring limits.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = BACKOFF_MULTIPLIER
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(exp)
    }

    /// Decide whether a failure on `attempt` (1-based) should be retried.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt))
    }
}
