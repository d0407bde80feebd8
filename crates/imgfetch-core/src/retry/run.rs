//! Retry loop: run a closure until success or policy says stop.

use super::classify::classify;
use super::policy::{RetryDecision, RetryPolicy};
use super::sleep::Sleeper;
use crate::fetch::FetchError;
use std::time::Duration;

/// Progress notifications emitted by [`run_with_retry`].
#[derive(Debug)]
pub enum RetryEvent<'a> {
    /// About to perform `attempt` (1-based) of `max_attempts`.
    Attempt { attempt: u32, max_attempts: u32 },
    /// `attempt` failed with a retryable error; sleeping `delay` before the next one.
    Backoff {
        attempt: u32,
        delay: Duration,
        error: &'a FetchError,
    },
}

/// Runs `f(attempt)` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
///
/// With `max_attempts == 0` nothing is attempted and
/// [`FetchError::RetriesExhausted`] is returned.
pub fn run_with_retry<T, F, S, O>(
    policy: &RetryPolicy,
    sleeper: &mut S,
    mut observer: O,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
    S: Sleeper + ?Sized,
    O: FnMut(RetryEvent<'_>),
{
    let mut attempt = 1u32;
    while attempt <= policy.max_attempts {
        observer(RetryEvent::Attempt {
            attempt,
            max_attempts: policy.max_attempts,
        });
        let err = match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        match policy.decide(attempt, classify(&err)) {
            RetryDecision::NoRetry => return Err(err),
            RetryDecision::RetryAfter(delay) => {
                observer(RetryEvent::Backoff {
                    attempt,
                    delay,
                    error: &err,
                });
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
    Err(FetchError::RetriesExhausted)
}
