//! Retry and backoff policy.
//!
//! Classifies fetch failures (rate limiting, transport errors) and drives
//! the exponential backoff loop. Waiting goes through [`Sleeper`] so tests
//! can record delays instead of blocking.

mod classify;
mod policy;
mod run;
mod sleep;

pub use classify::{classify, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy, BACKOFF_MULTIPLIER};
pub use run::{run_with_retry, RetryEvent};
pub use sleep::{RecordingSleeper, Sleeper, ThreadSleeper};
