//! Classify fetch failures into retry policy error kinds.

use crate::fetch::FetchError;
use crate::retry::policy::ErrorKind;

/// Only rate limiting and transport failures are worth another attempt.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::RateLimited { .. } => ErrorKind::Throttled,
        FetchError::Network { .. } => ErrorKind::Network,
        FetchError::InvalidUrl { .. }
        | FetchError::Http { .. }
        | FetchError::Decode { .. }
        | FetchError::RetriesExhausted => ErrorKind::Fatal,
    }
}

/// Classify a final HTTP status; `None` means the response is usable.
pub fn classify_http_status(status: u32) -> Option<ErrorKind> {
    match status {
        429 => Some(ErrorKind::Throttled),
        s if s >= 400 => Some(ErrorKind::Fatal),
        _ => None,
    }
}
