//! Interpretation of a single attempt.

use super::error::FetchError;
use crate::retry::{classify_http_status, ErrorKind};
use crate::transport::{HttpResponse, TransportError};

/// Maximum number of characters of an error body kept for reporting.
pub const BODY_SNIPPET_CHARS: usize = 200;

/// Result of one GET, before any retry decision.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(HttpResponse),
    RateLimited { body: Vec<u8> },
    HttpError { status: u32, snippet: String },
    NetworkError(TransportError),
}

impl AttemptOutcome {
    pub fn from_transport(result: Result<HttpResponse, TransportError>) -> Self {
        let resp = match result {
            Ok(resp) => resp,
            Err(e) => return AttemptOutcome::NetworkError(e),
        };
        match classify_http_status(resp.status) {
            None => AttemptOutcome::Success(resp),
            Some(ErrorKind::Throttled) => AttemptOutcome::RateLimited { body: resp.body },
            Some(_) => AttemptOutcome::HttpError {
                status: resp.status,
                snippet: body_snippet(&resp.body),
            },
        }
    }

    /// `attempt` is the 1-based attempt that produced this outcome.
    pub fn into_result(self, attempt: u32) -> Result<HttpResponse, FetchError> {
        match self {
            AttemptOutcome::Success(resp) => Ok(resp),
            AttemptOutcome::RateLimited { body } => Err(FetchError::RateLimited {
                attempts: attempt,
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            AttemptOutcome::HttpError { status, snippet } => {
                Err(FetchError::Http { status, snippet })
            }
            AttemptOutcome::NetworkError(source) => Err(FetchError::Network {
                attempts: attempt,
                source,
            }),
        }
    }
}

/// First [`BODY_SNIPPET_CHARS`] characters of `body`, lossily decoded.
pub fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}
