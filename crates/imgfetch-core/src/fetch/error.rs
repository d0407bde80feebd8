//! Terminal failure reasons for a fetch.

use crate::transport::TransportError;

/// Why no image was obtained.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("rate limit exceeded (HTTP 429) after {attempts} attempt(s)")]
    RateLimited { attempts: u32, body: String },

    #[error("HTTP error {status}: {snippet}")]
    Http { status: u32, snippet: String },

    #[error("response from {url} is not a decodable image: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    /// Loop finished without any attempt producing a terminal result.
    #[error("download failed: no attempts were made")]
    RetriesExhausted,
}

impl FetchError {
    pub fn status(&self) -> Option<u32> {
        match self {
            FetchError::RateLimited { .. } => Some(429),
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
