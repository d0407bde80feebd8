//! HTTP transport: one blocking GET per call.
//!
//! The fetcher only depends on the [`Transport`] trait so retry behaviour can
//! be exercised against scripted responses; [`CurlTransport`] is the libcurl
//! implementation used in production.

mod curl_easy;

pub use curl_easy::{classify_curl_error, CurlTransport};

use crate::headers::HeaderSet;
use std::fmt;
use std::time::Duration;

/// A single GET request as handed to the transport.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: HeaderSet,
    /// Total time allowed for one attempt, including redirects.
    pub timeout: Duration,
}

/// What came back from one request, after redirects were followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    /// URL of the last hop in the redirect chain.
    pub final_url: String,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connection,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connection => "connection",
            TransportErrorKind::Other => "transport",
        };
        f.write_str(s)
    }
}

/// The request never produced an HTTP status (DNS, connect, TLS, timeout...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub trait Transport {
    fn get(&mut self, request: &FetchRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn get(&mut self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
        (**self).get(request)
    }
}
