//! libcurl-backed transport (blocking easy handle).

use super::{FetchRequest, HttpResponse, Transport, TransportError, TransportErrorKind};
use std::time::Duration;

const MAX_REDIRECTIONS: u32 = 10;
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Performs each GET on a fresh easy handle; follows redirects.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        CurlTransport
    }
}

impl Transport for CurlTransport {
    fn get(&mut self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.connect_timeout(request.timeout.min(MAX_CONNECT_TIMEOUT))?;
        easy.timeout(request.timeout)?;

        // curl only decompresses bodies when it negotiated the encoding itself.
        let mut list = curl::easy::List::new();
        for (name, value) in request.headers.iter() {
            if name.eq_ignore_ascii_case("accept-encoding") {
                easy.accept_encoding(value)?;
            } else {
                list.append(&format!("{}: {}", name, value))?;
            }
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let final_url = easy
            .effective_url()?
            .map(str::to_owned)
            .unwrap_or_else(|| request.url.clone());
        let content_type = easy.content_type()?.map(str::to_owned);

        Ok(HttpResponse {
            status,
            final_url,
            body,
            content_type,
        })
    }
}

/// Classify a curl error for log messages. Every kind is retried.
pub fn classify_curl_error(e: &curl::Error) -> TransportErrorKind {
    if e.is_operation_timedout() {
        return TransportErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_ssl_connect_error()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportErrorKind::Connection;
    }
    TransportErrorKind::Other
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        TransportError::new(classify_curl_error(&e), e.to_string())
    }
}
