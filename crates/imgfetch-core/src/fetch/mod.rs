//! Retrying image fetch.
//!
//! One [`Fetcher::fetch`] call validates the URL, performs up to
//! `max_attempts` GETs (retrying only HTTP 429 and transport failures, with
//! exponentially growing sleeps in between), then decodes the body as an
//! image. Any other error status, and any decode failure, ends the fetch
//! immediately.

mod error;
mod outcome;

pub use error::FetchError;
pub use outcome::{body_snippet, AttemptOutcome, BODY_SNIPPET_CHARS};

use crate::headers::{HeaderProfile, HeaderSet};
use crate::raster::{self, ImageSummary};
use crate::retry::{run_with_retry, RetryEvent, RetryPolicy, Sleeper, ThreadSleeper};
use crate::transport::{CurlTransport, FetchRequest, Transport};
use image::{DynamicImage, ImageFormat};
use std::time::Duration;

/// Everything a fetch needs besides the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub headers: HeaderSet,
    pub timeout: Duration,
    pub policy: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        let profile = HeaderProfile::default();
        Self {
            headers: profile.headers(),
            timeout: profile.default_timeout(),
            policy: RetryPolicy::default(),
        }
    }
}

/// A successfully fetched and decoded image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub image: DynamicImage,
    /// Container format sniffed from the body, if recognised.
    pub format: Option<ImageFormat>,
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// URL after redirects.
    pub final_url: String,
    pub status: u32,
    /// Number of requests it took.
    pub attempts: u32,
}

impl FetchedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color_mode(&self) -> &'static str {
        raster::color_mode(self.image.color())
    }

    pub fn summary(&self) -> ImageSummary {
        raster::describe(&self.image)
    }
}

/// Progress notifications for the fetch observer.
#[derive(Debug)]
pub enum FetchEvent<'a> {
    Attempt {
        attempt: u32,
        max_attempts: u32,
    },
    Backoff {
        attempt: u32,
        delay: Duration,
        error: &'a FetchError,
    },
    Succeeded {
        image: &'a FetchedImage,
    },
    Failed {
        error: &'a FetchError,
    },
}

type Observer = Box<dyn FnMut(&FetchEvent<'_>)>;

pub struct Fetcher<T = CurlTransport, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    settings: FetchSettings,
    observer: Option<Observer>,
}

impl Fetcher {
    /// Fetcher backed by libcurl that blocks the thread between attempts.
    pub fn new(settings: FetchSettings) -> Self {
        Self::with_parts(CurlTransport::new(), ThreadSleeper, settings)
    }
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn with_parts(transport: T, sleeper: S, settings: FetchSettings) -> Self {
        Self {
            transport,
            sleeper,
            settings,
            observer: None,
        }
    }

    /// Registers a callback that sees every attempt, backoff and the final result.
    pub fn with_observer(mut self, observer: impl FnMut(&FetchEvent<'_>) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Fetches and decodes the image at `url`.
    pub fn fetch(&mut self, url: &str) -> Result<FetchedImage, FetchError> {
        let result = self.fetch_inner(url);
        match &result {
            Ok(image) => {
                let summary = image.summary();
                tracing::info!(
                    "fetched {} ({}x{} {}) in {} attempt(s)",
                    image.final_url,
                    summary.width,
                    summary.height,
                    summary.mode,
                    image.attempts
                );
                notify(&mut self.observer, &FetchEvent::Succeeded { image });
            }
            Err(error) => {
                tracing::warn!("fetch of {} failed: {}", url, error);
                notify(&mut self.observer, &FetchEvent::Failed { error });
            }
        }
        result
    }

    /// Like [`fetch`](Self::fetch) but reports failure as `None`.
    pub fn fetch_or_none(&mut self, url: &str) -> Option<FetchedImage> {
        self.fetch(url).ok()
    }

    fn fetch_inner(&mut self, url: &str) -> Result<FetchedImage, FetchError> {
        let url = validate_url(url)?;
        let request = FetchRequest {
            url,
            headers: self.settings.headers.clone(),
            timeout: self.settings.timeout,
        };

        let transport = &mut self.transport;
        let observer = &mut self.observer;
        let mut attempts = 0u32;
        let response = run_with_retry(
            &self.settings.policy,
            &mut self.sleeper,
            |event| match event {
                RetryEvent::Attempt {
                    attempt,
                    max_attempts,
                } => {
                    tracing::debug!("GET {} attempt {}/{}", request.url, attempt, max_attempts);
                    notify(
                        observer,
                        &FetchEvent::Attempt {
                            attempt,
                            max_attempts,
                        },
                    );
                }
                RetryEvent::Backoff {
                    attempt,
                    delay,
                    error,
                } => {
                    tracing::info!(
                        "attempt {} failed ({}); retrying in {:?}",
                        attempt,
                        error,
                        delay
                    );
                    notify(
                        observer,
                        &FetchEvent::Backoff {
                            attempt,
                            delay,
                            error,
                        },
                    );
                }
            },
            |attempt| {
                attempts = attempt;
                AttemptOutcome::from_transport(transport.get(&request)).into_result(attempt)
            },
        )?;

        tracing::debug!(
            "GET {} -> {} ({} bytes, content-type {:?})",
            response.final_url,
            response.status,
            response.body.len(),
            response.content_type
        );

        let decoded = raster::decode(&response.body).map_err(|source| FetchError::Decode {
            url: response.final_url.clone(),
            source,
        })?;

        Ok(FetchedImage {
            image: decoded.image,
            format: decoded.format,
            bytes: response.body,
            final_url: response.final_url,
            status: response.status,
            attempts,
        })
    }
}

fn notify(observer: &mut Option<Observer>, event: &FetchEvent<'_>) {
    if let Some(cb) = observer.as_mut() {
        cb(event);
    }
}

/// Accepts absolute `http`/`https` URLs only; returns the trimmed input.
pub fn validate_url(url: &str) -> Result<String, FetchError> {
    let trimmed = url.trim();
    let parsed = url::Url::parse(trimmed).map_err(|e| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(FetchError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests;
