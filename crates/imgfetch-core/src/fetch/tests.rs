//! Fetcher tests against a scripted transport; no network, no real sleeps.

use super::*;
use crate::retry::RecordingSleeper;
use crate::transport::{HttpResponse, TransportError, TransportErrorKind};
use image::{Rgb, RgbImage};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::rc::Rc;

const URL: &str = "http://images.example.test/cat.png";

/// Replays a fixed sequence of results; repeats the last one when exhausted.
struct ScriptedTransport {
    script: VecDeque<Result<HttpResponse, TransportError>>,
    last: Option<Result<HttpResponse, TransportError>>,
    requests: Vec<FetchRequest>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: script.into(),
            last: None,
            requests: Vec::new(),
        }
    }

    fn calls(&self) -> usize {
        self.requests.len()
    }
}

impl Transport for ScriptedTransport {
    fn get(&mut self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
        self.requests.push(request.clone());
        if let Some(next) = self.script.pop_front() {
            self.last = Some(next.clone());
            return next;
        }
        self.last.clone().expect("empty script")
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn ok_png() -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        final_url: "https://cdn.example.test/cat.png".into(),
        body: png_bytes(5, 4),
        content_type: Some("image/png".into()),
    })
}

fn status(code: u32, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: code,
        final_url: URL.into(),
        body: body.as_bytes().to_vec(),
        content_type: Some("text/html".into()),
    })
}

fn net_err() -> Result<HttpResponse, TransportError> {
    Err(TransportError::new(TransportErrorKind::Connection, "connection refused"))
}

fn settings(max_attempts: u32, initial_secs: u64) -> FetchSettings {
    FetchSettings {
        policy: RetryPolicy::new(max_attempts, Duration::from_secs(initial_secs)),
        ..FetchSettings::default()
    }
}

fn fetcher(
    script: Vec<Result<HttpResponse, TransportError>>,
    s: FetchSettings,
) -> Fetcher<ScriptedTransport, RecordingSleeper> {
    Fetcher::with_parts(ScriptedTransport::new(script), RecordingSleeper::new(), s)
}

#[test]
fn first_attempt_success_makes_one_call_and_never_sleeps() {
    let mut f = fetcher(vec![ok_png()], settings(5, 2));
    let img = f.fetch(URL).unwrap();
    assert_eq!(f.transport().calls(), 1);
    assert!(f.sleeper().delays.is_empty());
    assert_eq!(img.attempts, 1);
    assert_eq!(img.status, 200);
    assert_eq!(img.final_url, "https://cdn.example.test/cat.png");
}

#[test]
fn rate_limited_then_success_sleeps_doubling_delays() {
    let k = 3;
    let mut script: Vec<_> = (0..k).map(|_| status(429, "slow down")).collect();
    script.push(ok_png());
    let mut f = fetcher(script, settings(5, 2));
    let img = f.fetch(URL).unwrap();
    assert_eq!(f.transport().calls(), k + 1);
    assert_eq!(
        f.sleeper().delays,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8)
        ]
    );
    assert_eq!(img.attempts, 4);
}

#[test]
fn rate_limited_every_time_is_terminal_after_max_attempts() {
    let mut f = fetcher(vec![status(429, "too many requests")], settings(4, 1));
    let err = f.fetch(URL).unwrap_err();
    match err {
        FetchError::RateLimited { attempts, body } => {
            assert_eq!(attempts, 4);
            assert_eq!(body, "too many requests");
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
    assert_eq!(f.transport().calls(), 4);
    assert_eq!(f.sleeper().delays.len(), 3);
}

#[test]
fn not_found_fails_fast_without_sleeping() {
    let mut f = fetcher(vec![status(404, "<h1>Not Found</h1>"), ok_png()], settings(5, 2));
    let err = f.fetch(URL).unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 404, ref snippet } if snippet == "<h1>Not Found</h1>"));
    assert_eq!(err.status(), Some(404));
    assert_eq!(f.transport().calls(), 1);
    assert!(f.sleeper().delays.is_empty());
}

#[test]
fn server_error_is_not_retried() {
    let mut f = fetcher(vec![status(503, "maintenance"), ok_png()], settings(5, 2));
    assert!(matches!(f.fetch(URL), Err(FetchError::Http { status: 503, .. })));
    assert_eq!(f.transport().calls(), 1);
}

#[test]
fn network_errors_retry_with_doubling_then_fail() {
    let mut f = fetcher(vec![net_err()], settings(3, 2));
    let err = f.fetch(URL).unwrap_err();
    assert!(matches!(err, FetchError::Network { attempts: 3, .. }));
    assert_eq!(f.transport().calls(), 3);
    assert_eq!(
        f.sleeper().delays,
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
}

#[test]
fn mixed_transient_failures_share_one_backoff_sequence() {
    let mut f = fetcher(vec![net_err(), status(429, ""), ok_png()], settings(5, 1));
    f.fetch(URL).unwrap();
    assert_eq!(
        f.sleeper().delays,
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[test]
fn decoded_image_matches_encoded_payload() {
    let mut f = fetcher(vec![ok_png()], settings(1, 1));
    let img = f.fetch(URL).unwrap();
    assert_eq!((img.width(), img.height()), (5, 4));
    assert_eq!(img.color_mode(), "RGB");
    assert_eq!(img.format, Some(ImageFormat::Png));
    assert_eq!(img.bytes, png_bytes(5, 4));
}

#[test]
fn undecodable_body_is_terminal() {
    let mut f = fetcher(vec![status(200, "<html>captcha</html>"), ok_png()], settings(5, 1));
    assert!(matches!(f.fetch(URL), Err(FetchError::Decode { .. })));
    assert_eq!(f.transport().calls(), 1);
    assert!(f.sleeper().delays.is_empty());
}

#[test]
fn zero_attempts_is_generic_failure_without_request() {
    let mut f = fetcher(vec![ok_png()], settings(0, 1));
    assert!(matches!(f.fetch(URL), Err(FetchError::RetriesExhausted)));
    assert_eq!(f.transport().calls(), 0);
}

#[test]
fn invalid_urls_are_rejected_before_any_request() {
    let mut f = fetcher(vec![ok_png()], settings(3, 1));
    assert!(matches!(f.fetch("not a url"), Err(FetchError::InvalidUrl { .. })));
    assert!(matches!(f.fetch("ftp://example.test/a.png"), Err(FetchError::InvalidUrl { .. })));
    assert_eq!(f.transport().calls(), 0);
}

#[test]
fn fetch_or_none_turns_failure_into_none() {
    let mut f = fetcher(vec![status(403, "Forbidden")], settings(3, 1));
    assert!(f.fetch_or_none(URL).is_none());
    let mut ok = fetcher(vec![ok_png()], settings(3, 1));
    assert!(ok.fetch_or_none(URL).is_some());
}

#[test]
fn request_carries_headers_and_timeout() {
    let mut s = settings(1, 1);
    s.headers.set("Referer", "https://ref.example.test/");
    s.timeout = Duration::from_secs(7);
    let mut f = fetcher(vec![ok_png()], s);
    f.fetch(&format!("  {}  ", URL)).unwrap();
    let req = &f.transport().requests[0];
    assert_eq!(req.url, URL);
    assert_eq!(req.timeout, Duration::from_secs(7));
    assert_eq!(req.headers.get("referer"), Some("https://ref.example.test/"));
    assert!(req.headers.get("User-Agent").is_some());
}

#[test]
fn observer_sees_attempts_backoffs_and_result() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&log);
    let mut f = fetcher(vec![status(429, ""), ok_png()], settings(3, 2)).with_observer(
        move |ev| {
            let line = match ev {
                FetchEvent::Attempt {
                    attempt,
                    max_attempts,
                } => format!("attempt {}/{}", attempt, max_attempts),
                FetchEvent::Backoff { delay, .. } => format!("wait {}s", delay.as_secs()),
                FetchEvent::Succeeded { image } => format!("ok {}", image.width()),
                FetchEvent::Failed { .. } => "failed".to_string(),
            };
            sink.borrow_mut().push(line);
        },
    );
    f.fetch(URL).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["attempt 1/3", "wait 2s", "attempt 2/3", "ok 5"]
    );
}
