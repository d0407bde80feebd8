//! Request header profiles and an ordered, case-insensitive header set.
//!
//! Some image hosts answer 403 to clients that do not look like a browser,
//! so every request carries one of the fixed profiles below plus any
//! user-supplied overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Named, fixed set of request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderProfile {
    /// Desktop Chrome: the most permissive profile for hosts that block bots.
    #[default]
    Browser,
    /// Honest, self-identifying client with a search-engine referer.
    Research,
}

impl HeaderProfile {
    pub fn headers(self) -> HeaderSet {
        let mut set = HeaderSet::new();
        match self {
            HeaderProfile::Browser => {
                set.set("User-Agent", BROWSER_USER_AGENT);
                set.set(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
                );
                set.set("Accept-Language", "en-US,en;q=0.5");
                set.set("Accept-Encoding", "gzip, deflate");
                set.set("Connection", "keep-alive");
                set.set("Upgrade-Insecure-Requests", "1");
            }
            HeaderProfile::Research => {
                set.set(
                    "User-Agent",
                    &format!(
                        "imgfetch/{} (Educational/Research)",
                        env!("CARGO_PKG_VERSION")
                    ),
                );
                set.set(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
                );
                set.set("Accept-Language", "en-US,en;q=0.9");
                set.set("Referer", "https://www.google.com/");
            }
        }
        set
    }

    /// Per-request timeout used when the config does not set one.
    pub fn default_timeout(self) -> Duration {
        match self {
            HeaderProfile::Browser => Duration::from_secs(10),
            HeaderProfile::Research => Duration::from_secs(15),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderProfile::Browser => "browser",
            HeaderProfile::Research => "research",
        }
    }
}

impl fmt::Display for HeaderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderProfile {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(HeaderProfile::Browser),
            "research" => Ok(HeaderProfile::Research),
            other => Err(HeaderError::UnknownProfile(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("unknown header profile '{0}' (expected 'browser' or 'research')")]
    UnknownProfile(String),
    #[error("malformed header '{0}' (expected 'Name: value')")]
    Malformed(String),
}

/// Ordered header list. Names compare case-insensitively; `set` replaces an
/// existing entry in place so profile ordering survives overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim();
        let value = value.trim();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parses and applies a `Name: value` line.
    pub fn set_line(&mut self, line: &str) -> Result<(), HeaderError> {
        let (name, value) = parse_header_line(line)?;
        self.set(name, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Extend<(K, V)> for HeaderSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k.as_ref(), v.as_ref());
        }
    }
}

/// Splits `Name: value` on the first colon.
pub fn parse_header_line(line: &str) -> Result<(&str, &str), HeaderError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| HeaderError::Malformed(line.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(HeaderError::Malformed(line.to_string()));
    }
    Ok((name, value.trim()))
}
