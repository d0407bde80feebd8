use crate::fetch::FetchSettings;
use crate::headers::HeaderProfile;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default save location, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "downloaded_image.png";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay in seconds before the second attempt; doubles after every retry.
    pub initial_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_secs: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        let delay = Duration::try_from_secs_f64(self.initial_delay_secs).with_context(|| {
            format!("invalid retry.initial_delay_secs {}", self.initial_delay_secs)
        })?;
        Ok(RetryPolicy::new(self.max_attempts, delay))
    }
}

/// Request shape: header profile, timeout and extra headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub profile: HeaderProfile,
    /// Per-attempt timeout; the profile's default when missing.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Headers added to (or replacing those of) the profile.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestConfig {
    /// Sets a header, dropping any entry whose name differs only in case.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|n, _| !n.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }
}

/// Global configuration loaded from `~/.config/imgfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImgfetchConfig {
    /// Where `imgfetch get` saves the image unless told otherwise.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default)]
    pub request: RequestConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for ImgfetchConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            request: RequestConfig::default(),
            retry: None,
        }
    }
}

impl ImgfetchConfig {
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        match &self.retry {
            Some(r) => r.policy(),
            None => Ok(RetryPolicy::default()),
        }
    }

    /// Per-attempt timeout. Zero is rejected: curl reads it as "no timeout".
    pub fn timeout(&self) -> Result<Duration> {
        match self.request.timeout_secs {
            Some(0) => anyhow::bail!("request.timeout_secs must be at least 1"),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(self.request.profile.default_timeout()),
        }
    }

    /// Builds fetcher settings: profile headers, then configured overrides.
    pub fn fetch_settings(&self) -> Result<FetchSettings> {
        let mut headers = self.request.profile.headers();
        headers.extend(&self.request.headers);
        Ok(FetchSettings {
            headers,
            timeout: self.timeout()?,
            policy: self.retry_policy()?,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(crate::APP_NAME)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgfetchConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<ImgfetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: ImgfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
