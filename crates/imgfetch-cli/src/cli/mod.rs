//! CLI for imgfetch.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use imgfetch_core::config::{self, ImgfetchConfig};
use std::path::PathBuf;

use commands::{run_config, run_get, run_inspect};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "imgfetch")]
#[command(about = "Fetch an image over HTTP with browser-like headers and retry on rate limits", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download an image, print its size and mode, and save it.
    Get(GetArgs),

    /// Decode a local image file and print its size, mode and format.
    Inspect {
        /// Path to the image file.
        path: PathBuf,
    },

    /// Print the config file location and the effective configuration.
    Config,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// HTTP/HTTPS URL of the image.
    pub url: String,

    /// Where to save the image (format follows the extension; PNG otherwise).
    #[arg(short, long, value_name = "PATH", conflicts_with = "no_save")]
    pub output: Option<PathBuf>,

    /// Only download and describe the image; do not write it to disk.
    #[arg(long)]
    pub no_save: bool,

    /// Header profile: "browser" or "research".
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Extra request header, e.g. "Referer: https://example.com/". Repeatable.
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Per-attempt timeout in seconds (at least 1).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Maximum number of attempts, including the first.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry in seconds; doubles after each retry.
    #[arg(long, value_name = "SECS")]
    pub initial_delay: Option<f64>,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let (cfg, cfg_path) = match &cli.config {
            Some(path) => (config::load_from(path)?, path.clone()),
            None => (config::load_or_init()?, config::config_path()?),
        };
        tracing::debug!("loaded config from {}: {:?}", cfg_path.display(), cfg);

        match cli.command {
            CliCommand::Get(args) => run_get(cfg, &args)?,
            CliCommand::Inspect { path } => run_inspect(&path)?,
            CliCommand::Config => run_config(&cfg, &cfg_path)?,
        }

        Ok(())
    }
}

/// Config with the CLI's request/retry flags applied on top.
pub(crate) fn apply_get_overrides(mut cfg: ImgfetchConfig, args: &GetArgs) -> Result<ImgfetchConfig> {
    if let Some(profile) = &args.profile {
        cfg.request.profile = profile.parse()?;
    }
    if let Some(secs) = args.timeout {
        cfg.request.timeout_secs = Some(secs);
    }
    for line in &args.headers {
        let (name, value) = imgfetch_core::headers::parse_header_line(line)?;
        cfg.request.set_header(name, value);
    }
    if args.max_attempts.is_some() || args.initial_delay.is_some() {
        let mut retry = cfg.retry.take().unwrap_or_default();
        if let Some(n) = args.max_attempts {
            retry.max_attempts = n;
        }
        if let Some(d) = args.initial_delay {
            retry.initial_delay_secs = d;
        }
        cfg.retry = Some(retry);
    }
    if let Some(output) = &args.output {
        cfg.output_path = output.clone();
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests;
