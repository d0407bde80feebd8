//! `imgfetch config` – show where config lives and what is in effect.

use anyhow::Result;
use imgfetch_core::config::ImgfetchConfig;
use std::path::Path;

pub fn run_config(cfg: &ImgfetchConfig, path: &Path) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", cfg.to_toml()?);
    let policy = cfg.retry_policy()?;
    let timeout = cfg.timeout()?;
    println!(
        "# effective: profile={} timeout={:?} max_attempts={} initial_delay={:?}",
        cfg.request.profile,
        timeout,
        policy.max_attempts,
        policy.initial_delay
    );
    Ok(())
}
