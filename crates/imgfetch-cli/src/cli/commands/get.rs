//! `imgfetch get <url>` – download, describe and save an image.

use anyhow::{bail, Result};
use imgfetch_core::config::ImgfetchConfig;
use imgfetch_core::fetch::{FetchError, FetchEvent, Fetcher};
use imgfetch_core::raster;

use crate::cli::{apply_get_overrides, GetArgs};

pub fn run_get(cfg: ImgfetchConfig, args: &GetArgs) -> Result<()> {
    let cfg = apply_get_overrides(cfg, args)?;
    let settings = cfg.fetch_settings()?;

    println!("Downloading image from: {}", args.url);
    println!("{}", "-".repeat(50));

    let mut fetcher = Fetcher::new(settings).with_observer(print_progress);
    let image = match fetcher.fetch(&args.url) {
        Ok(image) => image,
        Err(err) => {
            println!("✗ {}", err);
            bail!("no image obtained from {}", args.url);
        }
    };

    let summary = image.summary();
    println!("✓ Image successfully downloaded!");
    println!("Final URL: {}", image.final_url);
    println!("Image size: ({}, {})", summary.width, summary.height);
    println!("Image mode: {}", summary.mode);
    if let Some(format) = image.format {
        println!("Image format: {}", raster::format_name(format));
    }

    if !args.no_save {
        let path = &cfg.output_path;
        raster::save(&image.image, path)?;
        println!("✓ Image saved to: {}", path.display());
    }
    Ok(())
}

fn print_progress(event: &FetchEvent<'_>) {
    match event {
        FetchEvent::Attempt {
            attempt,
            max_attempts,
        } => println!("Attempt {}/{}...", attempt, max_attempts),
        FetchEvent::Backoff { delay, error, .. } => match error {
            FetchError::RateLimited { .. } => println!("⚠ Rate limited. Waiting {:?}...", delay),
            other => {
                println!("✗ Error: {}", other);
                println!("Retrying in {:?}...", delay);
            }
        },
        FetchEvent::Succeeded { .. } | FetchEvent::Failed { .. } => {}
    }
}
