//! `imgfetch inspect <path>` – describe a local image file.

use anyhow::Result;
use imgfetch_core::raster;
use std::path::Path;

pub fn run_inspect(path: &Path) -> Result<()> {
    let decoded = raster::open(path)?;
    let summary = raster::describe(&decoded.image);
    println!("{}", path.display());
    println!("Image size: ({}, {})", summary.width, summary.height);
    println!("Image mode: {}", summary.mode);
    match decoded.format {
        Some(format) => println!("Image format: {}", raster::format_name(format)),
        None => println!("Image format: unknown"),
    }
    Ok(())
}
