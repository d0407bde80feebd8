//! Image decoding, description and saving on top of the `image` crate.

use anyhow::{Context, Result};
use image::{ColorType, DynamicImage, ImageFormat, ImageResult};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Decoded pixels plus the container format that was sniffed from the bytes.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

/// Width, height and color mode of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub mode: &'static str,
}

pub fn decode(bytes: &[u8]) -> ImageResult<DecodedImage> {
    let format = image::guess_format(bytes).ok();
    let image = image::load_from_memory(bytes)?;
    Ok(DecodedImage { image, format })
}

/// Reads and decodes an image file from disk.
pub fn open(path: &Path) -> Result<DecodedImage> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("decode {}", path.display()))
}

pub fn describe(image: &DynamicImage) -> ImageSummary {
    ImageSummary {
        width: image.width(),
        height: image.height(),
        mode: color_mode(image.color()),
    }
}

/// PIL-style mode label for a color type.
pub fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGBF",
        ColorType::Rgba32F => "RGBAF",
        _ => "unknown",
    }
}

/// Upper-case format label, e.g. `PNG`.
pub fn format_name(format: ImageFormat) -> String {
    format!("{:?}", format).to_uppercase()
}

/// Output format for `path`: taken from the extension, PNG otherwise.
pub fn output_format(path: &Path) -> ImageFormat {
    ImageFormat::from_path(path).unwrap_or(ImageFormat::Png)
}

/// Saves `image` to `path`, creating parent directories. Returns the format used.
pub fn save(image: &DynamicImage, path: &Path) -> Result<ImageFormat> {
    let format = output_format(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let prepared = prepare_for(image, format);
    prepared
        .save_with_format(path, format)
        .with_context(|| format!("save {} as {}", path.display(), format_name(format)))?;
    tracing::debug!("saved {} as {}", path.display(), format_name(format));
    Ok(format)
}

/// Converts pixels the target encoder cannot store.
fn prepare_for(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    match format {
        ImageFormat::Jpeg if !matches!(color, ColorType::L8 | ColorType::Rgb8) => {
            Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8()))
        }
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Gif
            if matches!(color, ColorType::Rgb32F | ColorType::Rgba32F) =>
        {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        _ => Cow::Borrowed(image),
    }
}
