use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).context("Failed to decode image")
}

/// Shrinks `image` so neither side exceeds `max`, keeping the aspect ratio.
/// Images already inside the box are returned unchanged.
pub fn fit_within(image: &DynamicImage, max: u32) -> DynamicImage {
    if image.width() <= max && image.height() <= max {
        return image.clone();
    }
    image.resize(max, max, FilterType::Lanczos3)
}

/// Offsets that center a `width`×`height` image on a `side`×`side` canvas.
pub fn center_offsets(width: u32, height: u32, side: u32) -> (u32, u32) {
    (side.saturating_sub(width) / 2, side.saturating_sub(height) / 2)
}

/// Fits `image` into a `side`×`side` box and pastes it centered on an opaque
/// black canvas of exactly that size.
pub fn pad_to_square(image: &DynamicImage, side: u32) -> RgbImage {
    let fitted = fit_within(image, side).to_rgb8();
    let mut canvas = RgbImage::from_pixel(side, side, Rgb([0, 0, 0]));
    let (x, y) = center_offsets(fitted.width(), fitted.height(), side);
    imageops::replace(&mut canvas, &fitted, x as i64, y as i64);
    canvas
}

/// Preview thumbnail from raw bytes.
pub fn make_preview(bytes: &[u8], max: u32) -> Result<DynamicImage> {
    let image = decode(bytes)?;
    Ok(fit_within(&image, max))
}
