use anyhow::{Context, Result};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::fs;
use std::path::{Path, PathBuf};

use super::fs_ops::output_path_for;
use super::resize::{decode, pad_to_square};
use crate::config::Config;
use crate::model::{Candidate, Category, ImageVariant};
use crate::unsplash::ImageSource;

#[derive(Debug, Clone)]
pub struct Exporter {
    pub output_dir: PathBuf,
    pub side: u32,
    pub quality: u8,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            side: 1024,
            quality: 95,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            side: config.export_side,
            quality: config.jpeg_quality,
        }
    }

    pub fn output_path(&self, category: Category) -> PathBuf {
        output_path_for(&self.output_dir, category)
    }

    pub fn render(&self, bytes: &[u8]) -> Result<RgbImage> {
        let image = decode(bytes)?;
        Ok(pad_to_square(&image, self.side))
    }

    /// Writes the squared image to `<output_dir>/<category>.jpg`, replacing any
    /// previous export. The file is written in place.
    pub fn export(&self, category: Category, bytes: &[u8]) -> Result<PathBuf> {
        let canvas = self.render(bytes)?;
        let path = self.output_path(category);
        write_jpeg(&canvas, &path, self.quality)?;
        Ok(path)
    }
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .encode_image(image)
            .context("Failed to encode JPEG")?;
    }
    Ok(out)
}

pub fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let data = encode_jpeg(image, quality)?;
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

/// Downloads the chosen candidate and exports it for `category`.
pub fn save_selection(
    source: &dyn ImageSource,
    exporter: &Exporter,
    category: Category,
    candidate: &Candidate,
    variant: ImageVariant,
) -> Result<PathBuf> {
    let url = candidate.url(variant);
    log::info!("Downloading {} for {}...", candidate.id, category);
    let bytes = source.fetch(url)?;
    exporter.export(category, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_export_writes_square_jpeg() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let category: Category = "night_rain".parse().unwrap();

        let path = exporter
            .export(category, &png_bytes(400, 700, [240, 240, 240]))
            .unwrap();
        assert_eq!(path, dir.path().join("night_rain.jpg"));

        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (1024, 1024));
        let written = written.to_rgb8();
        assert!(written.get_pixel(5, 512)[0] < 16);
        assert!(written.get_pixel(512, 512)[0] > 220);
    }

    #[test]
    fn test_export_overwrites() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let category: Category = "morning_clouds".parse().unwrap();

        exporter
            .export(category, &png_bytes(300, 300, [250, 0, 0]))
            .unwrap();
        let path = exporter
            .export(category, &png_bytes(300, 300, [0, 0, 250]))
            .unwrap();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let center = *image::open(&path).unwrap().to_rgb8().get_pixel(512, 512);
        assert!(center[2] > 200 && center[0] < 50);
    }

    #[test]
    fn test_export_rejects_garbage_without_writing() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        assert!(exporter.export(Category::default(), b"<html>").is_err());
        assert!(!exporter.output_path(Category::default()).exists());
    }

    #[test]
    fn test_encode_jpeg_respects_side() {
        let exporter = Exporter {
            side: 64,
            ..Exporter::new("unused")
        };
        let canvas = exporter.render(&png_bytes(10, 40, [9, 9, 9])).unwrap();
        assert_eq!(canvas.dimensions(), (64, 64));
        let jpeg = encode_jpeg(&canvas, 95).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }
}
