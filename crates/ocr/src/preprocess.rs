use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

use crate::types::Rotation;

/// Width band the recognizer is tuned for.
pub const OCR_MIN_WIDTH: u32 = 800;
pub const OCR_MAX_WIDTH: u32 = 1600;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
    #[error("Image has zero width or height")]
    Empty,
}

/// Rotate, grayscale, contrast-stretch and rescale, then return PNG bytes ready for OCR.
pub fn prepare_for_ocr(img: &DynamicImage, rotation: Rotation) -> Result<Vec<u8>, PreprocessError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(PreprocessError::Empty);
    }
    let rotated = rotate(img, rotation);
    let gray = stretch_contrast(rotated.to_luma8());
    let scaled = rescale_into_band(gray);
    encode_as_png(DynamicImage::ImageLuma8(scaled))
}

fn rotate(img: &DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => img.clone(),
        Rotation::Cw90 => img.rotate90(),
        Rotation::Cw180 => img.rotate180(),
        Rotation::Cw270 => img.rotate270(),
    }
}

/// Min/max stretch to the full 0–255 range.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        // Uniform image, nothing to stretch.
        return gray;
    }

    let range = (max_px - min_px) as u32;
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    })
}

fn rescale_into_band(gray: GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    let target_w = w.clamp(OCR_MIN_WIDTH, OCR_MAX_WIDTH);
    if target_w == w {
        return gray;
    }
    let target_h = ((h as f64 * target_w as f64 / w as f64).round() as u32).max(1);
    image::imageops::resize(&gray, target_w, target_h, FilterType::Triangle)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |_, _| Luma([value])))
    }

    fn gradient_gray(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, _| Luma([(x * 255 / width) as u8]))
    }

    #[test]
    fn stretch_uniform_image_is_unchanged() {
        let img = solid_gray(10, 10, 128).to_luma8();
        let out = stretch_contrast(img.clone());
        assert_eq!(out, img);
    }

    #[test]
    fn stretch_narrow_range_reaches_extremes() {
        let img: GrayImage = ImageBuffer::from_fn(100, 1, |x, _| Luma([100 + (x / 2) as u8]));
        let out = stretch_contrast(img);
        let min = out.pixels().map(|p| p[0]).min().unwrap();
        let max = out.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn small_image_is_upscaled_into_band() {
        let out = rescale_into_band(gradient_gray(400, 300));
        assert_eq!(out.dimensions(), (OCR_MIN_WIDTH, 600));
    }

    #[test]
    fn wide_image_is_downscaled_into_band() {
        let out = rescale_into_band(gradient_gray(3200, 100));
        assert_eq!(out.dimensions(), (OCR_MAX_WIDTH, 50));
    }

    #[test]
    fn width_inside_band_is_untouched() {
        let out = rescale_into_band(gradient_gray(1000, 700));
        assert_eq!(out.dimensions(), (1000, 700));
    }

    #[test]
    fn rotation_swaps_dimensions_before_scaling() {
        let img = DynamicImage::ImageLuma8(gradient_gray(1200, 900));
        let png = prepare_for_ocr(&img, Rotation::Cw90).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 900);
        assert_eq!(decoded.height(), 1200);
    }

    #[test]
    fn output_is_png() {
        let png = prepare_for_ocr(&solid_gray(4, 4, 100), Rotation::None).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let img = DynamicImage::ImageLuma8(gradient_gray(640, 480));
        for rotation in Rotation::ALL {
            let a = prepare_for_ocr(&img, rotation).unwrap();
            let b = prepare_for_ocr(&img, rotation).unwrap();
            assert_eq!(a, b, "rotation {rotation} was not deterministic");
        }
    }
}
