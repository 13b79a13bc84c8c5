use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use crate::monitor::config::OcrConfig;

/// Prepares a captured region for Tesseract.
///
/// Converts to grayscale (or binarizes when a threshold is configured) and
/// enlarges by the configured factor.
pub fn prepare_for_ocr(img: &RgbaImage, settings: &OcrConfig) -> GrayImage {
    let gray = match settings.threshold {
        Some(threshold) => threshold_bright_pixels(img, threshold),
        None => imageops::grayscale(img),
    };
    upscale(&gray, settings.upscale)
}

/// Converts image to binary by keeping only bright pixels.
///
/// Pixels where R > threshold AND G > threshold AND B > threshold become black (text).
/// All other pixels become white (background). Useful for light text on dark UIs.
pub fn threshold_bright_pixels(img: &RgbaImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        let value = if r > threshold && g > threshold && b > threshold {
            0u8
        } else {
            255u8
        };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Enlarges an image by an integer factor. A factor of 0 or 1 returns a copy.
pub fn upscale(img: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 {
        return img.clone();
    }
    let (width, height) = img.dimensions();
    imageops::resize(
        img,
        width.saturating_mul(factor),
        height.saturating_mul(factor),
        FilterType::CatmullRom,
    )
}
