//! Per-frame skin-pixel classification.
//!
//! A pixel counts as skin when either of two independent color-space
//! heuristics matches: a plain RGB band rule, or a BT.601 YCbCr chroma
//! window. Frames are walked with an adaptive stride so at most ~10,000
//! pixels are inspected regardless of resolution.

use image::RgbImage;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};

/// Upper bound on inspected pixels per frame.
pub const MAX_SAMPLED_PIXELS: usize = 10_000;

/// RGB band rule for skin tones.
pub fn is_skin_rgb(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && r > g && r > b && max - min > 15 && (r - g).abs() > 15
}

/// YCbCr chroma window rule for skin tones (BT.601 conversion).
pub fn is_skin_ycbcr(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;
    y > 80.0 && (85.0..=135.0).contains(&cb) && (135.0..=180.0).contains(&cr)
}

/// Combined predicate: skin if either rule holds.
pub fn is_skin_pixel(r: u8, g: u8, b: u8) -> bool {
    is_skin_rgb(r, g, b) || is_skin_ycbcr(r, g, b)
}

/// Sampling stride keeping the inspected pixel count near the cap.
pub fn sampling_stride(total_pixels: usize, base_stride: usize) -> usize {
    let adaptive = (total_pixels as f64 / MAX_SAMPLED_PIXELS as f64).sqrt().ceil() as usize;
    base_stride.max(adaptive).max(1)
}

/// Fraction of sampled pixels classified as skin, rounded to 4 decimals.
pub fn skin_ratio(image: &RgbImage, base_stride: usize) -> f64 {
    let (width, height) = image.dimensions();
    let total = (width as usize) * (height as usize);
    if total == 0 {
        return 0.0;
    }

    let stride = sampling_stride(total, base_stride) as u32;
    let mut sampled = 0u64;
    let mut skin = 0u64;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let px = image.get_pixel(x, y);
            sampled += 1;
            if is_skin_pixel(px[0], px[1], px[2]) {
                skin += 1;
            }
            x += stride;
        }
        y += stride;
    }

    if sampled == 0 {
        0.0
    } else {
        round4(skin as f64 / sampled as f64)
    }
}

/// Decode a raster file and compute its skin ratio.
pub fn skin_ratio_file(path: &Path, base_stride: usize) -> AnalysisResult<f64> {
    let image = image::open(path)
        .map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgb8();
    Ok(skin_ratio(&image, base_stride))
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
