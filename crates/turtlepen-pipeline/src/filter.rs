//! Image filtering front-end: raw image bytes to a 0/255 edge mask.
//!
//! Mirrors the classic edge-extraction chain used to prepare photos for
//! the compiler:
//!
//! 1. decode and convert to luminance,
//! 2. Gaussian blur,
//! 3. Canny edge detection,
//! 4. 3×3 dilation (repeated `dilate_iterations` times),
//! 5. optional inversion.
//!
//! Each step is a pure function over [`GrayImage`]. The output only ever
//! holds 0 and 255, so it converts losslessly with
//! [`BinaryMask::from_gray`](crate::mask::BinaryMask::from_gray).

use image::GrayImage;
use imageproc::distance_transform::Norm;

use crate::types::{PipelineConfig, PipelineError};

/// Minimum Canny threshold accepted by [`canny`].
///
/// A zero low threshold marks every pixel with any gradient as a
/// candidate edge, which floods the mask with one giant island.
pub const MIN_THRESHOLD: f32 = 1.0;

/// Decode raw image bytes (PNG, JPEG, BMP, WebP) to luminance.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty and
/// [`PipelineError::ImageDecode`] if the data cannot be decoded.
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?.to_luma8())
}

/// Decode raw image bytes and keep only the red channel.
///
/// Pre-binarized masks are read by their red channel: gray images carry
/// their level there, and pure red counts as ink just like white.
///
/// # Errors
///
/// Same as [`decode_grayscale`].
pub fn decode_red_channel(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Ok(GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        image::Luma([rgba.get_pixel(x, y).0[0]])
    }))
}

/// Gaussian blur. A non-positive `sigma` returns the image unchanged
/// (`imageproc` panics on `sigma <= 0`).
#[must_use = "returns the blurred image"]
pub fn blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Canny edge detection: 255 on edges, 0 elsewhere.
///
/// Both thresholds are raised to at least [`MIN_THRESHOLD`], and `low`
/// is capped at `high`.
#[must_use = "returns the edge map"]
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let high = high.max(MIN_THRESHOLD);
    let low = low.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}

/// Grow foreground by one pixel per iteration using a 3×3 square
/// structuring element. Zero iterations is the identity.
#[must_use = "returns the dilated mask"]
pub fn dilate(image: &GrayImage, iterations: u32) -> GrayImage {
    (0..iterations).fold(image.clone(), |acc, _| {
        imageproc::morphology::dilate(&acc, Norm::LInf, 1)
    })
}

/// Swap foreground and background (bitwise NOT).
#[must_use = "returns the inverted mask"]
pub fn invert(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([!image.get_pixel(x, y).0[0]])
    })
}

/// Run the whole filter chain on an already-decoded image.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
pub fn edge_mask(gray: &GrayImage, config: &PipelineConfig) -> Result<GrayImage, PipelineError> {
    config.validate()?;

    let blurred = blur(gray, config.blur_sigma);
    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let dilated = dilate(&edges, config.dilate_iterations);
    let mask = if config.invert {
        invert(&dilated)
    } else {
        dilated
    };

    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        sigma = config.blur_sigma,
        low = config.canny_low,
        high = config.canny_high,
        dilate = config.dilate_iterations,
        invert = config.invert,
        "edge mask built"
    );
    Ok(mask)
}
