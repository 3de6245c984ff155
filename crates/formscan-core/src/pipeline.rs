//! Sizing rules for the crop/compression pipeline.
//!
//! The canvas work itself lives in the web crate; this module holds the
//! pure math so the bounds are testable natively.

use crate::coords::RasterRect;
use crate::error::FormScanError;

/// Minimum crop extent in raster pixels. Smaller selections are rejected
/// locally with no network call.
pub const MIN_CROP_PX: f64 = 10.0;

/// Largest dimension of an uploaded image.
pub const MAX_DIMENSION: u32 = 2000;

/// Largest total pixel count encoded without downscaling.
pub const MAX_PIXELS: u64 = 4_000_000;

/// JPEG encoder quality for uploads.
pub const JPEG_QUALITY: f64 = 0.85;

/// Validate a raster-space crop before any extraction work.
pub fn validate_crop(rect: &RasterRect) -> Result<(), FormScanError> {
    if rect.width < MIN_CROP_PX || rect.height < MIN_CROP_PX {
        return Err(FormScanError::SelectionTooSmall);
    }
    Ok(())
}

/// Output dimensions for an extracted crop.
///
/// Crops within both the dimension cap and the pixel budget are kept as-is;
/// anything larger is uniformly downscaled so the larger dimension equals
/// `MAX_DIMENSION`, preserving aspect ratio.
pub fn output_dimensions(width: u32, height: u32) -> (u32, u32) {
    let within_caps = width <= MAX_DIMENSION && height <= MAX_DIMENSION;
    let within_budget = (width as u64) * (height as u64) < MAX_PIXELS;
    if within_caps && within_budget {
        return (width, height);
    }

    let larger = width.max(height) as f64;
    let ratio = MAX_DIMENSION as f64 / larger;
    (
        ((width as f64) * ratio).round().max(1.0) as u32,
        ((height as f64) * ratio).round().max(1.0) as u32,
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Output always fits the dimension cap.
        #[test]
        fn output_never_exceeds_cap(w in 1u32..10_000, h in 1u32..10_000) {
            let (ow, oh) = output_dimensions(w, h);
            prop_assert!(ow <= MAX_DIMENSION);
            prop_assert!(oh <= MAX_DIMENSION);
        }

        /// Downscaling keeps the aspect ratio within rounding error.
        #[test]
        fn aspect_ratio_preserved(w in 100u32..10_000, h in 100u32..10_000) {
            let (ow, oh) = output_dimensions(w, h);
            let original = w as f64 / h as f64;
            let scaled = ow as f64 / oh as f64;
            prop_assert!((original - scaled).abs() / original < 0.02);
        }
    }
}
