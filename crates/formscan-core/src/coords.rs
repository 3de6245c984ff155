//! Coordinate mapping between display (CSS pixel) space and the raster
//! space of the rendered page.
//!
//! The mapping is recomputed per pointer event from the overlay's current
//! bounding box, never cached, since the displayed size can change between
//! layout passes. Crops and draws operate in raster space; only the live
//! drag rectangle is kept in display space for rendering convenience.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Minimum drag extent in display pixels; anything smaller is a no-op.
pub const MIN_DISPLAY_PX: f64 = 5.0;

/// Hard cap on the capture scale, keeping rasters bounded on high-DPI screens.
pub const MAX_CAPTURE_SCALE: f64 = 3.0;

/// Scale at which pages are rasterized for capture.
///
/// Twice the device pixel ratio so crops retain OCR-usable resolution
/// independent of the on-screen display size, capped at 3.
pub fn capture_scale(device_pixel_ratio: f64) -> f64 {
    (device_pixel_ratio * 2.0).min(MAX_CAPTURE_SCALE)
}

/// Convert a pointer event's client coordinates to raster-space coordinates,
/// given the overlay surface's on-screen bounding rectangle and the raster
/// dimensions behind it.
pub fn display_to_raster(
    client_x: f64,
    client_y: f64,
    bounds_left: f64,
    bounds_top: f64,
    displayed_width: f64,
    displayed_height: f64,
    raster_width: f64,
    raster_height: f64,
) -> (f64, f64) {
    let scale_x = raster_width / displayed_width;
    let scale_y = raster_height / displayed_height;
    (
        (client_x - bounds_left) * scale_x,
        (client_y - bounds_top) * scale_y,
    )
}

/// An axis-aligned rectangle in raster space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A live drag rectangle in display-pixel space, relative to the overlay
/// surface's bounding box. Valid only while a selection is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl SelectionRect {
    pub fn new(start_x: f64, start_y: f64) -> Self {
        Self {
            start_x,
            start_y,
            end_x: start_x,
            end_y: start_y,
        }
    }

    /// (x, y, width, height) with start/end points ordered via min/max.
    pub fn normalized(&self) -> (f64, f64, f64, f64) {
        let x = self.start_x.min(self.end_x);
        let y = self.start_y.min(self.end_y);
        let w = (self.end_x - self.start_x).abs();
        let h = (self.end_y - self.start_y).abs();
        (x, y, w, h)
    }

    /// A drag smaller than `MIN_DISPLAY_PX` in either axis is rejected
    /// before any conversion or network call.
    pub fn is_degenerate(&self) -> bool {
        let (_, _, w, h) = self.normalized();
        w < MIN_DISPLAY_PX || h < MIN_DISPLAY_PX
    }

    /// Map this display-space rectangle into raster space.
    pub fn to_raster(
        &self,
        displayed_width: f64,
        displayed_height: f64,
        raster_width: f64,
        raster_height: f64,
    ) -> RasterRect {
        let (x, y, w, h) = self.normalized();
        let scale_x = raster_width / displayed_width;
        let scale_y = raster_height / displayed_height;
        RasterRect {
            x: x * scale_x,
            y: y * scale_y,
            width: w * scale_x,
            height: h * scale_y,
        }
    }
}

/// Render parameters of a rasterized page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRenderState {
    pub page_number: u32,
    pub scale: f64,
    pub raster_width: u32,
    pub raster_height: u32,
}

/// Per-session record of the scale used for every page visited.
///
/// Only the current page's raster and overlay surfaces are materialized;
/// this map just retains the parameters for potential reuse.
#[derive(Debug, Default)]
pub struct PageScaleMap {
    pages: HashMap<u32, PageRenderState>,
}

impl PageScaleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: PageRenderState) {
        self.pages.insert(state.page_number, state);
    }

    pub fn get(&self, page_number: u32) -> Option<&PageRenderState> {
        self.pages.get(&page_number)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..4000.0
    }

    proptest! {
        /// Raster mapping is linear: doubling the offset doubles the result.
        #[test]
        fn mapping_is_linear(
            displayed_w in dimension(),
            displayed_h in dimension(),
            raster_w in dimension(),
            raster_h in dimension(),
        ) {
            let (x1, _) = display_to_raster(
                displayed_w * 0.25, 0.0, 0.0, 0.0, displayed_w, displayed_h, raster_w, raster_h,
            );
            let (x2, _) = display_to_raster(
                displayed_w * 0.5, 0.0, 0.0, 0.0, displayed_w, displayed_h, raster_w, raster_h,
            );
            prop_assert!((x2 - 2.0 * x1).abs() < 1e-6 * raster_w);
        }

        /// The overlay's far corner always maps to the raster's far corner.
        #[test]
        fn far_corner_maps_to_raster_extent(
            left in 0.0f64..500.0,
            top in 0.0f64..500.0,
            displayed_w in dimension(),
            displayed_h in dimension(),
            raster_w in dimension(),
            raster_h in dimension(),
        ) {
            let (x, y) = display_to_raster(
                left + displayed_w, top + displayed_h,
                left, top, displayed_w, displayed_h, raster_w, raster_h,
            );
            prop_assert!((x - raster_w).abs() < 1e-6 * raster_w.max(1.0));
            prop_assert!((y - raster_h).abs() < 1e-6 * raster_h.max(1.0));
        }

        /// Normalization never produces negative dimensions.
        #[test]
        fn normalized_is_non_negative(
            sx in -1000.0f64..1000.0,
            sy in -1000.0f64..1000.0,
            ex in -1000.0f64..1000.0,
            ey in -1000.0f64..1000.0,
        ) {
            let rect = SelectionRect { start_x: sx, start_y: sy, end_x: ex, end_y: ey };
            let (_, _, w, h) = rect.normalized();
            prop_assert!(w >= 0.0);
            prop_assert!(h >= 0.0);
        }
    }
}
