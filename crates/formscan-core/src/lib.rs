//! Core logic for guided document-to-form OCR capture.
//!
//! This crate is UI-framework-agnostic: the field plan builder, wizard
//! state machine, coordinate mapping, crop sizing, OCR interpretation, and
//! field-aware normalization all live here and run natively. The companion
//! WASM crate wires these to the browser (canvas overlay, fetch, DOM form).

pub mod coords;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod ocr;
pub mod pager;
pub mod pipeline;
pub mod plan;
pub mod wizard;

pub use coords::{
    capture_scale, display_to_raster, PageRenderState, PageScaleMap, RasterRect, SelectionRect,
    MIN_DISPLAY_PX,
};
pub use error::FormScanError;
pub use fields::{ControlType, FieldKind, FieldSpec};
pub use normalize::normalize;
pub use ocr::{interpret, OcrResponse, OverlayLine, OverlayWord, ParsedResult, WordsOverlay};
pub use pager::{step_page, PageStep, WheelAccumulator, WHEEL_THRESHOLD};
pub use pipeline::{output_dimensions, validate_crop, JPEG_QUALITY, MAX_DIMENSION, MIN_CROP_PX};
pub use plan::{build_plan, ScrapedControl};
pub use wizard::{Commit, Wizard, WizardPhase};
