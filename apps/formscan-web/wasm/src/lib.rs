//! WASM bindings for guided document-to-form OCR capture.
//!
//! All session state is held in Rust via `FormScanSession`; JavaScript only
//! forwards DOM events and renders the surrounding chrome.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { FormScanSession } from './pkg/formscan_wasm.js';
//!
//! await init();
//!
//! const session = new FormScanSession('page-canvas', 'overlay-canvas',
//!                                     'https://api.ocr.example/parse', apiKey);
//! await session.loadDocument(bytes);
//! session.buildPlan();
//! session.beginGuided();
//!
//! overlay.onmousedown = e => session.onDragStart(e.clientX, e.clientY);
//! overlay.onmousemove = e => session.onDragMove(e.clientX, e.clientY);
//! overlay.onmouseup   = () => session.onDragEnd();
//! confirmBtn.onclick  = () => session.confirmCurrentField();
//! ```

pub mod form;
pub mod notify;
pub mod ocr_client;
pub mod overlay;
pub mod pipeline;
pub mod session;
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use notify::NoticeLevel;
pub use overlay::SelectionOverlay;
pub use session::FormScanSession;
pub use viewer::PageRasterizer;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
