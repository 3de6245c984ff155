//! Document rasterization via the browser's pdf.js library.
//!
//! The rasterizer depends only on the pdf.js document shape
//! (`getDocument(bytes)`, `numPages`, `getPage(n)`, `getViewport(scale)`,
//! `render(ctx, viewport)`) and reaches it through `js_sys::Reflect`, so no
//! bundled JS snippet is required.

use js_sys::{Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlCanvasElement;

use formscan_core::PageRenderState;

fn js_get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .map_err(|e| JsValue::from_str(&format!("Missing property '{}': {:?}", key, e)))
}

fn js_fn(target: &JsValue, key: &str) -> Result<js_sys::Function, JsValue> {
    js_get(target, key)?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| JsValue::from_str(&format!("'{}' is not a function", key)))
}

async fn await_promise(value: JsValue) -> Result<JsValue, JsValue> {
    let promise: Promise = value
        .dyn_into()
        .map_err(|_| JsValue::from_str("Expected a promise"))?;
    JsFuture::from(promise).await
}

/// Check whether pdf.js is loaded in this page.
pub fn pdfjs_available() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return false,
        };
        match Reflect::get(&window, &JsValue::from_str("pdfjsLib")) {
            Ok(val) => !val.is_undefined(),
            Err(_) => false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    false
}

/// Wraps a loaded pdf.js document proxy.
#[wasm_bindgen]
pub struct PageRasterizer {
    document_proxy: Option<JsValue>,
    page_count: u32,
}

#[wasm_bindgen]
impl PageRasterizer {
    /// Create a new rasterizer with no document loaded
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            document_proxy: None,
            page_count: 0,
        }
    }

    /// Load a PDF document from bytes via pdf.js
    #[wasm_bindgen]
    pub async fn load(&mut self, bytes: &[u8]) -> Result<u32, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let pdfjs = js_get(&window, "pdfjsLib")?;
        if pdfjs.is_undefined() {
            return Err(JsValue::from_str("pdf.js not loaded"));
        }

        let typed_array = Uint8Array::new_with_length(bytes.len() as u32);
        typed_array.copy_from(bytes);

        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("data"), &typed_array)?;

        let get_document = js_fn(&pdfjs, "getDocument")?;
        let loading_task = get_document.call1(&pdfjs, &options)?;
        let doc = await_promise(js_get(&loading_task, "promise")?).await?;

        self.page_count = js_get(&doc, "numPages")?.as_f64().unwrap_or(0.0) as u32;
        self.document_proxy = Some(doc);
        Ok(self.page_count)
    }

    /// Get the number of pages in the loaded document
    #[wasm_bindgen]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Check if a document is currently loaded
    #[wasm_bindgen]
    pub fn is_loaded(&self) -> bool {
        self.document_proxy.is_some() && self.page_count > 0
    }

    /// Drop the loaded document
    #[wasm_bindgen]
    pub fn unload(&mut self) {
        self.document_proxy = None;
        self.page_count = 0;
    }
}

impl PageRasterizer {
    /// Cheap clone of the pdf.js document proxy. Rendering runs against
    /// this handle so callers never need to keep a borrow of the
    /// rasterizer alive across an await.
    pub fn document_handle(&self) -> Option<JsValue> {
        self.document_proxy.clone()
    }
}

/// Render a page (1-indexed) of the given document into the canvas at the
/// given scale, resizing the canvas to the viewport's raster dimensions.
pub async fn render_page(
    doc: &JsValue,
    page_count: u32,
    page_num: u32,
    canvas: &HtmlCanvasElement,
    scale: f64,
) -> Result<PageRenderState, JsValue> {
    if page_num < 1 || page_num > page_count {
        return Err(JsValue::from_str(&format!(
            "Invalid page number: {} (document has {} pages)",
            page_num, page_count
        )));
    }

    let get_page = js_fn(doc, "getPage")?;
    let page = await_promise(get_page.call1(doc, &JsValue::from_f64(page_num as f64))?).await?;

    let get_viewport = js_fn(&page, "getViewport")?;
    let viewport_opts = Object::new();
    Reflect::set(
        &viewport_opts,
        &JsValue::from_str("scale"),
        &JsValue::from_f64(scale),
    )?;
    let viewport = get_viewport.call1(&page, &viewport_opts)?;

    let width = js_get(&viewport, "width")?.as_f64().unwrap_or(0.0);
    let height = js_get(&viewport, "height")?.as_f64().unwrap_or(0.0);
    canvas.set_width(width.round() as u32);
    canvas.set_height(height.round() as u32);

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("No 2d context on page canvas"))?;

    let render_opts = Object::new();
    Reflect::set(&render_opts, &JsValue::from_str("canvasContext"), &ctx)?;
    Reflect::set(&render_opts, &JsValue::from_str("viewport"), &viewport)?;

    let render = js_fn(&page, "render")?;
    let render_task = render.call1(&page, &render_opts)?;
    await_promise(js_get(&render_task, "promise")?).await?;

    Ok(PageRenderState {
        page_number: page_num,
        scale,
        raster_width: canvas.width(),
        raster_height: canvas.height(),
    })
}

impl Default for PageRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterizer_initial_state() {
        let rasterizer = PageRasterizer::new();
        assert_eq!(rasterizer.page_count(), 0);
        assert!(!rasterizer.is_loaded());
    }

    #[test]
    fn test_unload_resets_state() {
        let mut rasterizer = PageRasterizer::new();
        rasterizer.unload();
        assert_eq!(rasterizer.page_count(), 0);
        assert!(!rasterizer.is_loaded());
    }

    #[test]
    fn test_no_document_handle_before_load() {
        let rasterizer = PageRasterizer::new();
        assert!(rasterizer.document_handle().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_pdfjs_not_available_outside_wasm() {
        assert!(!pdfjs_available());
    }
}
