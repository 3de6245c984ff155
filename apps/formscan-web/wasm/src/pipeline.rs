//! Crop extraction and image compression.
//!
//! Copies the selected raster region off the page canvas into a minimal
//! offscreen canvas, downscales it when it exceeds the upload bounds, and
//! encodes it as JPEG with a PNG fallback. All sizing decisions come from
//! `formscan_core::pipeline`.

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, HtmlCanvasElement};

use formscan_core::{output_dimensions, validate_crop, RasterRect, JPEG_QUALITY};

const MIME_JPEG: &str = "image/jpeg";
const MIME_PNG: &str = "image/png";

/// Filename sent with the multipart upload. The extension only hints at the
/// encoding; the blob's MIME type is authoritative.
pub const UPLOAD_FILENAME: &str = "selection.jpg";

fn offscreen_canvas(
    width: u32,
    height: u32,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let document = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window object"))?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("No 2d context on crop canvas"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((canvas, ctx))
}

/// Encode the canvas via `toBlob`. Resolves to `None` when the browser
/// declines the requested encoding (a null blob).
async fn encode_blob(
    canvas: &HtmlCanvasElement,
    mime: &str,
    quality: Option<f64>,
) -> Result<Option<Blob>, JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        let callback = Closure::once_into_js(move |blob: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &blob);
        });
        let result = match quality {
            Some(q) => canvas.to_blob_with_type_and_encoder_options(
                callback.unchecked_ref(),
                mime,
                &JsValue::from_f64(q),
            ),
            None => canvas.to_blob_with_type(callback.unchecked_ref(), mime),
        };
        if let Err(e) = result {
            let _ = reject.call1(&JsValue::NULL, &e);
        }
    });

    let value = JsFuture::from(promise).await?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    Ok(Some(value.dyn_into::<Blob>()?))
}

/// Extract the selected region from the rendered page and encode it for
/// upload.
///
/// The crop is drawn at native raster resolution first; a separate
/// high-quality smoothed downscale pass runs only when the region exceeds
/// the dimension cap or pixel budget. Encoding prefers JPEG at the fixed
/// upload quality and falls back to PNG when the JPEG encoder is
/// unavailable.
pub async fn extract_region(
    page_canvas: &HtmlCanvasElement,
    rect: &RasterRect,
) -> Result<Blob, JsValue> {
    validate_crop(rect).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let crop_w = rect.width.round().max(1.0) as u32;
    let crop_h = rect.height.round().max(1.0) as u32;

    let (crop_canvas, crop_ctx) = offscreen_canvas(crop_w, crop_h)?;
    crop_ctx
        .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            page_canvas,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            0.0,
            0.0,
            crop_w as f64,
            crop_h as f64,
        )?;

    let (out_w, out_h) = output_dimensions(crop_w, crop_h);
    let upload_canvas = if (out_w, out_h) == (crop_w, crop_h) {
        crop_canvas
    } else {
        let (scaled_canvas, scaled_ctx) = offscreen_canvas(out_w, out_h)?;
        scaled_ctx.set_image_smoothing_enabled(true);
        // web-sys has no binding for imageSmoothingQuality; set the property directly.
        js_sys::Reflect::set(
            &scaled_ctx,
            &JsValue::from_str("imageSmoothingQuality"),
            &JsValue::from_str("high"),
        )?;
        scaled_ctx
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &crop_canvas,
                0.0,
                0.0,
                crop_w as f64,
                crop_h as f64,
                0.0,
                0.0,
                out_w as f64,
                out_h as f64,
            )?;
        scaled_canvas
    };

    match encode_blob(&upload_canvas, MIME_JPEG, Some(JPEG_QUALITY)).await {
        Ok(Some(blob)) => return Ok(blob),
        Ok(None) | Err(_) => {}
    }

    encode_blob(&upload_canvas, MIME_PNG, None)
        .await?
        .ok_or_else(|| JsValue::from_str("Canvas encoding produced no blob"))
}

// Browser-only tests: canvas drawing and toBlob need a real 2d context.
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn painted_page(width: u32, height: u32) -> HtmlCanvasElement {
        let (canvas, ctx) = offscreen_canvas(width, height).unwrap();
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        ctx.set_fill_style_str("#000000");
        ctx.fill_rect(20.0, 20.0, 60.0, 30.0);
        canvas
    }

    #[wasm_bindgen_test]
    async fn test_extract_region_produces_blob() {
        let page = painted_page(400, 300);
        let rect = RasterRect {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 80.0,
        };
        let blob = extract_region(&page, &rect).await.unwrap();
        assert!(blob.size() > 0.0);
    }

    #[wasm_bindgen_test]
    async fn test_tiny_crop_rejected() {
        let page = painted_page(400, 300);
        let rect = RasterRect {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
        };
        assert!(extract_region(&page, &rect).await.is_err());
    }
}
