//! OCR service client.
//!
//! Posts the encoded selection as a multipart form to the configured
//! endpoint and parses the JSON body into the core response model. The
//! caller decides what to do with the interpreted text; this module only
//! handles transport.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Request, RequestInit, RequestMode, Response};

use formscan_core::OcrResponse;

use crate::pipeline::UPLOAD_FILENAME;

/// OCR engine variant requested from the service. Engine 2 handles mixed
/// print and handwriting better on scanned forms.
const OCR_ENGINE: &str = "2";
const OCR_LANGUAGE: &str = "eng";

/// Transport-level OCR client, configured once per session.
#[derive(Debug, Clone)]
pub struct OcrClient {
    endpoint: String,
    api_key: Option<String>,
}

impl OcrClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self { endpoint, api_key }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload a selection image and parse the service response.
    ///
    /// The overlay is always requested so the interpreter can rebuild line
    /// structure from word boxes instead of trusting the flat text.
    pub async fn recognize(&self, image: &Blob) -> Result<OcrResponse, JsValue> {
        let form = FormData::new()?;
        form.append_with_blob_and_filename("file", image, UPLOAD_FILENAME)?;
        form.append_with_str("language", OCR_LANGUAGE)?;
        form.append_with_str("OCREngine", OCR_ENGINE)?;
        form.append_with_str("detectOrientation", "true")?;
        form.append_with_str("isOverlayRequired", "true")?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(form.as_ref());

        let request = Request::new_with_str_and_init(&self.endpoint, &opts)?;
        if let Some(key) = &self.api_key {
            request.headers().set("apikey", key)?;
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;

        if !response.ok() {
            return Err(JsValue::from_str(&format!(
                "OCR request failed with HTTP {}",
                response.status()
            )));
        }

        let body = JsFuture::from(response.text()?)
            .await?
            .as_string()
            .ok_or_else(|| JsValue::from_str("OCR response body was not text"))?;

        serde_json::from_str::<OcrResponse>(&body)
            .map_err(|e| JsValue::from_str(&format!("Malformed OCR response: {}", e)))
    }
}
