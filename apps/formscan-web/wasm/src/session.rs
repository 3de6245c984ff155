//! Session controller exported to JavaScript.
//!
//! One `FormScanSession` owns the full capture state: the rasterizer, the
//! selection overlay, the OCR client, the wizard, and page navigation. The
//! host page only forwards DOM events and renders chrome around it.
//!
//! Every exported method takes `&self` with interior mutability. An async
//! OCR round-trip would otherwise hold an exclusive wasm-bindgen borrow
//! across its await points and turn every pointer event in the meantime
//! into a reentrancy error. State borrows are kept short and never held
//! across an await.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement};

use formscan_core::{
    capture_scale, interpret, normalize, step_page, validate_crop, ControlType, FieldKind,
    FieldSpec, FormScanError, PageScaleMap, PageStep, WheelAccumulator, Wizard, WizardPhase,
};

use crate::form;
use crate::notify::{self, NoticeLevel};
use crate::ocr_client::OcrClient;
use crate::overlay::SelectionOverlay;
use crate::pipeline;
use crate::viewer::{self, PageRasterizer};

/// Delay before arming capture after a tab switch, letting the layout
/// settle so the first pointer event maps against final geometry.
pub const TAB_SWITCH_SETTLE_MS: i32 = 350;

/// Grace period after an input blurs before focus-mode capture disarms.
/// A pointer moving from the input to the overlay blurs the input first;
/// the grace window keeps the capture target alive across that hop.
pub const BLUR_GRACE_MS: i32 = 200;

/// Host tab names for the commit round trip: show the filled form, pause,
/// then return to the capture view for the next field.
const FORM_TAB: &str = "form";
const CAPTURE_TAB: &str = "capture";

#[derive(Default)]
struct SessionState {
    wizard: Option<Wizard>,
    pages: PageScaleMap,
    current_page: u32,
    wheel: WheelAccumulator,
    guided: bool,
    /// Rasterizer busy: a load or render is in flight.
    busy: bool,
    /// Focus-mode OCR request in flight (guided mode uses the wizard phase).
    ocr_busy: bool,
    /// Bumped on every OCR submission and on any document or page change;
    /// a response whose sequence no longer matches is dropped.
    request_seq: u64,
    arm_timer: Option<i32>,
    blur_timer: Option<i32>,
}

/// Focus-mode capture target, resolved at drag end.
struct FocusTarget {
    name: String,
    control: ControlType,
    kind: FieldKind,
}

#[wasm_bindgen]
pub struct FormScanSession {
    page_canvas: HtmlCanvasElement,
    overlay: SelectionOverlay,
    rasterizer: RefCell<PageRasterizer>,
    ocr: OcrClient,
    state: Rc<RefCell<SessionState>>,
    armed: Rc<Cell<bool>>,
    focused: Rc<RefCell<Option<String>>>,
}

#[wasm_bindgen]
impl FormScanSession {
    /// Build a session over the page and overlay canvases. Fails when
    /// either canvas is missing; a session never half-initializes.
    #[wasm_bindgen(constructor)]
    pub fn new(
        page_canvas_id: &str,
        overlay_canvas_id: &str,
        ocr_endpoint: String,
        api_key: Option<String>,
    ) -> Result<FormScanSession, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document object"))?;

        let page_canvas = document
            .get_element_by_id(page_canvas_id)
            .ok_or_else(|| {
                JsValue::from_str(&format!("Page canvas '{}' not found", page_canvas_id))
            })?
            .dyn_into::<HtmlCanvasElement>()?;
        let overlay_canvas = document
            .get_element_by_id(overlay_canvas_id)
            .ok_or_else(|| {
                JsValue::from_str(&format!("Overlay canvas '{}' not found", overlay_canvas_id))
            })?
            .dyn_into::<HtmlCanvasElement>()?;

        Ok(FormScanSession {
            page_canvas,
            overlay: SelectionOverlay::new(overlay_canvas)?,
            rasterizer: RefCell::new(PageRasterizer::new()),
            ocr: OcrClient::new(ocr_endpoint, api_key),
            state: Rc::new(RefCell::new(SessionState::default())),
            armed: Rc::new(Cell::new(false)),
            focused: Rc::new(RefCell::new(None)),
        })
    }

    /// Load a document and render its first page. Resets all capture state.
    #[wasm_bindgen(js_name = loadDocument)]
    pub async fn load_document(&self, bytes: Vec<u8>) -> Result<u32, JsValue> {
        let seq = {
            let mut st = self.state.borrow_mut();
            if st.busy {
                return Err(JsValue::from_str("A document operation is already running"));
            }
            st.busy = true;
            st.wizard = None;
            st.guided = false;
            st.ocr_busy = false;
            st.pages.clear();
            st.wheel.reset();
            st.request_seq += 1;
            st.current_page = 1;
            st.request_seq
        };
        self.armed.set(false);
        self.overlay.cancel();

        // Take the rasterizer out of its cell so the load await holds no
        // borrow; accessors and close() stay callable while it runs.
        let mut rasterizer = self.rasterizer.replace(PageRasterizer::new());
        rasterizer.unload();
        let loaded = rasterizer.load(&bytes).await;

        // close() ran while the load was in flight.
        if self.state.borrow().request_seq != seq {
            self.state.borrow_mut().busy = false;
            return Err(JsValue::from_str("Session closed during load"));
        }

        let result = match loaded {
            Ok(count) => {
                self.rasterizer.replace(rasterizer);
                self.render_page_internal(1).await.map(|_| count)
            }
            Err(e) => Err(e),
        };
        self.state.borrow_mut().busy = false;
        result
    }

    /// Scan the host form and build the field plan. Returns the plan as a
    /// JS array of field descriptors for chrome rendering.
    #[wasm_bindgen(js_name = buildPlan)]
    pub fn build_plan(&self) -> Result<JsValue, JsValue> {
        let document = self.document()?;
        let controls = form::scan_controls(&document)?;
        let plan = formscan_core::build_plan(&controls);
        let js_plan = serde_wasm_bindgen::to_value(&plan)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.state.borrow_mut().wizard = Some(Wizard::new(plan));
        Ok(js_plan)
    }

    /// Enter the guided wizard, arming capture for the first field.
    #[wasm_bindgen(js_name = beginGuided)]
    pub fn begin_guided(&self) -> Result<(), JsValue> {
        {
            let mut st = self.state.borrow_mut();
            if st.wizard.is_none() {
                return Err(JsValue::from_str("No field plan; call buildPlan first"));
            }
            st.guided = true;
        }
        self.arm_current_field(false)
    }

    /// Pointer down on the overlay.
    #[wasm_bindgen(js_name = onDragStart)]
    pub fn on_drag_start(&self, client_x: f64, client_y: f64) {
        if !self.armed.get() {
            return;
        }
        {
            let mut st = self.state.borrow_mut();
            if st.busy || st.ocr_busy {
                return;
            }
            if st.guided {
                let pending = st
                    .wizard
                    .as_ref()
                    .map(|w| w.phase() == WizardPhase::OcrPending)
                    .unwrap_or(true);
                if pending {
                    return;
                }
            }
            // The pointer reached the overlay; keep the focus-mode target.
            if let Some(handle) = st.blur_timer.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
            }
        }
        let bounds = self.overlay.canvas().get_bounding_client_rect();
        self.overlay
            .begin(client_x - bounds.left(), client_y - bounds.top());
    }

    /// Pointer move while dragging.
    #[wasm_bindgen(js_name = onDragMove)]
    pub fn on_drag_move(&self, client_x: f64, client_y: f64) {
        if !self.overlay.is_selecting() {
            return;
        }
        let bounds = self.overlay.canvas().get_bounding_client_rect();
        self.overlay
            .update(client_x - bounds.left(), client_y - bounds.top());
    }

    /// Pointer up: crop, compress, OCR, normalize. In guided mode the
    /// normalized text is staged for confirmation and returned; in focus
    /// mode it is written straight into the focused control. Degenerate
    /// drags resolve to `null` with no side effect.
    #[wasm_bindgen(js_name = onDragEnd)]
    pub async fn on_drag_end(&self) -> Result<JsValue, JsValue> {
        let rect = match self.overlay.finish() {
            Some(r) => r,
            None => return Ok(JsValue::NULL),
        };
        if rect.is_degenerate() {
            return Ok(JsValue::NULL);
        }

        let guided = self.state.borrow().guided;
        let (kind, focus_target) = match self.submit_selection(guided) {
            Ok(resolved) => resolved,
            Err(notice) => {
                if let Some((level, title, message)) = notice {
                    notify::show_notice(level, title, &message);
                }
                return Ok(JsValue::NULL);
            }
        };

        let display = self.overlay.canvas().get_bounding_client_rect();
        let raster_dims = {
            let st = self.state.borrow();
            st.pages
                .get(st.current_page)
                .map(|p| (p.raster_width as f64, p.raster_height as f64))
        };
        let (raster_w, raster_h) = match raster_dims {
            Some(dims) => dims,
            None => {
                self.fail_capture(guided, NoticeLevel::Error, "No page", "No rendered page to capture from.");
                return Ok(JsValue::NULL);
            }
        };
        let raster = rect.to_raster(display.width(), display.height(), raster_w, raster_h);

        if validate_crop(&raster).is_err() {
            self.fail_capture(
                guided,
                NoticeLevel::Warning,
                "Selection too small",
                "Drag a larger box around the text.",
            );
            return Ok(JsValue::NULL);
        }

        let seq = {
            let mut st = self.state.borrow_mut();
            st.request_seq += 1;
            st.request_seq
        };

        let blob = match pipeline::extract_region(&self.page_canvas, &raster).await {
            Ok(b) => b,
            Err(e) => {
                self.fail_capture(guided, NoticeLevel::Error, "Capture failed", &js_error(&e));
                return Ok(JsValue::NULL);
            }
        };

        let response = match self.ocr.recognize(&blob).await {
            Ok(r) => r,
            Err(e) => {
                self.fail_capture(guided, NoticeLevel::Error, "OCR failed", &js_error(&e));
                return Ok(JsValue::NULL);
            }
        };

        let text = match interpret(&response) {
            Ok(t) => t,
            Err(FormScanError::OcrNoTextFound) => {
                self.fail_capture(
                    guided,
                    NoticeLevel::Warning,
                    "No text found",
                    "Try a tighter selection around the text.",
                );
                return Ok(JsValue::NULL);
            }
            Err(e) => {
                self.fail_capture(guided, NoticeLevel::Error, "OCR failed", &e.to_string());
                return Ok(JsValue::NULL);
            }
        };

        // The document or page changed while the request was in flight.
        if self.state.borrow().request_seq != seq {
            self.discard_stale(guided);
            return Ok(JsValue::NULL);
        }

        let normalized = normalize(&text, kind);

        if guided {
            let mut st = self.state.borrow_mut();
            let wizard = st
                .wizard
                .as_mut()
                .ok_or_else(|| JsValue::from_str("Plan discarded mid-capture"))?;
            wizard
                .ocr_succeeded(normalized.clone())
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
        } else {
            self.state.borrow_mut().ocr_busy = false;
            if let Some(target) = focus_target {
                let field = FieldSpec {
                    name: target.name.clone(),
                    label: String::new(),
                    form_field_name: target.name,
                    control: target.control,
                    kind: target.kind,
                };
                let document = self.document()?;
                // The target input left the view mid-request: discard the
                // text silently, log only.
                if let Err(e) = form::commit_value(&document, &field, &normalized) {
                    web_sys::console::warn_1(&JsValue::from_str(&format!(
                        "Discarding OCR text for '{}': {}",
                        field.form_field_name,
                        js_error(&e)
                    )));
                }
            }
        }

        Ok(JsValue::from_str(&normalized))
    }

    /// Commit the staged text to the current field and arm the next one.
    /// Returns true when the committed field was the last in the plan.
    #[wasm_bindgen(js_name = confirmCurrentField)]
    pub fn confirm_current_field(&self) -> Result<bool, JsValue> {
        let commit = {
            let mut st = self.state.borrow_mut();
            let wizard = st
                .wizard
                .as_mut()
                .ok_or_else(|| JsValue::from_str("No field plan"))?;
            wizard
                .confirm()
                .map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let document = self.document()?;
        if let Err(e) = form::commit_value(&document, &commit.field, &commit.text) {
            notify::show_notice(NoticeLevel::Error, "Field not filled", &js_error(&e));
        }
        notify::switch_tab(FORM_TAB);

        self.arm_current_field(!commit.completed)?;
        Ok(commit.completed)
    }

    /// A form input gained focus outside guided mode: arm capture for it.
    #[wasm_bindgen(js_name = onFocus)]
    pub fn on_focus(&self, control_name: String) {
        if self.state.borrow().guided {
            return;
        }
        if let Some(handle) = self.state.borrow_mut().blur_timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
        *self.focused.borrow_mut() = Some(control_name);
        self.armed.set(true);
    }

    /// The focused input blurred: disarm after the grace window unless
    /// focus comes back or a drag starts first.
    #[wasm_bindgen(js_name = onBlur)]
    pub fn on_blur(&self) {
        if self.state.borrow().guided {
            return;
        }
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let focused = Rc::clone(&self.focused);
        let armed = Rc::clone(&self.armed);
        let callback = Closure::once_into_js(move || {
            *focused.borrow_mut() = None;
            armed.set(false);
        });
        if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            BLUR_GRACE_MS,
        ) {
            self.state.borrow_mut().blur_timer = Some(handle);
        }
    }

    /// Wheel input over the viewer. Deltas accumulate; a page flips once
    /// the threshold is crossed. Ignored mid-drag.
    #[wasm_bindgen(js_name = onWheel)]
    pub async fn on_wheel(&self, delta_y: f64) -> Result<(), JsValue> {
        if self.overlay.is_selecting() {
            return Ok(());
        }
        let step = {
            let mut st = self.state.borrow_mut();
            if st.busy {
                return Ok(());
            }
            st.wheel.feed(delta_y)
        };
        if let Some(step) = step {
            let current = self.state.borrow().current_page;
            let total = self.rasterizer.borrow().page_count();
            if let Some(target) = step_page(current, total, step) {
                self.goto_page(target).await?;
            }
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub async fn next_page(&self) -> Result<u32, JsValue> {
        self.step(PageStep::Next).await
    }

    #[wasm_bindgen(js_name = prevPage)]
    pub async fn prev_page(&self) -> Result<u32, JsValue> {
        self.step(PageStep::Prev).await
    }

    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> u32 {
        self.state.borrow().current_page
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.rasterizer.borrow().page_count()
    }

    #[wasm_bindgen(js_name = isArmed)]
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    #[wasm_bindgen(js_name = isGuidedActive)]
    pub fn is_guided_active(&self) -> bool {
        self.state.borrow().guided
    }

    /// Wizard phase as a string for chrome state ("idle",
    /// "awaiting-selection", "ocr-pending", "awaiting-confirmation",
    /// "complete").
    pub fn phase(&self) -> String {
        let phase = self
            .state
            .borrow()
            .wizard
            .as_ref()
            .map(|w| w.phase())
            .unwrap_or(WizardPhase::Idle);
        match phase {
            WizardPhase::Idle => "idle",
            WizardPhase::AwaitingSelection => "awaiting-selection",
            WizardPhase::OcrPending => "ocr-pending",
            WizardPhase::AwaitingConfirmation => "awaiting-confirmation",
            WizardPhase::Complete => "complete",
        }
        .to_string()
    }

    /// Tear down timers, animation, and the loaded document.
    pub fn close(&self) {
        {
            let mut st = self.state.borrow_mut();
            if let Some(window) = web_sys::window() {
                if let Some(handle) = st.arm_timer.take() {
                    window.clear_timeout_with_handle(handle);
                }
                if let Some(handle) = st.blur_timer.take() {
                    window.clear_timeout_with_handle(handle);
                }
            }
            st.wizard = None;
            st.guided = false;
            st.ocr_busy = false;
            st.pages.clear();
            st.wheel.reset();
            st.request_seq += 1;
        }
        self.armed.set(false);
        *self.focused.borrow_mut() = None;
        self.overlay.cancel();
        self.rasterizer.borrow_mut().unload();
    }
}

impl FormScanSession {
    fn document(&self) -> Result<Document, JsValue> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document object"))
    }

    /// Record the selection submission against the active target, resolving
    /// the normalization kind. Returns an optional notice on rejection.
    #[allow(clippy::type_complexity)]
    fn submit_selection(
        &self,
        guided: bool,
    ) -> Result<(FieldKind, Option<FocusTarget>), Option<(NoticeLevel, &'static str, String)>>
    {
        if guided {
            let mut st = self.state.borrow_mut();
            let wizard = st.wizard.as_mut().ok_or(None)?;
            match wizard.selection_submitted() {
                Ok(()) => {
                    let kind = wizard
                        .current_field()
                        .map(|f| f.kind)
                        .unwrap_or(FieldKind::SingleLine);
                    Ok((kind, None))
                }
                Err(FormScanError::OcrAlreadyPending) => Err(Some((
                    NoticeLevel::Warning,
                    "OCR in progress",
                    "Wait for the current selection to finish.".to_string(),
                ))),
                Err(e) => Err(Some((
                    NoticeLevel::Error,
                    "Capture unavailable",
                    e.to_string(),
                ))),
            }
        } else {
            let name = match self.focused.borrow().clone() {
                Some(n) => n,
                None => return Err(None),
            };
            {
                let mut st = self.state.borrow_mut();
                if st.ocr_busy {
                    return Err(Some((
                        NoticeLevel::Warning,
                        "OCR in progress",
                        "Wait for the current selection to finish.".to_string(),
                    )));
                }
                st.ocr_busy = true;
            }
            let control = self
                .document()
                .ok()
                .and_then(|d| form::find_control(&d, &name))
                .map(|el| ControlType::from_tag(&el.tag_name()))
                .unwrap_or(ControlType::Input);
            let kind = FieldKind::classify(&name, control);
            Ok((
                kind,
                Some(FocusTarget {
                    name,
                    control,
                    kind,
                }),
            ))
        }
    }

    /// Surface a capture failure and return the session to a selectable
    /// state for the same target.
    fn fail_capture(&self, guided: bool, level: NoticeLevel, title: &str, message: &str) {
        notify::show_notice(level, title, message);
        if guided {
            let label = {
                let mut st = self.state.borrow_mut();
                st.wizard
                    .as_mut()
                    .and_then(|w| w.ocr_failed().ok().map(|f| f.label.clone()))
            };
            if let Some(label) = label {
                if let Ok(document) = self.document() {
                    form::set_capture_prompt(&document, &label);
                }
            }
        } else {
            self.state.borrow_mut().ocr_busy = false;
        }
    }

    /// Drop an OCR result that arrived after a document or page change.
    fn discard_stale(&self, guided: bool) {
        let mut st = self.state.borrow_mut();
        if guided {
            if let Some(wizard) = st.wizard.as_mut() {
                let _ = wizard.ocr_failed();
            }
        } else {
            st.ocr_busy = false;
        }
    }

    /// Arm capture for the wizard's current field, or finish the session
    /// when the plan is exhausted. With `return_to_capture`, the settle
    /// timer also switches the view back from the form tab before arming.
    fn arm_current_field(&self, return_to_capture: bool) -> Result<(), JsValue> {
        let document = self.document()?;
        let next_label = {
            let mut st = self.state.borrow_mut();
            let wizard = st
                .wizard
                .as_mut()
                .ok_or_else(|| JsValue::from_str("No field plan"))?;
            match wizard.start_capture() {
                Ok(Some(field)) => Some(field.label.clone()),
                Ok(None) | Err(FormScanError::WizardComplete) => {
                    st.guided = false;
                    None
                }
                Err(e) => return Err(JsValue::from_str(&e.to_string())),
            }
        };

        match next_label {
            Some(label) => {
                form::set_capture_prompt(&document, &label);
                self.arm_after_settle(return_to_capture)
            }
            None => {
                self.armed.set(false);
                form::set_capture_prompt(&document, "");
                notify::show_notice(
                    NoticeLevel::Success,
                    "All fields filled",
                    "Review the form and submit when ready.",
                );
                Ok(())
            }
        }
    }

    /// Disarm, then re-arm once the settle delay elapses, optionally
    /// returning the view to the capture tab first.
    fn arm_after_settle(&self, return_to_capture: bool) -> Result<(), JsValue> {
        self.armed.set(false);
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        if let Some(handle) = self.state.borrow_mut().arm_timer.take() {
            window.clear_timeout_with_handle(handle);
        }

        let armed = Rc::clone(&self.armed);
        let callback = Closure::once_into_js(move || {
            if return_to_capture {
                notify::switch_tab(CAPTURE_TAB);
            }
            armed.set(true);
        });
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            TAB_SWITCH_SETTLE_MS,
        )?;
        self.state.borrow_mut().arm_timer = Some(handle);
        Ok(())
    }

    async fn step(&self, step: PageStep) -> Result<u32, JsValue> {
        let current = self.state.borrow().current_page;
        let total = self.rasterizer.borrow().page_count();
        if let Some(target) = step_page(current, total, step) {
            self.goto_page(target).await?;
        }
        Ok(self.state.borrow().current_page)
    }

    /// Render a page, cancelling any drag and invalidating in-flight OCR.
    async fn goto_page(&self, page: u32) -> Result<(), JsValue> {
        {
            let mut st = self.state.borrow_mut();
            if st.busy {
                return Ok(());
            }
            st.busy = true;
            st.wheel.reset();
            st.request_seq += 1;
        }
        self.overlay.cancel();

        let result = self.render_page_internal(page).await;
        self.state.borrow_mut().busy = false;
        result.map(|_| ())
    }

    async fn render_page_internal(&self, page: u32) -> Result<(), JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let scale = capture_scale(window.device_pixel_ratio());

        // Clone the document handle so no rasterizer borrow spans the
        // render await.
        let (doc, total, seq) = {
            let rasterizer = self.rasterizer.borrow();
            let st = self.state.borrow();
            (
                rasterizer.document_handle(),
                rasterizer.page_count(),
                st.request_seq,
            )
        };
        let doc = doc.ok_or_else(|| JsValue::from_str("No document loaded"))?;

        let render_state =
            viewer::render_page(&doc, total, page, &self.page_canvas, scale).await?;

        // close() ran while the render was in flight.
        if self.state.borrow().request_seq != seq {
            return Ok(());
        }

        let bounds = self.page_canvas.get_bounding_client_rect();
        self.overlay.resize(
            bounds.width().round() as u32,
            bounds.height().round() as u32,
        );

        let mut st = self.state.borrow_mut();
        st.pages.record(render_state);
        st.current_page = page;
        Ok(())
    }
}

fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

// Browser-only tests: the session needs real canvases.
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount_canvases() {
        let document = web_sys::window().unwrap().document().unwrap();
        document.body().unwrap().set_inner_html(
            r#"<canvas id="page"></canvas><canvas id="ovl"></canvas>"#,
        );
    }

    fn session() -> FormScanSession {
        mount_canvases();
        FormScanSession::new("page", "ovl", "https://ocr.example/parse".to_string(), None)
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_missing_canvas_declines_to_initialize() {
        mount_canvases();
        assert!(FormScanSession::new(
            "nope",
            "ovl",
            "https://ocr.example/parse".to_string(),
            None
        )
        .is_err());
    }

    #[wasm_bindgen_test]
    fn test_initial_state() {
        let session = session();
        assert_eq!(session.page_count(), 0);
        assert!(!session.is_armed());
        assert!(!session.is_guided_active());
        assert_eq!(session.phase(), "idle");
    }

    #[wasm_bindgen_test]
    fn test_begin_guided_requires_plan() {
        let session = session();
        assert!(session.begin_guided().is_err());
    }

    #[wasm_bindgen_test]
    fn test_drag_ignored_while_disarmed() {
        let session = session();
        session.on_drag_start(10.0, 10.0);
        session.on_drag_move(50.0, 50.0);
        assert!(!session.overlay.is_selecting());
    }

    #[wasm_bindgen_test]
    fn test_focus_arms_and_close_disarms() {
        let session = session();
        session.on_focus("ownerName".to_string());
        assert!(session.is_armed());
        session.close();
        assert!(!session.is_armed());
    }

    #[wasm_bindgen_test]
    async fn test_accessors_safe_while_load_runs() {
        let session = std::rc::Rc::new(session());
        let loader = std::rc::Rc::clone(&session);
        wasm_bindgen_futures::spawn_local(async move {
            // Fails (no pdf.js in the test page) but exercises the load
            // path concurrently with the accessor calls below.
            let _ = loader.load_document(vec![0u8; 16]).await;
        });

        assert_eq!(session.page_count(), 0);
        session.close();
        assert_eq!(session.page_count(), 0);
        assert_eq!(session.phase(), "idle");
    }

    #[wasm_bindgen_test]
    fn test_empty_plan_completes_immediately() {
        let session = session();
        // No [data-scrape] controls in the DOM
        session.build_plan().unwrap();
        session.begin_guided().unwrap();
        assert_eq!(session.phase(), "complete");
        assert!(!session.is_guided_active());
    }
}
