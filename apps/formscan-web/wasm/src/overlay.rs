//! Selection overlay rendering.
//!
//! Draws the live drag rectangle as a marching-ants dashed border on a
//! transparent canvas layered over the rendered page. The redraw loop runs
//! on `requestAnimationFrame` for the duration of the drag only, advancing
//! the dash phase each frame, and is cancelled whenever selection stops so
//! no orphaned loops survive a page change or teardown.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use formscan_core::SelectionRect;

/// Dash pattern: 10 on, 5 off, 3px stroke.
const DASH_ON: f64 = 10.0;
const DASH_OFF: f64 = 5.0;
const STROKE_WIDTH: f64 = 3.0;
/// Dash phase advance per frame, wrapping at the pattern period.
const DASH_ADVANCE: f64 = 2.0;
const DASH_PERIOD: f64 = DASH_ON + DASH_OFF;

const STROKE_COLOR: &str = "#2563eb";
const FILL_COLOR: &str = "rgba(37, 99, 235, 0.15)";

#[derive(Debug, Default)]
struct OverlayState {
    rect: Option<SelectionRect>,
    selecting: bool,
    dash_offset: f64,
    raf_handle: Option<i32>,
}

/// Owns the overlay canvas and the in-progress selection rectangle.
///
/// Clones share state, so the animation closure and the session can both
/// observe and stop the same drag. A single frame closure is built at
/// construction and reused for every drag, so repeated selections allocate
/// nothing new.
#[derive(Clone)]
pub struct SelectionOverlay {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    state: Rc<RefCell<OverlayState>>,
    frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl SelectionOverlay {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("No 2d context on overlay canvas"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let state = Rc::new(RefCell::new(OverlayState::default()));
        let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

        {
            let state = Rc::clone(&state);
            let ctx = ctx.clone();
            let canvas = canvas.clone();
            let frame_in_closure = Rc::clone(&frame);
            *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                let mut st = state.borrow_mut();
                if !st.selecting {
                    st.raf_handle = None;
                    return;
                }
                draw_frame(&ctx, &canvas, &st);
                st.dash_offset = (st.dash_offset + DASH_ADVANCE) % DASH_PERIOD;

                if let Some(window) = web_sys::window() {
                    if let Some(cb) = frame_in_closure.borrow().as_ref() {
                        if let Ok(handle) =
                            window.request_animation_frame(cb.as_ref().unchecked_ref())
                        {
                            st.raf_handle = Some(handle);
                        }
                    }
                }
            }) as Box<dyn FnMut()>));
        }

        Ok(Self {
            canvas,
            ctx,
            state,
            frame,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the overlay surface to the displayed page size. Display-space
    /// drag coordinates then map 1:1 onto overlay canvas pixels.
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    pub fn is_selecting(&self) -> bool {
        self.state.borrow().selecting
    }

    /// Current drag rectangle, if a selection is in progress.
    pub fn current_rect(&self) -> Option<SelectionRect> {
        self.state.borrow().rect
    }

    /// Start a drag at overlay-relative display coordinates.
    pub fn begin(&self, x: f64, y: f64) {
        {
            let mut state = self.state.borrow_mut();
            state.rect = Some(SelectionRect::new(x, y));
            state.selecting = true;
            state.dash_offset = 0.0;
        }
        self.start_animation();
    }

    /// Extend the drag to new display coordinates.
    pub fn update(&self, x: f64, y: f64) {
        let mut state = self.state.borrow_mut();
        if !state.selecting {
            return;
        }
        if let Some(rect) = state.rect.as_mut() {
            rect.end_x = x;
            rect.end_y = y;
        }
    }

    /// End the drag: stop the animation, clear the surface, and hand the
    /// final rectangle to the caller.
    pub fn finish(&self) -> Option<SelectionRect> {
        let rect = {
            let mut state = self.state.borrow_mut();
            if !state.selecting {
                return None;
            }
            state.selecting = false;
            self.cancel_frame(&mut state);
            state.rect.take()
        };
        self.clear();
        rect
    }

    /// Abandon any in-progress drag (blur, page change, teardown).
    pub fn cancel(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.selecting = false;
            state.rect = None;
            self.cancel_frame(&mut state);
        }
        self.clear();
    }

    fn clear(&self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn cancel_frame(&self, state: &mut OverlayState) {
        if let Some(handle) = state.raf_handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    fn start_animation(&self) {
        if let Some(window) = web_sys::window() {
            if let Some(cb) = self.frame.borrow().as_ref() {
                if let Ok(handle) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    self.state.borrow_mut().raf_handle = Some(handle);
                }
            }
        }
    }
}

/// One frame of the marching-ants rectangle.
fn draw_frame(ctx: &CanvasRenderingContext2d, canvas: &HtmlCanvasElement, state: &OverlayState) {
    ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);

    let rect = match state.rect {
        Some(r) => r,
        None => return,
    };
    let (x, y, w, h) = rect.normalized();

    let dash = Array::new();
    dash.push(&JsValue::from_f64(DASH_ON));
    dash.push(&JsValue::from_f64(DASH_OFF));
    let _ = ctx.set_line_dash(&dash);
    ctx.set_line_dash_offset(-state.dash_offset);
    ctx.set_line_width(STROKE_WIDTH);
    ctx.set_stroke_style_str(STROKE_COLOR);
    ctx.stroke_rect(x, y, w, h);

    ctx.set_fill_style_str(FILL_COLOR);
    ctx.fill_rect(x, y, w, h);
}
