//! User-facing notices and host-page navigation hooks.
//!
//! The host page may provide `window.showNotice(level, title, message)` and
//! `window.switchTab(name)`. Both hooks are optional: notices fall back to
//! the console, tab switching degrades to a no-op so the session keeps
//! working on single-view pages.

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Severity of a user-facing notice.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

fn host_hook(name: &str) -> Option<js_sys::Function> {
    let window = web_sys::window()?;
    Reflect::get(&window, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

/// Show a notice to the user, preferring the host page's banner hook.
pub fn show_notice(level: NoticeLevel, title: &str, message: &str) {
    if let Some(hook) = host_hook("showNotice") {
        let ok = hook
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(level.as_str()),
                &JsValue::from_str(title),
                &JsValue::from_str(message),
            )
            .is_ok();
        if ok {
            return;
        }
    }

    let line = format!("[{}] {}: {}", level.as_str(), title, message);
    match level {
        NoticeLevel::Error => web_sys::console::error_1(&JsValue::from_str(&line)),
        NoticeLevel::Warning => web_sys::console::warn_1(&JsValue::from_str(&line)),
        _ => web_sys::console::log_1(&JsValue::from_str(&line)),
    }
}

/// Ask the host page to switch to a named tab. Silently a no-op when the
/// page has no tabs.
pub fn switch_tab(name: &str) {
    if let Some(hook) = host_hook("switchTab") {
        let _ = hook.call1(&JsValue::NULL, &JsValue::from_str(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_labels() {
        assert_eq!(NoticeLevel::Info.as_str(), "info");
        assert_eq!(NoticeLevel::Error.as_str(), "error");
    }
}

// Browser-only tests: hooks are window globals.
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_switch_tab_calls_host_hook() {
        let window = web_sys::window().unwrap();
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in_hook = Rc::clone(&seen);
        let hook = Closure::<dyn FnMut(JsValue)>::new(move |name: JsValue| {
            seen_in_hook
                .borrow_mut()
                .push(name.as_string().unwrap_or_default());
        });
        Reflect::set(&window, &JsValue::from_str("switchTab"), hook.as_ref()).unwrap();

        switch_tab("form");
        switch_tab("capture");
        assert_eq!(*seen.borrow(), vec!["form".to_string(), "capture".to_string()]);

        Reflect::set(&window, &JsValue::from_str("switchTab"), &JsValue::UNDEFINED).unwrap();
        drop(hook);
    }

    #[wasm_bindgen_test]
    fn test_switch_tab_without_hook_is_noop() {
        switch_tab("anywhere");
    }
}
