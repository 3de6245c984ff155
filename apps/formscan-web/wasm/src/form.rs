//! DOM adapter for the host form.
//!
//! The form is scanned exactly once per session into host-agnostic
//! `ScrapedControl`s; everything downstream (plan building, classification,
//! the wizard) runs in the core crate. Committing a value comes back through
//! here, which writes the control and dispatches synthetic bubbling `input`
//! and `change` events so host-page listeners observe the fill.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventInit, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use formscan_core::{ControlType, FieldSpec, ScrapedControl};

/// Controls opted in to guided capture.
const SCRAPE_SELECTOR: &str = "[data-scrape]";

/// Capture prompt element, shown as "Select <field label>".
const CAPTURE_PROMPT_SELECTOR: &str = "[data-capture-prompt]";

/// Hidden value carrier and visible mirror for the address pseudo-field.
const ADDRESS_VALUE_SELECTOR: &str = "[data-address-value]";
const ADDRESS_LABEL_SELECTOR: &str = "[data-address-label]";

/// Scan the host form's scrape-eligible controls.
///
/// Labels are resolved through `label[for]` only; wrapping labels are not
/// associated, matching the host form's markup.
pub fn scan_controls(document: &Document) -> Result<Vec<ScrapedControl>, JsValue> {
    let nodes = document.query_selector_all(SCRAPE_SELECTOR)?;
    let mut controls = Vec::with_capacity(nodes.length() as usize);

    for i in 0..nodes.length() {
        let node = match nodes.item(i) {
            Some(n) => n,
            None => continue,
        };
        let element: Element = match node.dyn_into() {
            Ok(e) => e,
            Err(_) => continue,
        };

        let id = Some(element.id()).filter(|s| !s.is_empty());
        let label_text = match &id {
            Some(id) => document
                .query_selector(&format!("label[for=\"{}\"]", id))?
                .and_then(|label| label.text_content()),
            None => None,
        };

        controls.push(ScrapedControl {
            name: element.get_attribute("name").filter(|s| !s.is_empty()),
            id,
            tag: element.tag_name(),
            label_text,
        });
    }

    Ok(controls)
}

/// Locate a field's backing control by name attribute, falling back to id.
pub fn find_control(document: &Document, form_field_name: &str) -> Option<Element> {
    if let Ok(Some(element)) =
        document.query_selector(&format!("[name=\"{}\"]", form_field_name))
    {
        return Some(element);
    }
    document.get_element_by_id(form_field_name)
}

/// Update the capture prompt shown above the document viewer.
pub fn set_capture_prompt(document: &Document, text: &str) {
    if let Ok(Some(prompt)) = document.query_selector(CAPTURE_PROMPT_SELECTOR) {
        prompt.set_text_content(Some(text));
    }
}

/// Write a confirmed value into the host form.
///
/// The address pseudo-field writes the hidden value carrier and its visible
/// mirror when the host page provides them; all other fields (and an address
/// page without the carriers) write the named control directly. Missing
/// targets are an error so the session can surface them instead of silently
/// dropping text.
pub fn commit_value(document: &Document, field: &FieldSpec, value: &str) -> Result<(), JsValue> {
    if field.is_address() {
        if let Ok(Some(carrier)) = document.query_selector(ADDRESS_VALUE_SELECTOR) {
            write_element_value(&carrier, ControlType::Input, value)?;
            if let Ok(Some(mirror)) = document.query_selector(ADDRESS_LABEL_SELECTOR) {
                mirror.set_text_content(Some(value));
            }
            dispatch_input_events(&carrier)?;
            return Ok(());
        }
    }

    let control = find_control(document, &field.form_field_name).ok_or_else(|| {
        JsValue::from_str(&format!(
            "No form control found for field '{}'",
            field.form_field_name
        ))
    })?;

    write_element_value(&control, field.control, value)?;
    dispatch_input_events(&control)
}

fn write_element_value(
    element: &Element,
    control: ControlType,
    value: &str,
) -> Result<(), JsValue> {
    match control {
        ControlType::Input => element
            .dyn_ref::<HtmlInputElement>()
            .ok_or_else(|| JsValue::from_str("Control is not an input element"))?
            .set_value(value),
        ControlType::Textarea => element
            .dyn_ref::<HtmlTextAreaElement>()
            .ok_or_else(|| JsValue::from_str("Control is not a textarea element"))?
            .set_value(value),
        ControlType::Select => element
            .dyn_ref::<HtmlSelectElement>()
            .ok_or_else(|| JsValue::from_str("Control is not a select element"))?
            .set_value(value),
    }
    Ok(())
}

/// Dispatch synthetic bubbling `input` and `change` events, in that order.
fn dispatch_input_events(element: &Element) -> Result<(), JsValue> {
    for event_type in ["input", "change"] {
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = Event::new_with_event_init_dict(event_type, &init)?;
        element.dispatch_event(&event)?;
    }
    Ok(())
}

// Browser-only tests: the adapter is pure DOM plumbing.
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use formscan_core::{build_plan, FieldKind};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document_with(html: &str) -> Document {
        let document = web_sys::window().unwrap().document().unwrap();
        document.body().unwrap().set_inner_html(html);
        document
    }

    #[wasm_bindgen_test]
    fn test_scan_collects_named_and_labeled_controls() {
        let document = document_with(
            r#"
            <label for="ownerName">Owner Name *</label>
            <input id="ownerName" name="ownerName" data-scrape>
            <textarea name="workDescription" data-scrape></textarea>
            <input name="ignored">
            "#,
        );

        let controls = scan_controls(&document).unwrap();
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].name.as_deref(), Some("ownerName"));
        assert_eq!(controls[0].label_text.as_deref(), Some("Owner Name *"));
        assert_eq!(controls[1].tag.to_lowercase(), "textarea");
    }

    #[wasm_bindgen_test]
    fn test_commit_writes_value_and_fires_events() {
        let document = document_with(r#"<input name="ownerName" data-scrape>"#);
        let plan = build_plan(&scan_controls(&document).unwrap());
        let field = &plan[0];

        let fired = std::rc::Rc::new(std::cell::Cell::new(0u32));
        let fired_in_listener = std::rc::Rc::clone(&fired);
        let listener = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            fired_in_listener.set(fired_in_listener.get() + 1);
        });
        let control = find_control(&document, "ownerName").unwrap();
        control
            .add_event_listener_with_callback("input", listener.as_ref().unchecked_ref())
            .unwrap();
        control
            .add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())
            .unwrap();

        commit_value(&document, field, "Jane Doe").unwrap();

        let input: HtmlInputElement = control.dyn_into().unwrap();
        assert_eq!(input.value(), "Jane Doe");
        assert_eq!(fired.get(), 2);
        drop(listener);
    }

    #[wasm_bindgen_test]
    fn test_address_commit_prefers_carrier_elements() {
        let document = document_with(
            r#"
            <input name="propertyAddress" data-scrape>
            <input type="hidden" data-address-value>
            <span data-address-label></span>
            "#,
        );
        let plan = build_plan(&scan_controls(&document).unwrap());
        let field = &plan[0];
        assert_eq!(field.kind, FieldKind::Address);

        commit_value(&document, field, "123 Main St").unwrap();

        let carrier: HtmlInputElement = document
            .query_selector("[data-address-value]")
            .unwrap()
            .unwrap()
            .dyn_into()
            .unwrap();
        assert_eq!(carrier.value(), "123 Main St");
        let mirror = document
            .query_selector("[data-address-label]")
            .unwrap()
            .unwrap();
        assert_eq!(mirror.text_content().as_deref(), Some("123 Main St"));
    }

    #[wasm_bindgen_test]
    fn test_commit_missing_control_errors() {
        let document = document_with(r#"<input name="ownerName" data-scrape>"#);
        let plan = build_plan(&scan_controls(&document).unwrap());
        let field = &plan[0];
        document.body().unwrap().set_inner_html("");
        assert!(commit_value(&document, field, "x").is_err());
    }

    #[wasm_bindgen_test]
    fn test_capture_prompt_updates() {
        let document = document_with(r#"<div data-capture-prompt></div>"#);
        set_capture_prompt(&document, "Select Owner Name");
        let prompt = document
            .query_selector("[data-capture-prompt]")
            .unwrap()
            .unwrap();
        assert_eq!(prompt.text_content().as_deref(), Some("Select Owner Name"));
    }
}
