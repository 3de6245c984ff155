//! Field plan builder.
//!
//! Inspects the scrape-eligible controls of the host form (described
//! host-agnostically as `ScrapedControl`s) and produces the ordered,
//! deduplicated list of fields the wizard will fill. The address control,
//! when present, is always pinned to index 0 regardless of markup order.

use serde::{Deserialize, Serialize};

use crate::fields::{ControlType, FieldKind, FieldSpec};

/// Host-agnostic description of one scrape-eligible form control,
/// produced by the DOM adapter's single scan of the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedControl {
    pub name: Option<String>,
    pub id: Option<String>,
    pub tag: String,
    /// Text of the associated `<label for>` element, if any.
    pub label_text: Option<String>,
}

impl ScrapedControl {
    /// Field identifier: name attribute, falling back to element id.
    fn identifier(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Build the field plan for a document session.
///
/// Controls without an identifier are skipped; duplicates keep the first
/// occurrence. An empty form yields an empty plan (and an immediately
/// terminal wizard), not an error.
pub fn build_plan(controls: &[ScrapedControl]) -> Vec<FieldSpec> {
    let mut address: Option<FieldSpec> = None;
    let mut rest: Vec<FieldSpec> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for control in controls {
        let identifier = match control.identifier() {
            Some(id) => id.to_string(),
            None => continue,
        };
        if seen.iter().any(|s| s == &identifier) {
            continue;
        }
        seen.push(identifier.clone());

        let control_type = ControlType::from_tag(&control.tag);
        let kind = FieldKind::classify(&identifier, control_type);

        if kind == FieldKind::Address {
            if address.is_none() {
                address = Some(FieldSpec {
                    name: "address".to_string(),
                    label: "Select Address".to_string(),
                    form_field_name: identifier,
                    control: control_type,
                    kind: FieldKind::Address,
                });
            }
            continue;
        }

        let label = derive_label(&identifier, control.label_text.as_deref());
        rest.push(FieldSpec {
            name: identifier.clone(),
            label,
            form_field_name: identifier,
            control: control_type,
            kind,
        });
    }

    let mut plan = Vec::with_capacity(rest.len() + 1);
    if let Some(addr) = address {
        plan.push(addr);
    }
    plan.extend(rest);
    plan
}

/// Derive the "Select <label>" capture prompt for a field.
///
/// Prefers the associated label element's text with trailing required-marker
/// glyphs stripped; falls back to splitting the camel-case identifier.
fn derive_label(identifier: &str, label_text: Option<&str>) -> String {
    let base = match label_text.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => strip_required_markers(text),
        None => split_camel_case(identifier),
    };
    format!("Select {}", base)
}

/// Strip trailing required-marker glyphs ("*", ":") and whitespace.
fn strip_required_markers(text: &str) -> String {
    text.trim_end_matches(|c: char| c == '*' || c == ':' || c.is_whitespace())
        .to_string()
}

/// "projectName" -> "Project Name"
fn split_camel_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else if c == '_' || c == '-' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}
