//! Field descriptors for the capture wizard.
//!
//! A `FieldSpec` is built once per document session by the plan builder and
//! is immutable afterwards. The semantic `FieldKind` is assigned here, at
//! plan-build time, so the normalizer can dispatch on an enum instead of
//! re-scanning identifier substrings on every commit.

use serde::{Deserialize, Serialize};

/// Tag of the host form control backing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    Input,
    Textarea,
    Select,
}

impl ControlType {
    /// Parse a control type from an element tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "textarea" => ControlType::Textarea,
            "select" => ControlType::Select,
            _ => ControlType::Input,
        }
    }
}

/// Semantic category of a field, used to pick the normalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free-text paragraph target (descriptions, notes, scopes of work).
    Paragraph,
    Email,
    Phone,
    Date,
    Numeric,
    Address,
    /// Single-line control with no recognized semantic.
    SingleLine,
    /// Multi-line control with no recognized semantic.
    MultiLine,
}

/// Identifier substrings that mark a paragraph-style target.
const PARAGRAPH_KEYS: &[&str] = &["description", "notes", "comments", "details", "scope"];

/// Identifier substrings that mark a date target.
const DATE_KEYS: &[&str] = &["date", "commencement", "completion"];

/// Identifier substrings that mark a numeric target.
const NUMERIC_KEYS: &[&str] = &["numeric", "sqft", "squarefootage", "square_footage", "footage"];

impl FieldKind {
    /// Classify a field from its identifier and control type.
    ///
    /// Matching is case-insensitive on identifier substrings; the first
    /// matching category wins, in the order listed here.
    pub fn classify(identifier: &str, control: ControlType) -> Self {
        let id = identifier.to_lowercase();

        if PARAGRAPH_KEYS.iter().any(|k| id.contains(k)) {
            FieldKind::Paragraph
        } else if id.contains("email") {
            FieldKind::Email
        } else if id.contains("phone") || id.contains("tel") {
            FieldKind::Phone
        } else if DATE_KEYS.iter().any(|k| id.contains(k)) {
            FieldKind::Date
        } else if NUMERIC_KEYS.iter().any(|k| id.contains(k)) {
            FieldKind::Numeric
        } else if id.contains("address") {
            FieldKind::Address
        } else if control == ControlType::Textarea {
            FieldKind::MultiLine
        } else {
            FieldKind::SingleLine
        }
    }
}

/// A single field the wizard will walk the user through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Logical name ("address" for the pinned pseudo-field, otherwise the identifier).
    pub name: String,
    /// Human label shown as the capture placeholder, e.g. "Select Project Name".
    pub label: String,
    /// Identity key: the host control's name attribute (or id fallback).
    pub form_field_name: String,
    /// Tag of the backing control.
    pub control: ControlType,
    /// Semantic category, assigned once at plan-build time.
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_address(&self) -> bool {
        self.kind == FieldKind::Address
    }
}
