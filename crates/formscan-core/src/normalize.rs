//! Field-aware text normalization.
//!
//! Raw OCR text is first run through the shouting-caps pass, then through a
//! pass specific to the field's `FieldKind`. Classification happened once at
//! plan-build time, so this module only dispatches on the enum.

use lazy_static::lazy_static;
use regex::Regex;

use crate::fields::FieldKind;

/// Minor words kept lower-case when re-capitalizing shouted text,
/// except in the first position.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by", "of", "in",
];

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref INLINE_SPACE_RE: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref BLANK_LINES_RE: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap();

    // Phone patterns, tried in order: generic US with optional country
    // code, plain 10 digits with separators, parenthesized area code.
    static ref PHONE_GENERIC_RE: Regex =
        Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap();
    static ref PHONE_PLAIN_RE: Regex = Regex::new(r"\d{3}[-.\s]\d{3}[-.\s]\d{4}").unwrap();
    static ref PHONE_PAREN_RE: Regex = Regex::new(r"\(\d{3}\)\s?\d{3}[-.\s]?\d{4}").unwrap();

    // Date patterns, tried in order: numeric D/M/Y, D Month Y,
    // Month D, Y, ISO-like Y-M-D.
    static ref DATE_NUMERIC_RE: Regex = Regex::new(r"\b\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\b").unwrap();
    static ref DATE_DMY_RE: Regex = Regex::new(
        r"(?i)\b\d{1,2}(?:st|nd|rd|th)?\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+\d{4}\b"
    ).unwrap();
    static ref DATE_MDY_RE: Regex = Regex::new(
        r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b"
    ).unwrap();
    static ref DATE_ISO_RE: Regex = Regex::new(r"\b\d{4}-\d{1,2}-\d{1,2}\b").unwrap();
}

/// Normalize OCR text for a field of the given kind.
pub fn normalize(text: &str, kind: FieldKind) -> String {
    let text = decap_shouting(text);
    match kind {
        FieldKind::Paragraph => normalize_paragraph(&text),
        FieldKind::Email => normalize_email(&text),
        FieldKind::Phone => normalize_phone(&text),
        FieldKind::Date => normalize_date(&text),
        FieldKind::Numeric => normalize_numeric(&text),
        FieldKind::Address | FieldKind::SingleLine => single_line(&text),
        FieldKind::MultiLine => text.trim().to_string(),
    }
}

/// Collapse all whitespace runs (including newlines) to single spaces.
fn single_line(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Detect shouted (mostly upper-case) text and re-capitalize it.
///
/// Triggers when upper-case letters exceed 80% of all letters. Minor words
/// stay lower-case unless they lead the text; line structure and spacing
/// are preserved so later passes can still see them.
fn decap_shouting(text: &str) -> String {
    let mut upper = 0usize;
    let mut letters = 0usize;
    for c in text.chars() {
        if c.is_alphabetic() {
            letters += 1;
            if c.is_uppercase() {
                upper += 1;
            }
        }
    }
    if letters == 0 || upper * 100 <= letters * 80 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    let mut word_index = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                out.push_str(&recase_word(&word, word_index));
                word_index += 1;
                word.clear();
            }
            out.push(c);
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        out.push_str(&recase_word(&word, word_index));
    }
    out
}

fn recase_word(word: &str, index: usize) -> String {
    let lower = word.to_lowercase();
    let bare: String = lower
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if index > 0 && MINOR_WORDS.contains(&bare.as_str()) {
        return lower;
    }
    capitalize_first_letter(&lower)
}

fn capitalize_first_letter(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut done = false;
    for c in word.chars() {
        if !done && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Paragraph targets: collapse intra-line space runs, trim each line,
/// collapse excess blank lines, trim overall.
fn normalize_paragraph(text: &str) -> String {
    let collapsed = text
        .lines()
        .map(|line| INLINE_SPACE_RE.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_LINES_RE
        .replace_all(&collapsed, "\n\n")
        .trim()
        .to_string()
}

fn normalize_email(text: &str) -> String {
    let line = single_line(text);
    if let Some(m) = EMAIL_RE.find(&line) {
        return m.as_str().to_string();
    }
    let stripped: String = line
        .chars()
        .filter(|c| c.is_alphanumeric() || "@._%+-".contains(*c))
        .collect();
    if stripped.contains('@') && stripped.contains('.') {
        return stripped;
    }
    line
}

fn normalize_phone(text: &str) -> String {
    let line = single_line(text);
    for re in [&*PHONE_GENERIC_RE, &*PHONE_PLAIN_RE, &*PHONE_PAREN_RE] {
        if let Some(m) = re.find(&line) {
            let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() == 10 {
                return format_nanp(&digits);
            }
            if digits.len() == 11 && digits.starts_with('1') {
                return format_nanp(&digits[1..]);
            }
            return m.as_str().trim().to_string();
        }
    }
    line
}

fn format_nanp(digits: &str) -> String {
    format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
}

fn normalize_date(text: &str) -> String {
    let line = single_line(text);
    for re in [&*DATE_NUMERIC_RE, &*DATE_DMY_RE, &*DATE_MDY_RE, &*DATE_ISO_RE] {
        if let Some(m) = re.find(&line) {
            return m.as_str().trim().to_string();
        }
    }
    line
}

fn normalize_numeric(text: &str) -> String {
    let line = single_line(text);
    let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        line
    } else {
        digits
    }
}
