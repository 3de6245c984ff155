//! OCR service response model and interpreter.
//!
//! Turns the raw service response (flat parsed text, optionally with a
//! per-line word overlay) into a best-effort line-structured string.

use serde::{Deserialize, Serialize};

use crate::error::FormScanError;

/// Top-level OCR service response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(rename = "IsErroredOnProcessing", default)]
    pub is_errored_on_processing: bool,
    #[serde(rename = "ErrorMessage", default)]
    pub error_message: Option<String>,
    #[serde(rename = "ParsedResults", default)]
    pub parsed_results: Vec<ParsedResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    pub parsed_text: String,
    #[serde(rename = "WordsOverlay", default)]
    pub words_overlay: Option<WordsOverlay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordsOverlay {
    #[serde(rename = "Lines", default)]
    pub lines: Vec<OverlayLine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayLine {
    #[serde(rename = "Words", default)]
    pub words: Vec<OverlayWord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayWord {
    #[serde(rename = "WordText", default)]
    pub word_text: String,
}

/// Interpret a raw OCR response as line-structured text.
///
/// With overlay data, each line is rebuilt by joining its word texts with
/// single spaces; every line but the last gets a trailing space before the
/// newline join, preserving likely visual continuity for the normalizer's
/// later whitespace collapsing. Without overlay data, the flat parsed text
/// is used with each line trimmed.
pub fn interpret(response: &OcrResponse) -> Result<String, FormScanError> {
    if response.is_errored_on_processing {
        let message = response
            .error_message
            .clone()
            .unwrap_or_else(|| "OCR processing failed".to_string());
        return Err(FormScanError::OcrProcessing(message));
    }

    let result = response
        .parsed_results
        .first()
        .ok_or(FormScanError::OcrNoTextFound)?;

    if let Some(overlay) = &result.words_overlay {
        if !overlay.lines.is_empty() {
            return Ok(join_overlay_lines(&overlay.lines));
        }
    }

    let flat = result
        .parsed_text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    if flat.trim().is_empty() {
        return Err(FormScanError::OcrNoTextFound);
    }
    Ok(flat)
}

fn join_overlay_lines(lines: &[OverlayLine]) -> String {
    let rebuilt: Vec<String> = lines
        .iter()
        .map(|line| {
            line.words
                .iter()
                .map(|w| w.word_text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let last = rebuilt.len().saturating_sub(1);
    rebuilt
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i < last {
                format!("{} ", line)
            } else {
                line.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overlay_response(lines: &[&[&str]]) -> OcrResponse {
        OcrResponse {
            is_errored_on_processing: false,
            error_message: None,
            parsed_results: vec![ParsedResult {
                parsed_text: String::new(),
                words_overlay: Some(WordsOverlay {
                    lines: lines
                        .iter()
                        .map(|words| OverlayLine {
                            words: words
                                .iter()
                                .map(|w| OverlayWord {
                                    word_text: w.to_string(),
                                })
                                .collect(),
                        })
                        .collect(),
                }),
            }],
        }
    }

    #[test]
    fn test_error_flag_surfaces_service_message() {
        let response = OcrResponse {
            is_errored_on_processing: true,
            error_message: Some("image too blurry".to_string()),
            parsed_results: vec![],
        };
        assert_eq!(
            interpret(&response),
            Err(FormScanError::OcrProcessing("image too blurry".to_string()))
        );
    }

    #[test]
    fn test_no_parsed_results_is_no_text() {
        let response = OcrResponse::default();
        assert_eq!(interpret(&response), Err(FormScanError::OcrNoTextFound));
    }

    #[test]
    fn test_empty_parsed_text_is_no_text() {
        let response = OcrResponse {
            parsed_results: vec![ParsedResult::default()],
            ..Default::default()
        };
        assert_eq!(interpret(&response), Err(FormScanError::OcrNoTextFound));
    }

    #[test]
    fn test_overlay_lines_joined_with_trailing_spaces() {
        let response = overlay_response(&[&["123"], &["Main", "St"]]);
        assert_eq!(interpret(&response).unwrap(), "123 \nMain St");
    }

    #[test]
    fn test_overlay_three_lines() {
        let response = overlay_response(&[&["a", "b"], &["c"], &["d", "e", "f"]]);
        assert_eq!(interpret(&response).unwrap(), "a b \nc \nd e f");
    }

    #[test]
    fn test_flat_text_lines_trimmed() {
        let response = OcrResponse {
            parsed_results: vec![ParsedResult {
                parsed_text: "  hello \r\n  world  ".to_string(),
                words_overlay: None,
            }],
            ..Default::default()
        };
        assert_eq!(interpret(&response).unwrap(), "hello\nworld");
    }

    #[test]
    fn test_empty_overlay_falls_back_to_flat_text() {
        let response = OcrResponse {
            parsed_results: vec![ParsedResult {
                parsed_text: "fallback".to_string(),
                words_overlay: Some(WordsOverlay { lines: vec![] }),
            }],
            ..Default::default()
        };
        assert_eq!(interpret(&response).unwrap(), "fallback");
    }

    #[test]
    fn test_service_json_shape_parses() {
        let json = r#"{
            "IsErroredOnProcessing": false,
            "ParsedResults": [{
                "ParsedText": "123 Main St",
                "WordsOverlay": {
                    "Lines": [
                        {"Words": [{"WordText": "123"}]},
                        {"Words": [{"WordText": "Main"}, {"WordText": "St"}]}
                    ]
                }
            }]
        }"#;
        let response: OcrResponse = serde_json::from_str(json).unwrap();
        assert_eq!(interpret(&response).unwrap(), "123 \nMain St");
    }

    #[test]
    fn test_error_without_message_gets_default() {
        let response = OcrResponse {
            is_errored_on_processing: true,
            ..Default::default()
        };
        match interpret(&response) {
            Err(FormScanError::OcrProcessing(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected OcrProcessing, got {:?}", other),
        }
    }
}
