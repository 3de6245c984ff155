//! Field-filling wizard state machine.
//!
//! Walks the field plan one field at a time. The session controller in the
//! web crate drives the transitions; everything here is pure state so the
//! full cycle is testable natively.

use serde::{Deserialize, Serialize};

use crate::error::FormScanError;
use crate::fields::FieldSpec;

/// Wizard lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardPhase {
    /// No field armed yet.
    Idle,
    /// The current field's capture box is armed and awaiting a drag.
    AwaitingSelection,
    /// An OCR request is outstanding for the current field.
    OcrPending,
    /// OCR text is staged; the confirm control is visible.
    AwaitingConfirmation,
    /// Every field in the plan has been committed.
    Complete,
}

/// Result of a confirmed commit.
#[derive(Debug, Clone)]
pub struct Commit {
    pub field: FieldSpec,
    pub text: String,
    /// True when this commit was the last field in the plan.
    pub completed: bool,
}

/// The wizard owns the field plan, the current index, and any staged text.
///
/// The index is monotonically non-decreasing and bounded by the plan length;
/// reaching the bound is the terminal state.
#[derive(Debug, Clone)]
pub struct Wizard {
    fields: Vec<FieldSpec>,
    index: usize,
    phase: WizardPhase,
    staged_text: Option<String>,
}

impl Wizard {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            index: 0,
            phase: WizardPhase::Idle,
            staged_text: None,
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_complete(&self) -> bool {
        self.phase == WizardPhase::Complete
    }

    pub fn staged_text(&self) -> Option<&str> {
        self.staged_text.as_deref()
    }

    /// The field currently being filled, if any.
    pub fn current_field(&self) -> Option<&FieldSpec> {
        if self.phase == WizardPhase::Complete {
            return None;
        }
        self.fields.get(self.index)
    }

    /// Enter capture for the current field, discarding any stale staged
    /// text. An empty plan goes straight to the terminal state.
    pub fn start_capture(&mut self) -> Result<Option<&FieldSpec>, FormScanError> {
        if self.phase == WizardPhase::Complete {
            return Err(FormScanError::WizardComplete);
        }
        if self.phase == WizardPhase::OcrPending {
            return Err(FormScanError::OcrAlreadyPending);
        }
        self.staged_text = None;
        if self.index >= self.fields.len() {
            self.phase = WizardPhase::Complete;
            return Ok(None);
        }
        self.phase = WizardPhase::AwaitingSelection;
        Ok(self.fields.get(self.index))
    }

    /// A completed, non-degenerate drag was handed to the pipeline.
    ///
    /// Allowed from `AwaitingSelection`, and from `AwaitingConfirmation`
    /// to let the user re-select and replace the staged text. A second
    /// submission while a request is outstanding is rejected.
    pub fn selection_submitted(&mut self) -> Result<(), FormScanError> {
        match self.phase {
            WizardPhase::AwaitingSelection | WizardPhase::AwaitingConfirmation => {
                self.staged_text = None;
                self.phase = WizardPhase::OcrPending;
                Ok(())
            }
            WizardPhase::OcrPending => Err(FormScanError::OcrAlreadyPending),
            WizardPhase::Complete => Err(FormScanError::WizardComplete),
            WizardPhase::Idle => Err(FormScanError::MissingTargetInput),
        }
    }

    /// Stage normalized OCR text for confirmation.
    pub fn ocr_succeeded(&mut self, text: String) -> Result<&str, FormScanError> {
        if self.phase != WizardPhase::OcrPending {
            return Err(FormScanError::MissingTargetInput);
        }
        self.staged_text = Some(text);
        self.phase = WizardPhase::AwaitingConfirmation;
        Ok(self.staged_text.as_deref().unwrap_or_default())
    }

    /// Return to capture after an OCR failure; the caller restores the
    /// field's placeholder from the returned spec.
    pub fn ocr_failed(&mut self) -> Result<&FieldSpec, FormScanError> {
        if self.phase != WizardPhase::OcrPending {
            return Err(FormScanError::MissingTargetInput);
        }
        self.staged_text = None;
        self.phase = WizardPhase::AwaitingSelection;
        self.fields
            .get(self.index)
            .ok_or(FormScanError::WizardComplete)
    }

    /// Commit the staged text to the current field and advance.
    pub fn confirm(&mut self) -> Result<Commit, FormScanError> {
        if self.phase != WizardPhase::AwaitingConfirmation {
            return Err(FormScanError::MissingTargetInput);
        }
        let text = self.staged_text.take().unwrap_or_default();
        let field = self
            .fields
            .get(self.index)
            .cloned()
            .ok_or(FormScanError::WizardComplete)?;

        self.index += 1;
        let completed = self.index >= self.fields.len();
        self.phase = if completed {
            WizardPhase::Complete
        } else {
            WizardPhase::AwaitingSelection
        };

        Ok(Commit {
            field,
            text,
            completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{ControlType, FieldKind};

    fn field(name: &str, kind: FieldKind) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            label: format!("Select {}", name),
            form_field_name: name.to_string(),
            control: ControlType::Input,
            kind,
        }
    }

    fn plan(n: usize) -> Vec<FieldSpec> {
        (0..n)
            .map(|i| field(&format!("field{}", i), FieldKind::SingleLine))
            .collect()
    }

    fn commit_one(wizard: &mut Wizard, text: &str) -> Commit {
        wizard.selection_submitted().unwrap();
        wizard.ocr_succeeded(text.to_string()).unwrap();
        wizard.confirm().unwrap()
    }

    #[test]
    fn test_empty_plan_is_immediately_terminal() {
        let mut wizard = Wizard::new(vec![]);
        assert_eq!(wizard.start_capture().unwrap(), None);
        assert!(wizard.is_complete());
        assert_eq!(
            wizard.start_capture(),
            Err(FormScanError::WizardComplete)
        );
    }

    #[test]
    fn test_happy_path_single_field() {
        let mut wizard = Wizard::new(plan(1));
        let armed = wizard.start_capture().unwrap().unwrap();
        assert_eq!(armed.form_field_name, "field0");
        assert_eq!(wizard.phase(), WizardPhase::AwaitingSelection);

        wizard.selection_submitted().unwrap();
        assert_eq!(wizard.phase(), WizardPhase::OcrPending);

        wizard.ocr_succeeded("hello".to_string()).unwrap();
        assert_eq!(wizard.phase(), WizardPhase::AwaitingConfirmation);
        assert_eq!(wizard.staged_text(), Some("hello"));

        let commit = wizard.confirm().unwrap();
        assert_eq!(commit.text, "hello");
        assert!(commit.completed);
        assert!(wizard.is_complete());
        assert!(wizard.current_field().is_none());
    }

    #[test]
    fn test_k_commits_reach_terminal_and_k_plus_one_impossible() {
        let k = 4;
        let mut wizard = Wizard::new(plan(k));
        wizard.start_capture().unwrap();
        for i in 0..k {
            let commit = commit_one(&mut wizard, &format!("value{}", i));
            assert_eq!(commit.field.form_field_name, format!("field{}", i));
            assert_eq!(commit.completed, i == k - 1);
        }
        assert!(wizard.is_complete());
        // No active field: a K+1th commit attempt cannot even start
        assert_eq!(
            wizard.selection_submitted(),
            Err(FormScanError::WizardComplete)
        );
        assert!(wizard.confirm().is_err());
    }

    #[test]
    fn test_index_monotonically_non_decreasing() {
        let mut wizard = Wizard::new(plan(3));
        wizard.start_capture().unwrap();
        let mut last = wizard.current_index();
        for _ in 0..3 {
            commit_one(&mut wizard, "v");
            assert!(wizard.current_index() >= last);
            last = wizard.current_index();
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_busy_guard_rejects_second_submission() {
        let mut wizard = Wizard::new(plan(1));
        wizard.start_capture().unwrap();
        wizard.selection_submitted().unwrap();
        assert_eq!(
            wizard.selection_submitted(),
            Err(FormScanError::OcrAlreadyPending)
        );
        // Still pending; success path unaffected
        assert_eq!(wizard.phase(), WizardPhase::OcrPending);
    }

    #[test]
    fn test_ocr_failure_returns_to_selection() {
        let mut wizard = Wizard::new(plan(2));
        wizard.start_capture().unwrap();
        wizard.selection_submitted().unwrap();
        let restored = wizard.ocr_failed().unwrap();
        assert_eq!(restored.form_field_name, "field0");
        assert_eq!(wizard.phase(), WizardPhase::AwaitingSelection);
        assert_eq!(wizard.current_index(), 0);
        assert!(wizard.staged_text().is_none());
    }

    #[test]
    fn test_reselect_replaces_staged_text() {
        let mut wizard = Wizard::new(plan(1));
        wizard.start_capture().unwrap();
        wizard.selection_submitted().unwrap();
        wizard.ocr_succeeded("first try".to_string()).unwrap();

        // User drags again instead of confirming: staged text is dropped
        wizard.selection_submitted().unwrap();
        assert_eq!(wizard.phase(), WizardPhase::OcrPending);
        assert!(wizard.staged_text().is_none());

        wizard.ocr_succeeded("second try".to_string()).unwrap();
        let commit = wizard.confirm().unwrap();
        assert_eq!(commit.text, "second try");
    }

    #[test]
    fn test_start_capture_discards_stale_staged_text() {
        let mut wizard = Wizard::new(plan(2));
        wizard.start_capture().unwrap();
        wizard.selection_submitted().unwrap();
        wizard.ocr_succeeded("stale".to_string()).unwrap();

        wizard.start_capture().unwrap();
        assert!(wizard.staged_text().is_none());
        assert_eq!(wizard.phase(), WizardPhase::AwaitingSelection);
    }

    #[test]
    fn test_drag_before_begin_rejected() {
        let mut wizard = Wizard::new(plan(1));
        assert!(wizard.selection_submitted().is_err());
    }

    #[test]
    fn test_confirm_advances_to_next_field() {
        let mut wizard = Wizard::new(plan(2));
        wizard.start_capture().unwrap();
        let commit = commit_one(&mut wizard, "a");
        assert!(!commit.completed);
        assert_eq!(wizard.phase(), WizardPhase::AwaitingSelection);
        assert_eq!(
            wizard.current_field().unwrap().form_field_name,
            "field1"
        );
    }
}
