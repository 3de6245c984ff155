use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormScanError {
    #[error("Selection too small, please drag a larger region")]
    SelectionTooSmall,

    #[error("Image compression failed: {0}")]
    ImageCompression(String),

    #[error("OCR service error: {0}")]
    OcrProcessing(String),

    #[error("No text found in the selected region")]
    OcrNoTextFound,

    #[error("Target input is no longer present")]
    MissingTargetInput,

    #[error("An OCR request is already in flight")]
    OcrAlreadyPending,

    #[error("All fields have been completed")]
    WizardComplete,

    #[error("Invalid page {requested} (document has {total} pages)")]
    InvalidPage { requested: u32, total: u32 },
}
