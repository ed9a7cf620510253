use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a submitted image was turned away. The `Display` text is shown to the
/// end user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum RejectionReason {
    InvalidFileFormat,
    ResolutionTooLow,
    EmptyExtraction,
    SelfieDetected,
    PortraitSelfie,
    ProfilePhoto,
    GroupPhotoDetected,
    NonDocumentShape,
    NoAcademicSignal,
    NonAcademicContent,
    CategoryMismatch { category: String },
    UnknownCategory { category: String },
    ClassifierRejected { rationale: String },
}

impl RejectionReason {
    /// Stable machine-readable code, e.g. `group-photo-detected`.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::InvalidFileFormat => "invalid-file-format",
            RejectionReason::ResolutionTooLow => "resolution-too-low",
            RejectionReason::EmptyExtraction => "empty-extraction",
            RejectionReason::SelfieDetected
            | RejectionReason::PortraitSelfie
            | RejectionReason::ProfilePhoto => "selfie-detected",
            RejectionReason::GroupPhotoDetected => "group-photo-detected",
            RejectionReason::NonDocumentShape => "non-document-shape",
            RejectionReason::NoAcademicSignal => "no-academic-signal",
            RejectionReason::NonAcademicContent => "non-academic-content",
            RejectionReason::CategoryMismatch { .. } => "category-mismatch",
            RejectionReason::UnknownCategory { .. } => "unknown-category",
            RejectionReason::ClassifierRejected { .. } => "classifier-rejected",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::InvalidFileFormat => {
                write!(f, "Unsupported file. Please upload a JPEG, PNG, WebP, GIF, BMP or TIFF image.")
            }
            RejectionReason::ResolutionTooLow => {
                write!(f, "Image resolution is too low. Please retake the photo closer to the document.")
            }
            RejectionReason::EmptyExtraction => {
                write!(f, "No readable text was found. Please upload a clear photo of the document.")
            }
            RejectionReason::SelfieDetected => {
                write!(f, "This looks like a selfie. Please upload a photo of the document itself.")
            }
            RejectionReason::PortraitSelfie => {
                write!(f, "This looks like a portrait photo. Please upload a photo of the document itself.")
            }
            RejectionReason::ProfilePhoto => {
                write!(f, "This looks like a profile picture. Please upload a photo of the document itself.")
            }
            RejectionReason::GroupPhotoDetected => {
                write!(f, "Multiple faces detected. Group photos cannot be accepted as documents.")
            }
            RejectionReason::NonDocumentShape => {
                write!(f, "The image does not have the shape of a document. Please capture the whole page.")
            }
            RejectionReason::NoAcademicSignal => {
                write!(f, "No institution or board details were found on this document.")
            }
            RejectionReason::NonAcademicContent => write!(
                f,
                "Only academic documents (marks cards, certificates, ID cards) are allowed. \
                 This image does not appear to be an academic document."
            ),
            RejectionReason::CategoryMismatch { category } => write!(
                f,
                "This document does not match the selected category ({category}). \
                 Please choose the correct category or upload the right document."
            ),
            RejectionReason::UnknownCategory { category } => {
                write!(f, "Unknown document category '{category}'.")
            }
            RejectionReason::ClassifierRejected { rationale } => write!(f, "{rationale}"),
        }
    }
}

/// Result of one validation request: exactly one of accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted,
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }

    pub fn reason(&self) -> Option<&RejectionReason> {
        match self {
            ValidationOutcome::Accepted => None,
            ValidationOutcome::Rejected(r) => Some(r),
        }
    }

    /// The message to display, if rejected.
    pub fn message(&self) -> Option<String> {
        self.reason().map(|r| r.to_string())
    }
}

impl From<RejectionReason> for ValidationOutcome {
    fn from(reason: RejectionReason) -> Self {
        ValidationOutcome::Rejected(reason)
    }
}
