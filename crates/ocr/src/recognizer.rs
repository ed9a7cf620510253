use thiserror::Error;

/// A single recognition attempt failed. The extractor treats this as an empty
/// reading for that attempt, never as a failed validation.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Recognizer could not read the image: {0}")]
    UnreadableImage(String),
    #[error("Recognition failed: {0}")]
    Recognition(String),
    #[error("Reading discarded: mean confidence {confidence} below {floor}")]
    LowConfidence { confidence: i32, floor: i32 },
}

/// Turns one encoded image (PNG or JPEG) into plain text.
///
/// Called once per orientation attempt, so implementations must be cheap to
/// call repeatedly and safe to share between requests.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;

    /// Short backend name for logs and service info.
    fn name(&self) -> &'static str {
        "custom"
    }
}

// ── Mock backend ─────────────────────────────────────────────────────────────

/// Gives the same answer for every image. Used by tests and by builds
/// without a real recognizer.
pub struct MockRecognizer {
    reply: Result<String, String>,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { reply: Ok(text.into()) }
    }

    /// Every call fails with [`OcrError::Recognition`].
    pub fn failing(message: impl Into<String>) -> Self {
        Self { reply: Err(message.into()) }
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        self.reply.clone().map_err(OcrError::Recognition)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ───────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrError, TextRecognizer};
    use leptess::LepTess;

    /// Readings of a sideways or upside-down page usually come back as
    /// low-confidence noise; anything under this mean is dropped.
    pub const DEFAULT_MIN_CONFIDENCE: i32 = 30;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
        min_confidence: i32,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string(), min_confidence: DEFAULT_MIN_CONFIDENCE }
        }

        pub fn with_min_confidence(mut self, min_confidence: i32) -> Self {
            self.min_confidence = min_confidence;
            self
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            // LepTess is not Sync, so each call gets its own instance.
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Recognition(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::UnreadableImage(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Recognition(e.to_string()))?;

            let confidence = lt.mean_text_conf();
            if confidence < self.min_confidence {
                return Err(OcrError::LowConfidence { confidence, floor: self.min_confidence });
            }
            Ok(text)
        }

        fn name(&self) -> &'static str {
            "tesseract"
        }
    }
}
