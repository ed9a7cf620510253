use image::DynamicImage;
use std::sync::Arc;

use crate::face::FaceDetector;
use crate::preprocess;
use crate::recognizer::{OcrError, TextRecognizer};
use crate::types::{Extraction, FaceScan, Rotation};

/// Runs the injected recognizer across orientations and the face detector once.
///
/// Orientations are tried one after another; the longest text wins, which
/// stands in for "the orientation that read best" without estimating skew.
#[derive(Clone)]
pub struct Extractor {
    recognizer: Arc<dyn TextRecognizer>,
    face_detector: Arc<dyn FaceDetector>,
}

impl Extractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, face_detector: Arc<dyn FaceDetector>) -> Self {
        Self { recognizer, face_detector }
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    pub fn face_detector_name(&self) -> &'static str {
        self.face_detector.name()
    }

    /// Text and face count for one image. `source` is the encoded upload, if the
    /// caller still has it; it gets one extra unmodified attempt.
    pub fn extract(&self, image: &DynamicImage, source: Option<&[u8]>) -> Extraction {
        let text = self.extract_text(image, source);
        let faces = self.detect_faces(image);
        Extraction::new(text, faces.count)
    }

    pub fn extract_text(&self, image: &DynamicImage, source: Option<&[u8]>) -> String {
        let mut best = String::new();

        for rotation in Rotation::ALL {
            let prepared = match preprocess::prepare_for_ocr(image, rotation) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(%rotation, "Preprocessing failed: {e}");
                    continue;
                }
            };
            let text = self.recognize_attempt(&prepared, &rotation.to_string());
            keep_longest(&mut best, text);
        }

        if let Some(original) = source {
            let text = self.recognize_attempt(original, "source");
            keep_longest(&mut best, text);
        }

        tracing::debug!(chars = best.chars().count(), "Text extraction finished");
        best
    }

    /// Any detector failure counts as no faces.
    pub fn detect_faces(&self, image: &DynamicImage) -> FaceScan {
        match self.face_detector.detect(image) {
            Ok(faces) => FaceScan::from_count(faces.len()),
            Err(e) => {
                tracing::warn!("Face detection failed, assuming no faces: {e}");
                FaceScan::from_count(0)
            }
        }
    }

    fn recognize_attempt(&self, bytes: &[u8], label: &str) -> String {
        match self.recognizer.recognize(bytes) {
            Ok(text) => {
                let text = text.trim().to_string();
                tracing::trace!(attempt = label, chars = text.chars().count(), "OCR attempt");
                text
            }
            Err(e @ OcrError::LowConfidence { .. }) => {
                tracing::debug!(attempt = label, "{e}");
                String::new()
            }
            Err(e) => {
                tracing::warn!(attempt = label, "OCR attempt failed: {e}");
                String::new()
            }
        }
    }
}

/// Replace `best` only on a strictly longer result, so ties keep the earlier attempt.
fn keep_longest(best: &mut String, candidate: String) {
    if candidate.chars().count() > best.chars().count() {
        *best = candidate;
    }
}
