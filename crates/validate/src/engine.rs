use docgate_core::{CategoryDescriptor, CategoryRegistry, RejectionReason, Thresholds, ValidationOutcome};
use docgate_ocr::{Extraction, Extractor};
use image::DynamicImage;
use thiserror::Error;

use crate::category::CategoryMatcher;
use crate::keywords::academic_matches;
use crate::rules::{first_applying, rejection_rules, Rule, RuleContext};
use crate::signature::sniff_format;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("Invalid id pattern in category '{category}': {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },
}

/// Runs the full cascade for one image and one selected category.
pub struct ValidationEngine {
    extractor: Extractor,
    registry: CategoryRegistry,
    matcher: CategoryMatcher,
    thresholds: Thresholds,
    rules: Vec<Rule>,
}

impl ValidationEngine {
    pub fn new(
        extractor: Extractor,
        registry: CategoryRegistry,
        thresholds: Thresholds,
    ) -> Result<Self, ValidateError> {
        let matcher = CategoryMatcher::new(&registry)
            .map_err(|(category, source)| ValidateError::InvalidPattern { category, source })?;
        Ok(Self { extractor, registry, matcher, thresholds, rules: rejection_rules() })
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Full cascade over encoded image bytes.
    pub fn validate(&self, bytes: &[u8], category_id: &str) -> ValidationOutcome {
        let Some(category) = self.registry.get(category_id) else {
            tracing::debug!(category = category_id, "Unknown category");
            return RejectionReason::UnknownCategory { category: category_id.to_string() }.into();
        };

        // G0: file signature
        let image = match check_signature(bytes) {
            Ok(image) => image,
            Err(reason) => return reason.into(),
        };

        // G1: resolution
        let (width, height) = (image.width(), image.height());
        if width < self.thresholds.min_width || height < self.thresholds.min_height {
            tracing::debug!(width, height, "Rejected at resolution gate");
            return RejectionReason::ResolutionTooLow.into();
        }

        // G2: extraction
        let extraction = self.extractor.extract(&image, Some(bytes));
        tracing::debug!(
            chars = extraction.text_len(),
            faces = extraction.face_count,
            recognizer = self.extractor.recognizer_name(),
            face_detector = self.extractor.face_detector_name(),
            "Extraction complete"
        );

        self.evaluate(&extraction, width, height, category)
    }

    /// Heuristic rules, academic scoring and category matching on a
    /// precomputed extraction.
    pub fn evaluate(
        &self,
        extraction: &Extraction,
        width: u32,
        height: u32,
        category: &CategoryDescriptor,
    ) -> ValidationOutcome {
        // G3: heuristic rules
        let ctx = RuleContext::new(extraction, width, height, category, &self.thresholds);
        if let Some(rule) = first_applying(&self.rules, &ctx) {
            tracing::debug!(rule = rule.name, "Rejected by rule");
            return rule.reason.clone().into();
        }

        // G4: academic scoring
        let matches = academic_matches(&extraction.text);
        if matches.len() < self.thresholds.min_academic_matches {
            tracing::debug!(matched = ?matches, "Rejected at academic scoring");
            return RejectionReason::NonAcademicContent.into();
        }

        // G5: category
        if !self.matcher.matches(&category.id, &extraction.text) {
            tracing::debug!(category = %category.id, "Rejected at category match");
            return RejectionReason::CategoryMismatch { category: category.label.clone() }.into();
        }

        tracing::debug!(category = %category.id, matched = matches.len(), "Accepted");
        ValidationOutcome::Accepted
    }
}

/// Accept only known image containers that also decode.
pub fn check_signature(bytes: &[u8]) -> Result<DynamicImage, RejectionReason> {
    let Some(format) = sniff_format(bytes) else {
        tracing::debug!(len = bytes.len(), "Rejected at signature gate");
        return Err(RejectionReason::InvalidFileFormat);
    };
    image::load_from_memory_with_format(bytes, format).map_err(|e| {
        tracing::debug!(?format, "Signature matched but decode failed: {e}");
        RejectionReason::InvalidFileFormat
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_ocr::{MockFaceDetector, MockRecognizer};
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;
    use std::sync::Arc;

    const MARKS_CARD: &str = "VISVESVARAYA TECHNOLOGICAL UNIVERSITY, BELAGAVI\n\
        GRADE CARD  SEMESTER V\n\
        USN 1RV20CS001  SGPA 8.40  CREDITS 24  RESULT: PASS";

    fn engine(text: &str, faces: usize) -> ValidationEngine {
        let extractor = Extractor::new(
            Arc::new(MockRecognizer::new(text)),
            Arc::new(MockFaceDetector::with_faces(faces)),
        );
        ValidationEngine::new(extractor, CategoryRegistry::builtin(), Thresholds::default()).unwrap()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn reason(outcome: ValidationOutcome) -> RejectionReason {
        outcome.reason().cloned().expect("expected a rejection")
    }

    #[test]
    fn academic_document_is_accepted() {
        let outcome = engine(MARKS_CARD, 0).validate(&png(600, 800), "degree_marks_card");
        assert_eq!(outcome, ValidationOutcome::Accepted);
    }

    #[test]
    fn blank_image_is_empty_extraction() {
        let outcome = engine("", 0).validate(&png(600, 800), "degree_marks_card");
        assert_eq!(reason(outcome), RejectionReason::EmptyExtraction);
    }

    #[test]
    fn unknown_category_is_rejected_before_decoding() {
        let outcome = engine(MARKS_CARD, 0).validate(b"not even an image", "passport");
        assert_eq!(reason(outcome), RejectionReason::UnknownCategory { category: "passport".into() });
    }

    #[test]
    fn non_image_bytes_are_invalid_format() {
        let outcome = engine(MARKS_CARD, 0).validate(b"%PDF-1.7 ...", "degree_marks_card");
        assert_eq!(reason(outcome), RejectionReason::InvalidFileFormat);
    }

    #[test]
    fn truncated_png_is_invalid_format() {
        let bytes = png(600, 800);
        let outcome = engine(MARKS_CARD, 0).validate(&bytes[..40], "degree_marks_card");
        assert_eq!(reason(outcome), RejectionReason::InvalidFileFormat);
    }

    #[test]
    fn small_image_is_too_low_resolution() {
        let outcome = engine(MARKS_CARD, 0).validate(&png(200, 800), "degree_marks_card");
        assert_eq!(reason(outcome), RejectionReason::ResolutionTooLow);
    }

    #[test]
    fn several_faces_are_a_group_photo_whatever_the_text() {
        for text in ["", "hi", MARKS_CARD] {
            let outcome = engine(text, 3).validate(&png(600, 800), "degree_marks_card");
            assert_eq!(reason(outcome), RejectionReason::GroupPhotoDetected, "text: {text:?}");
        }
    }

    #[test]
    fn wrong_category_is_mismatch_not_non_academic() {
        let e = engine(MARKS_CARD, 0);
        let outcome = e.validate(&png(600, 800), "sslc_marks_card");
        assert_eq!(
            reason(outcome),
            RejectionReason::CategoryMismatch { category: "10th / SSLC Marks Card".into() }
        );
    }

    #[test]
    fn twelfth_grade_card_is_not_a_tenth_grade_card() {
        let text = "CENTRAL BOARD OF SECONDARY EDUCATION\n\
            SENIOR SCHOOL CERTIFICATE EXAMINATION CLASS XII\n\
            MARKS OBTAINED  ENGLISH 081  PHYSICS 076  RESULT: PASS";
        let e = engine(text, 0);
        assert_eq!(
            reason(e.validate(&png(600, 800), "sslc_marks_card")),
            RejectionReason::CategoryMismatch { category: "10th / SSLC Marks Card".into() }
        );
        assert_eq!(e.validate(&png(600, 800), "puc_marks_card"), ValidationOutcome::Accepted);
    }

    #[test]
    fn tenth_grade_cbse_card_is_accepted() {
        let text = "CENTRAL BOARD OF SECONDARY EDUCATION\n\
            SECONDARY SCHOOL EXAMINATION CLASS X\n\
            MARKS OBTAINED  ENGLISH 081  SCIENCE 076  RESULT: PASS";
        let outcome = engine(text, 0).validate(&png(600, 800), "sslc_marks_card");
        assert_eq!(outcome, ValidationOutcome::Accepted);
    }

    #[test]
    fn institutional_but_non_academic_text() {
        let e = engine("CITY MUNICIPAL COUNCIL  WATER BILL  AMOUNT DUE 1200", 0);
        let outcome = e.validate(&png(600, 800), "degree_marks_card");
        assert_eq!(reason(outcome), RejectionReason::NonAcademicContent);
    }

    #[test]
    fn evaluate_runs_without_image() {
        let e = engine("", 0);
        let registry = CategoryRegistry::builtin();
        let id_card = registry.get("student_id_card").unwrap();
        let extraction = Extraction::new("R V COLLEGE OF ENGINEERING\nSTUDENT ID CARD\n1RV20CS001", 1);
        assert_eq!(e.evaluate(&extraction, 856, 540, id_card), ValidationOutcome::Accepted);
    }

    #[test]
    fn check_signature_decodes_valid_png() {
        let img = check_signature(&png(320, 300)).unwrap();
        assert_eq!((img.width(), img.height()), (320, 300));
    }

    #[test]
    fn bad_registry_pattern_fails_construction() {
        let registry = CategoryRegistry::new(vec![CategoryDescriptor {
            id: "odd".into(),
            label: "Odd".into(),
            kind: Default::default(),
            keywords: vec![],
            exclude_keywords: vec![],
            min_keyword_matches: 1,
            id_patterns: vec!["[".into()],
        }])
        .unwrap();
        let extractor = Extractor::new(
            Arc::new(MockRecognizer::new("")),
            Arc::new(MockFaceDetector::with_faces(0)),
        );
        let err = ValidationEngine::new(extractor, registry, Thresholds::default()).err().unwrap();
        assert!(err.to_string().contains("'odd'"));
    }
}
