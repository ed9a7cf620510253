use docgate_classify::ClassificationClient;
use docgate_core::{CategoryRegistry, Quadrilateral, RejectionReason, ValidationOutcome};
use docgate_ocr::{Extractor, FaceDetector, TextRecognizer};
use docgate_scan::BoundaryDetector;
use docgate_validate::{check_signature, ValidationEngine};
use std::sync::Arc;

use crate::config::{DecisionMode, IntakeConfig};
use crate::error::IntakeError;

/// Entry point for callers: one instance per deployment, shared across
/// requests.
pub struct DocumentIntake {
    decision: DecisionMode,
    engine: Arc<ValidationEngine>,
    detector: BoundaryDetector,
    classifier: Option<ClassificationClient>,
}

impl DocumentIntake {
    /// Builds the registry, the cascade and, when the decision mode uses one,
    /// the classifier named in `config`.
    pub fn new(
        config: IntakeConfig,
        recognizer: Arc<dyn TextRecognizer>,
        face_detector: Arc<dyn FaceDetector>,
    ) -> Result<Self, IntakeError> {
        let classifier = match (&config.classifier, config.decision.needs_classifier()) {
            (Some(classifier), true) => Some(ClassificationClient::from_config(classifier)?),
            (None, true) => return Err(IntakeError::MissingClassifier(config.decision)),
            (_, false) => None,
        };
        Self::with_classifier(config, recognizer, face_detector, classifier)
    }

    /// Like [`DocumentIntake::new`] with an already built classifier; the
    /// `classifier` section of `config` is ignored.
    pub fn with_classifier(
        config: IntakeConfig,
        recognizer: Arc<dyn TextRecognizer>,
        face_detector: Arc<dyn FaceDetector>,
        classifier: Option<ClassificationClient>,
    ) -> Result<Self, IntakeError> {
        if config.decision.needs_classifier() && classifier.is_none() {
            return Err(IntakeError::MissingClassifier(config.decision));
        }
        let registry = config.registry()?;
        let extractor = Extractor::new(recognizer, face_detector);
        let engine = ValidationEngine::new(extractor, registry, config.thresholds)?;

        tracing::info!(
            decision = ?config.decision,
            categories = engine.registry().len(),
            classifier = classifier.as_ref().map(|c| c.strategy()),
            "Document intake ready"
        );
        Ok(Self {
            decision: config.decision,
            engine: Arc::new(engine),
            detector: BoundaryDetector::new(config.boundary),
            classifier,
        })
    }

    pub fn decision(&self) -> DecisionMode {
        self.decision
    }

    pub fn registry(&self) -> &CategoryRegistry {
        self.engine.registry()
    }

    /// Accept or reject `bytes` as a document of `category_id`.
    ///
    /// Every verdict about the document is an `Ok` outcome. `Err` means the
    /// cascade itself did not finish, so there is no verdict to report.
    pub async fn validate(&self, bytes: &[u8], category_id: &str) -> Result<ValidationOutcome, IntakeError> {
        let outcome = match self.decision {
            DecisionMode::Cascade => self.run_cascade(bytes, category_id).await?,
            DecisionMode::Classifier => self.classifier_only(bytes, category_id).await,
            DecisionMode::CascadeThenClassifier => match self.run_cascade(bytes, category_id).await? {
                ValidationOutcome::Accepted => self.consult_classifier(bytes).await,
                rejected => rejected,
            },
        };
        Ok(outcome)
    }

    /// Scan-assist outline for a camera frame. `None` when nothing
    /// document-like is visible or the frame does not decode.
    pub fn detect_boundary(&self, bytes: &[u8]) -> Option<Quadrilateral> {
        self.detector.detect_bytes(bytes)
    }

    async fn run_cascade(&self, bytes: &[u8], category_id: &str) -> Result<ValidationOutcome, IntakeError> {
        let engine = Arc::clone(&self.engine);
        let bytes = bytes.to_vec();
        let category = category_id.to_string();
        tokio::task::spawn_blocking(move || engine.validate(&bytes, &category))
            .await
            .map_err(|e| {
                tracing::error!(category = category_id, "Validation task failed: {e}");
                IntakeError::Task(e)
            })
    }

    async fn classifier_only(&self, bytes: &[u8], category_id: &str) -> ValidationOutcome {
        if self.engine.registry().get(category_id).is_none() {
            return RejectionReason::UnknownCategory { category: category_id.to_string() }.into();
        }
        if let Err(reason) = check_signature(bytes) {
            return reason.into();
        }
        self.consult_classifier(bytes).await
    }

    async fn consult_classifier(&self, bytes: &[u8]) -> ValidationOutcome {
        let Some(classifier) = &self.classifier else {
            // Construction guarantees a classifier for these modes.
            return RejectionReason::ClassifierRejected { rationale: "no classifier configured".into() }.into();
        };
        let result = classifier.classify(bytes).await;
        tracing::debug!(
            strategy = classifier.strategy(),
            accepted = result.accepted,
            confidence = result.confidence,
            "Classifier decision"
        );
        if result.accepted {
            ValidationOutcome::Accepted
        } else {
            RejectionReason::ClassifierRejected { rationale: result.rationale }.into()
        }
    }
}
