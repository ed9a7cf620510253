use docgate_core::ClassificationResult;
use image::imageops::FilterType;
use ndarray::Array4;
use std::path::Path;

use crate::config::{OnDeviceConfig, TensorLayout};
use crate::error::ClassifyError;

/// A loaded model that maps one image tensor to one score per label.
pub trait InferenceEngine: Send + Sync {
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifyError>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
        (**self).run(input)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnDeviceSettings {
    pub input_size: u32,
    pub layout: TensorLayout,
    pub positive_label: String,
}

impl Default for OnDeviceSettings {
    fn default() -> Self {
        Self { input_size: 224, layout: TensorLayout::Nchw, positive_label: "academic".to_string() }
    }
}

impl From<&OnDeviceConfig> for OnDeviceSettings {
    fn from(config: &OnDeviceConfig) -> Self {
        Self {
            input_size: config.input_size,
            layout: config.layout,
            positive_label: config.positive_label.clone(),
        }
    }
}

/// Image classifier backed by an [`InferenceEngine`] and a label list.
pub struct OnDeviceClassifier<E: InferenceEngine> {
    engine: E,
    labels: Vec<String>,
    positive: usize,
    settings: OnDeviceSettings,
}

impl<E: InferenceEngine> OnDeviceClassifier<E> {
    /// Checks the label list and probes the engine once with a zero tensor so
    /// an output/label mismatch fails here rather than on the first image.
    pub fn new(engine: E, labels: Vec<String>, settings: OnDeviceSettings) -> Result<Self, ClassifyError> {
        if labels.is_empty() {
            return Err(ClassifyError::ModelLoad("label list is empty".into()));
        }
        if settings.input_size == 0 {
            return Err(ClassifyError::ModelLoad("input size must be positive".into()));
        }
        let positive = labels
            .iter()
            .position(|l| l.eq_ignore_ascii_case(&settings.positive_label))
            .ok_or_else(|| {
                ClassifyError::ModelLoad(format!("label list has no '{}' entry", settings.positive_label))
            })?;

        let probe = engine
            .run(Array4::zeros(tensor_shape(settings.input_size, settings.layout)))
            .map_err(|e| ClassifyError::ModelLoad(format!("probe inference failed: {e}")))?;
        if probe.len() != labels.len() {
            return Err(ClassifyError::ModelLoad(format!(
                "model produces {} outputs but {} labels were given",
                probe.len(),
                labels.len()
            )));
        }
        if let Some(bad) = non_finite(&probe) {
            return Err(ClassifyError::ModelLoad(format!("probe inference produced a non-finite score ({bad})")));
        }

        tracing::info!(labels = labels.len(), positive = %labels[positive], "On-device classifier ready");
        Ok(Self { engine, labels, positive, settings })
    }

    pub fn from_label_file(engine: E, labels_path: &Path, settings: OnDeviceSettings) -> Result<Self, ClassifyError> {
        let content = std::fs::read_to_string(labels_path)
            .map_err(|e| ClassifyError::ModelLoad(format!("labels file {}: {e}", labels_path.display())))?;
        Self::new(engine, parse_labels(&content), settings)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Per-image failures become a rejected result with zero confidence.
    pub fn classify(&self, image_bytes: &[u8]) -> ClassificationResult {
        match self.try_classify(image_bytes) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("On-device classification failed: {e}");
                ClassificationResult::rejected(e.to_string())
            }
        }
    }

    fn try_classify(&self, image_bytes: &[u8]) -> Result<ClassificationResult, ClassifyError> {
        let image = image::load_from_memory(image_bytes).map_err(|e| ClassifyError::Decode(e.to_string()))?;
        let tensor = image_tensor(&image, self.settings.input_size, self.settings.layout);
        let raw = self.engine.run(tensor)?;
        if raw.len() != self.labels.len() {
            return Err(ClassifyError::Inference(format!(
                "expected {} outputs, got {}",
                self.labels.len(),
                raw.len()
            )));
        }

        if let Some(bad) = non_finite(&raw) {
            return Err(ClassifyError::Inference(format!("model produced a non-finite score ({bad})")));
        }

        let probs = if is_distribution(&raw) { raw } else { softmax(&raw) };
        if let Some(bad) = non_finite(&probs) {
            return Err(ClassifyError::Inference(format!("scores do not normalize ({bad})")));
        }
        let (best, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });

        let accepted = best == self.positive;
        tracing::debug!(label = %self.labels[best], confidence, accepted, "On-device classification");
        Ok(ClassificationResult {
            accepted,
            confidence,
            score: None,
            rationale: format!("Classified as '{}' ({:.0}% confidence)", self.labels[best], confidence * 100.0),
            extracted_text: None,
            matched_keywords: vec![],
        })
    }
}

// ── Tensor helpers ───────────────────────────────────────────────────────────

fn tensor_shape(size: u32, layout: TensorLayout) -> (usize, usize, usize, usize) {
    let s = size as usize;
    match layout {
        TensorLayout::Nchw => (1, 3, s, s),
        TensorLayout::Nhwc => (1, s, s, 3),
    }
}

/// Square RGB tensor scaled to [0, 1].
pub fn image_tensor(image: &image::DynamicImage, size: u32, layout: TensorLayout) -> Array4<f32> {
    let rgb = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let mut tensor = Array4::<f32>::zeros(tensor_shape(size, layout));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            match layout {
                TensorLayout::Nchw => tensor[[0, c, y, x]] = v,
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = v,
            }
        }
    }
    tensor
}

fn non_finite(values: &[f32]) -> Option<f32> {
    values.iter().copied().find(|v| !v.is_finite())
}

fn is_distribution(values: &[f32]) -> bool {
    values.iter().all(|v| (0.0..=1.0).contains(v)) && (values.iter().sum::<f32>() - 1.0).abs() < 1e-3
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// One label per non-empty line. A leading index such as `0 ` or `1: ` is dropped.
pub fn parse_labels(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            let rest = l.trim_start_matches(|c: char| c.is_ascii_digit());
            if rest.len() == l.len() || !rest.starts_with([' ', '\t', ':', '.']) {
                return l.to_string();
            }
            rest.trim_start_matches([' ', '\t', ':', '.']).to_string()
        })
        .collect()
}

// ── ONNX Runtime engine (optional, gated behind `onnx` feature) ──────────────

#[cfg(feature = "onnx")]
pub mod ort_engine {
    use super::InferenceEngine;
    use crate::error::ClassifyError;
    use ndarray::Array4;
    use std::path::Path;
    use std::sync::Mutex;

    /// `Session::run` takes `&mut self`, so the session sits behind a mutex.
    pub struct OrtEngine {
        session: Mutex<ort::session::Session>,
    }

    impl OrtEngine {
        pub fn load(model_path: &Path) -> Result<Self, ClassifyError> {
            if !model_path.exists() {
                return Err(ClassifyError::ModelLoad(format!("model not found: {}", model_path.display())));
            }
            let session = ort::session::Session::builder()
                .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?;
            Ok(Self { session: Mutex::new(session) })
        }
    }

    impl InferenceEngine for OrtEngine {
        fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifyError> {
            let value =
                ort::value::Tensor::from_array(input).map_err(|e| ClassifyError::Inference(e.to_string()))?;
            let mut session = self
                .session
                .lock()
                .map_err(|e| ClassifyError::Inference(format!("Lock poisoned: {e}")))?;
            let outputs = session
                .run(ort::inputs![value])
                .map_err(|e| ClassifyError::Inference(e.to_string()))?;
            let scores = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| ClassifyError::Inference(e.to_string()))?;
            Ok(scores.iter().copied().collect())
        }
    }
}
