//! BlazeFace (short-range) face detection.
//!
//! Tensor preparation, anchor decoding and suppression are plain functions so
//! they can be exercised without a model; the ONNX Runtime session that feeds
//! them is behind the `onnx` feature.

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

use crate::types::FaceBox;

/// Model input is a square of this side.
pub const INPUT_SIZE: u32 = 128;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;
/// Overlap above which the weaker of two boxes is dropped.
const NMS_IOU: f32 = 0.3;
const NUM_ANCHORS: usize = 896;
/// Values per anchor in the regressor output: box (4) + six keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

/// Squash to `INPUT_SIZE`², RGB scaled into [0, 1], NCHW.
pub fn face_tensor(image: &DynamicImage) -> Array4<f32> {
    let s = INPUT_SIZE as usize;
    let rgb = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle).to_rgb8();
    let mut tensor = Array4::<f32>::zeros((1, 3, s, s));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }
    tensor
}

/// Anchor centres in unit coordinates: a 16×16 grid with two anchors per
/// cell, then an 8×8 grid with six.
pub fn anchors() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    for (stride, per_cell) in [(8usize, 2usize), (16, 6)] {
        let grid = INPUT_SIZE as usize / stride;
        for gy in 0..grid {
            for gx in 0..grid {
                let centre = [(gx as f32 + 0.5) / grid as f32, (gy as f32 + 0.5) / grid as f32];
                anchors.extend(std::iter::repeat(centre).take(per_cell));
            }
        }
    }
    anchors
}

/// Turn raw model outputs into face boxes in pixels of a `width`×`height`
/// image, keeping detections at or above `min_confidence` after suppression.
pub fn decode(
    regressors: &[f32],
    logits: &[f32],
    anchors: &[[f32; 2]],
    min_confidence: f32,
    width: u32,
    height: u32,
) -> Vec<FaceBox> {
    let (fw, fh) = (width as f32, height as f32);
    let input = INPUT_SIZE as f32;

    let candidates = logits
        .iter()
        .zip(anchors)
        .enumerate()
        .filter_map(|(i, (&logit, anchor))| {
            let confidence = sigmoid(logit);
            if confidence < min_confidence {
                return None;
            }
            let r = regressors.get(i * REGRESSOR_STRIDE..i * REGRESSOR_STRIDE + 4)?;
            let (cx, cy) = (anchor[0] + r[0] / input, anchor[1] + r[1] / input);
            let (w, h) = (r[2] / input, r[3] / input);

            let x0 = ((cx - w / 2.0) * fw).clamp(0.0, fw);
            let y0 = ((cy - h / 2.0) * fh).clamp(0.0, fh);
            let x1 = ((cx + w / 2.0) * fw).clamp(0.0, fw);
            let y1 = ((cy + h / 2.0) * fh).clamp(0.0, fh);
            (x1 > x0 && y1 > y0).then_some(FaceBox {
                x: x0,
                y: y0,
                width: x1 - x0,
                height: y1 - y0,
                confidence,
            })
        })
        .collect();

    suppress(candidates, NMS_IOU)
}

/// Greedy non-maximum suppression, strongest first.
fn suppress(mut boxes: Vec<FaceBox>, max_iou: f32) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<FaceBox> = Vec::new();
    for candidate in boxes {
        if kept.iter().all(|k| iou(k, &candidate) <= max_iou) {
            kept.push(candidate);
        }
    }
    kept
}

fn iou(a: &FaceBox, b: &FaceBox) -> f32 {
    let ix = ((a.x + a.width).min(b.x + b.width) - a.x.max(b.x)).max(0.0);
    let iy = ((a.y + a.height).min(b.y + b.height) - a.y.max(b.y)).max(0.0);
    let inter = ix * iy;
    if inter == 0.0 {
        return 0.0;
    }
    inter / (a.width * a.height + b.width * b.height - inter)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ── ONNX Runtime backend (optional, gated behind `onnx` feature) ─────────────

#[cfg(feature = "onnx")]
pub use onnx_backend::BlazeFaceDetector;

#[cfg(feature = "onnx")]
mod onnx_backend {
    use super::{anchors, decode, face_tensor, DEFAULT_MIN_CONFIDENCE};
    use crate::face::{FaceDetector, FaceError};
    use crate::types::FaceBox;
    use image::DynamicImage;
    use std::path::Path;
    use std::sync::Mutex;

    pub struct BlazeFaceDetector {
        session: Mutex<ort::session::Session>,
        anchors: Vec<[f32; 2]>,
        min_confidence: f32,
    }

    impl BlazeFaceDetector {
        pub fn load(model_path: &Path) -> Result<Self, FaceError> {
            if !model_path.exists() {
                return Err(FaceError::ModelLoad(format!("model not found: {}", model_path.display())));
            }
            let session = ort::session::Session::builder()
                .map_err(|e| FaceError::ModelLoad(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e| FaceError::ModelLoad(e.to_string()))?;
            Ok(Self { session: Mutex::new(session), anchors: anchors(), min_confidence: DEFAULT_MIN_CONFIDENCE })
        }

        pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
            self.min_confidence = min_confidence;
            self
        }
    }

    impl FaceDetector for BlazeFaceDetector {
        fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, FaceError> {
            let value = ort::value::Tensor::from_array(face_tensor(image))
                .map_err(|e| FaceError::Detector(e.to_string()))?;
            let mut session = self
                .session
                .lock()
                .map_err(|e| FaceError::Detector(format!("Lock poisoned: {e}")))?;
            let outputs = session
                .run(ort::inputs![value])
                .map_err(|e| FaceError::Detector(e.to_string()))?;
            if outputs.len() < 2 {
                return Err(FaceError::Detector(format!("expected 2 outputs, got {}", outputs.len())));
            }
            let regressors = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| FaceError::Detector(e.to_string()))?;
            let logits = outputs[1]
                .try_extract_array::<f32>()
                .map_err(|e| FaceError::Detector(e.to_string()))?;
            let regressors: Vec<f32> = regressors.iter().copied().collect();
            let logits: Vec<f32> = logits.iter().copied().collect();

            Ok(decode(&regressors, &logits, &self.anchors, self.min_confidence, image.width(), image.height()))
        }

        fn name(&self) -> &'static str {
            "blazeface"
        }
    }
}
