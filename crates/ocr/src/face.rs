use image::DynamicImage;
use thiserror::Error;

use crate::types::FaceBox;

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Face detector failed: {0}")]
    Detector(String),
    #[error("Face model could not be loaded: {0}")]
    ModelLoad(String),
}

/// Pluggable face-detection backend.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, FaceError>;

    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Reports a fixed number of faces, or a fixed failure.
pub struct MockFaceDetector {
    faces: usize,
    fail: bool,
}

impl MockFaceDetector {
    pub fn with_faces(faces: usize) -> Self {
        Self { faces, fail: false }
    }

    pub fn failing() -> Self {
        Self { faces: 0, fail: true }
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, FaceError> {
        if self.fail {
            return Err(FaceError::Detector("mock failure".into()));
        }
        let w = image.width() as f32 / (self.faces.max(1) as f32);
        Ok((0..self.faces)
            .map(|i| FaceBox {
                x: i as f32 * w,
                y: 0.0,
                width: w,
                height: image.height() as f32 / 2.0,
                confidence: 0.9,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
