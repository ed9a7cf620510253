pub mod blazeface;
pub mod extract;
pub mod face;
pub mod preprocess;
pub mod recognizer;
pub mod types;

#[cfg(feature = "onnx")]
pub use blazeface::BlazeFaceDetector;
pub use extract::Extractor;
pub use face::{FaceDetector, FaceError, MockFaceDetector};
pub use preprocess::{prepare_for_ocr, PreprocessError, OCR_MAX_WIDTH, OCR_MIN_WIDTH};
pub use recognizer::{MockRecognizer, OcrError, TextRecognizer};
pub use types::{Extraction, FaceBox, FaceScan, Rotation};
