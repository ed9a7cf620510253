//! Binary "is this an academic document" classification, either on-device
//! through an inference engine or through a remote HTTP endpoint.

pub mod client;
pub mod config;
pub mod error;
pub mod on_device;
pub mod remote;

pub use client::ClassificationClient;
pub use config::{ClassifierConfig, OnDeviceConfig, PayloadEncoding, RemoteConfig, TensorLayout};
pub use error::{ClassifyError, RemoteError};
pub use on_device::{InferenceEngine, OnDeviceClassifier, OnDeviceSettings};
pub use remote::{RemoteClassifier, SCORE_SATURATION};

#[cfg(feature = "onnx")]
pub use on_device::ort_engine::OrtEngine;
