use docgate_core::ClassificationResult;
use std::sync::Arc;

use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::on_device::{InferenceEngine, OnDeviceClassifier, OnDeviceSettings};
use crate::remote::RemoteClassifier;

pub type DynOnDevice = OnDeviceClassifier<Box<dyn InferenceEngine>>;

/// The configured classification strategy.
pub enum ClassificationClient {
    OnDevice(Arc<DynOnDevice>),
    Remote(RemoteClassifier),
}

impl ClassificationClient {
    /// Build the strategy named by `config`. Model and label problems surface
    /// here, not on the first request.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifyError> {
        match config {
            ClassifierConfig::Remote(remote) => Ok(Self::Remote(RemoteClassifier::new(remote.clone())?)),
            ClassifierConfig::OnDevice(on_device) => Self::load_on_device(on_device),
        }
    }

    pub fn on_device(
        engine: Box<dyn InferenceEngine>,
        labels: Vec<String>,
        settings: OnDeviceSettings,
    ) -> Result<Self, ClassifyError> {
        Ok(Self::OnDevice(Arc::new(OnDeviceClassifier::new(engine, labels, settings)?)))
    }

    #[cfg(feature = "onnx")]
    fn load_on_device(config: &crate::OnDeviceConfig) -> Result<Self, ClassifyError> {
        let engine: Box<dyn InferenceEngine> = Box::new(crate::OrtEngine::load(&config.model_path)?);
        let classifier = OnDeviceClassifier::from_label_file(engine, &config.labels_path, config.into())?;
        Ok(Self::OnDevice(Arc::new(classifier)))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_on_device(config: &crate::OnDeviceConfig) -> Result<Self, ClassifyError> {
        Err(ClassifyError::ModelLoad(format!(
            "cannot load {}: built without the `onnx` feature",
            config.model_path.display()
        )))
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            ClassificationClient::OnDevice(_) => "on_device",
            ClassificationClient::Remote(_) => "remote",
        }
    }

    /// Never fails; problems come back as a rejected result.
    pub async fn classify(&self, image_bytes: &[u8]) -> ClassificationResult {
        match self {
            ClassificationClient::Remote(remote) => remote.classify(image_bytes).await,
            ClassificationClient::OnDevice(classifier) => {
                let classifier = Arc::clone(classifier);
                let bytes = image_bytes.to_vec();
                tokio::task::spawn_blocking(move || classifier.classify(&bytes))
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!("On-device classification task failed: {e}");
                        ClassificationResult::rejected(format!("classification task failed: {e}"))
                    })
            }
        }
    }
}
