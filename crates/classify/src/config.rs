use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which classification strategy to build, and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ClassifierConfig {
    OnDevice(OnDeviceConfig),
    Remote(RemoteConfig),
}

/// Memory order of the image tensor fed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    #[default]
    Nchw,
    Nhwc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnDeviceConfig {
    pub model_path: PathBuf,
    /// One label per line, optionally prefixed by its index.
    pub labels_path: PathBuf,
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    #[serde(default)]
    pub layout: TensorLayout,
    /// Label that means "accept".
    #[serde(default = "default_positive_label")]
    pub positive_label: String,
}

fn default_input_size() -> u32 {
    224
}

fn default_positive_label() -> String {
    "academic".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// multipart/form-data with the image in a `file` field.
    #[default]
    Multipart,
    /// JSON body `{ "image": "<base64>" }`.
    Base64Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    #[serde(default)]
    pub encoding: PayloadEncoding,
    /// Bound on connecting and uploading the request body.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Bound on the whole exchange, including a cold-started endpoint.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

fn default_response_timeout_ms() -> u64 {
    60_000
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            encoding: PayloadEncoding::default(),
            send_timeout_ms: default_send_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
