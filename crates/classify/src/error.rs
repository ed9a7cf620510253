use thiserror::Error;

/// Failures that stop a classifier from being built, plus per-image failures
/// that the strategies fold into a rejected result.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Image could not be decoded: {0}")]
    Decode(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Why a remote classification attempt produced no usable answer.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Classification endpoint timed out")]
    Timeout,
    #[error("Upload to classification endpoint timed out")]
    UploadTimeout,
    #[error("Classification endpoint returned HTTP {0}")]
    Status(u16),
    #[error("Unparsable response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}
