use docgate_classify::ClassifyError;
use docgate_core::CategoryError;
use docgate_validate::ValidateError;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::DecisionMode;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Decision mode '{0:?}' needs a [classifier] section")]
    MissingClassifier(DecisionMode),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Validate(#[from] ValidateError),
    #[error("Classifier initialisation failed: {0}")]
    Classifier(#[from] ClassifyError),
    #[error("Validation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
