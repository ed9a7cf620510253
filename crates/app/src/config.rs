use docgate_classify::ClassifierConfig;
use docgate_core::{CategoryDescriptor, CategoryRegistry, Thresholds};
use docgate_scan::BoundaryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::IntakeError;

/// Which source decides acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Rejection cascade only.
    #[default]
    Cascade,
    /// Signature check, then the classifier alone.
    Classifier,
    /// Cascade first; an accepted image must also pass the classifier.
    CascadeThenClassifier,
}

impl DecisionMode {
    pub fn needs_classifier(self) -> bool {
        !matches!(self, DecisionMode::Cascade)
    }
}

/// Everything a deployment tunes, as one TOML document.
///
/// ```toml
/// decision = "cascade_then_classifier"
///
/// [thresholds]
/// min_width = 400
///
/// [classifier]
/// strategy = "remote"
/// endpoint = "https://classify.example.org/classify"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub decision: DecisionMode,
    pub thresholds: Thresholds,
    pub boundary: BoundaryConfig,
    pub classifier: Option<ClassifierConfig>,
    /// Replaces the built-in category table when present.
    pub categories: Option<Vec<CategoryDescriptor>>,
}

impl IntakeConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, IntakeError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &Path) -> Result<Self, IntakeError> {
        let content = std::fs::read_to_string(path).map_err(|source| IntakeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn registry(&self) -> Result<CategoryRegistry, IntakeError> {
        match &self.categories {
            Some(categories) => Ok(CategoryRegistry::new(categories.clone())?),
            None => Ok(CategoryRegistry::builtin()),
        }
    }
}
