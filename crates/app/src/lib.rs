//! Document intake: boundary detection for the capture screen, and the
//! accept/reject decision for an uploaded image and its selected category.

pub mod config;
pub mod error;
pub mod intake;

pub use config::{DecisionMode, IntakeConfig};
pub use error::IntakeError;
pub use intake::DocumentIntake;
