pub mod category;
pub mod classification;
pub mod geometry;
pub mod outcome;
pub mod thresholds;

pub use category::{CategoryDescriptor, CategoryError, CategoryKind, CategoryRegistry};
pub use classification::{ClassificationResult, ClassifyResponse};
pub use geometry::{Point, Quadrilateral};
pub use outcome::{RejectionReason, ValidationOutcome};
pub use thresholds::{AspectBand, Thresholds};
