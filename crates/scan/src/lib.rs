//! Live scan-assist: finds the most document-like quadrilateral in a frame.
//!
//! The result is a preview aid only. `None` means "no guidance available" and
//! is never an error.

pub mod contours;
pub mod corners;
pub mod detector;
pub mod edges;
pub mod simplify;

pub use detector::{BoundaryConfig, BoundaryDetector};
