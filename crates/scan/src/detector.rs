use docgate_core::{Point, Quadrilateral};
use image::imageops::FilterType;
use image::DynamicImage;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

use crate::contours::{find_contours, Contour};
use crate::corners::{angle_score, order_corners};
use crate::edges::{bridge_gaps, detect_edges};
use crate::simplify::{is_convex, simplify_ring};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Frames wider than this are downsampled before edge detection.
    pub working_width: u32,
    pub blur_sigma: f32,
    /// Edge components with fewer pixels are ignored.
    pub min_contour_len: usize,
    /// Simplification tolerance as a fraction of the ring perimeter.
    pub epsilon_ratio: f32,
    /// Smallest share of the working frame a candidate may cover.
    pub min_area_fraction: f32,
    pub angle_weight: f32,
    pub area_weight: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            working_width: 800,
            blur_sigma: 1.4,
            min_contour_len: 40,
            epsilon_ratio: 0.02,
            min_area_fraction: 0.10,
            angle_weight: 0.6,
            area_weight: 0.4,
        }
    }
}

/// Finds the most document-like quadrilateral in a camera frame.
///
/// Stateless apart from its configuration; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    config: BoundaryConfig,
}

struct Candidate {
    quad: Quadrilateral,
    score: f32,
}

impl BoundaryDetector {
    pub fn new(config: BoundaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    /// Undecodable input yields `None`.
    pub fn detect_bytes(&self, bytes: &[u8]) -> Option<Quadrilateral> {
        match image::load_from_memory(bytes) {
            Ok(img) => self.detect(&img),
            Err(e) => {
                tracing::debug!("Boundary detection skipped, frame did not decode: {e}");
                None
            }
        }
    }

    pub fn detect(&self, image: &DynamicImage) -> Option<Quadrilateral> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return None;
        }

        let scale = if width > self.config.working_width && self.config.working_width > 0 {
            self.config.working_width as f32 / width as f32
        } else {
            1.0
        };
        let working = if scale < 1.0 {
            let h = ((height as f32 * scale).round() as u32).max(1);
            image.resize_exact(self.config.working_width, h, FilterType::Triangle)
        } else {
            image.clone()
        };

        let gray = working.to_luma8();
        let blurred = if self.config.blur_sigma > 0.0 {
            gaussian_blur_f32(&gray, self.config.blur_sigma)
        } else {
            gray
        };
        let edges = bridge_gaps(&detect_edges(&blurred));
        let frame_area = frame_area(working.width(), working.height());

        let best = find_contours(&edges, self.config.min_contour_len)
            .iter()
            .filter_map(|c| self.candidate(c, frame_area))
            .max_by(|a, b| a.score.total_cmp(&b.score))?;

        tracing::debug!(score = best.score, "Document boundary found");
        Some(best.quad.scaled(1.0 / scale))
    }

    fn candidate(&self, contour: &Contour, frame_area: f32) -> Option<Candidate> {
        let polygon = simplify_ring(&contour.ring(), contour.centroid(), self.config.epsilon_ratio);
        if polygon.len() != 4 || !is_convex(&polygon) {
            return None;
        }

        let quad = order_corners([
            Point::new(polygon[0].0, polygon[0].1),
            Point::new(polygon[1].0, polygon[1].1),
            Point::new(polygon[2].0, polygon[2].1),
            Point::new(polygon[3].0, polygon[3].1),
        ]);
        let area_fraction = quad.area() / frame_area;
        if area_fraction < self.config.min_area_fraction {
            return None;
        }

        let score = self.config.angle_weight * angle_score(&quad)
            + self.config.area_weight * area_fraction.min(1.0);
        tracing::trace!(score, area_fraction, "Quadrilateral candidate");
        Some(Candidate { quad, score })
    }
}

/// Pixel area of a frame. Tall or wide frames overflow a `u32` product.
fn frame_area(width: u32, height: u32) -> f32 {
    width as f32 * height as f32
}
