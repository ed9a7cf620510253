use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::BTreeMap;

/// Angular resolution of [`Contour::ring`] (half a degree).
const RING_BINS: usize = 720;

/// One 8-connected group of edge pixels, in raster order.
#[derive(Debug, Clone)]
pub struct Contour {
    pub pixels: Vec<(f32, f32)>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn centroid(&self) -> (f32, f32) {
        if self.pixels.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.pixels.len() as f32;
        let (sx, sy) = self
            .pixels
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), &(x, y)| (sx + x, sy + y));
        (sx / n, sy / n)
    }

    /// Outer ring of the contour: pixels ordered by angle around the centroid,
    /// keeping only the farthest pixel in each angular bin so a thick edge band
    /// collapses to a single closed line.
    pub fn ring(&self) -> Vec<(f32, f32)> {
        let (cx, cy) = self.centroid();
        let mut bins: Vec<Option<(f32, (f32, f32))>> = vec![None; RING_BINS];
        for &(x, y) in &self.pixels {
            let (dx, dy) = (x - cx, y - cy);
            let theta = dy.atan2(dx) + std::f32::consts::PI;
            let bin = ((theta / std::f32::consts::TAU) * RING_BINS as f32) as usize % RING_BINS;
            let r2 = dx * dx + dy * dy;
            match bins[bin] {
                Some((best, _)) if best >= r2 => {}
                _ => bins[bin] = Some((r2, (x, y))),
            }
        }
        bins.into_iter().flatten().map(|(_, p)| p).collect()
    }
}

/// Connected components of the edge map with at least `min_len` pixels.
///
/// Components are returned in the raster order of their first pixel.
pub fn find_contours(edges: &GrayImage, min_len: usize) -> Vec<Contour> {
    let labels = connected_components(edges, Connectivity::Eight, Luma([0u8]));

    let mut groups: BTreeMap<u32, Vec<(f32, f32)>> = BTreeMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        if label[0] == 0 {
            continue;
        }
        groups.entry(label[0]).or_default().push((x as f32, y as f32));
    }

    let mut contours: Vec<Contour> = groups
        .into_values()
        .filter(|pixels| pixels.len() >= min_len)
        .map(|pixels| Contour { pixels })
        .collect();
    contours.sort_by(|a, b| {
        let (ax, ay) = a.pixels[0];
        let (bx, by) = b.pixels[0];
        ay.total_cmp(&by).then(ax.total_cmp(&bx))
    });

    tracing::trace!(count = contours.len(), "Contours found");
    contours
}
