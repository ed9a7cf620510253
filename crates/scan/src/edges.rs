use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::dilate;

/// Fractions of the mean gradient magnitude used as hysteresis thresholds.
pub const LOW_THRESHOLD_RATIO: f32 = 0.5;
pub const HIGH_THRESHOLD_RATIO: f32 = 1.5;

/// Binary edge map from a (blurred) grayscale image.
///
/// Canny with hysteresis thresholds derived from the mean Sobel magnitude, so
/// the cut adapts to the contrast of the frame. An image with no gradient at
/// all has no edges.
pub fn detect_edges(gray: &GrayImage) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return GrayImage::new(w, h);
    }

    let mean = mean_gradient(gray);
    if mean <= f32::EPSILON {
        return GrayImage::new(w, h);
    }
    let low = LOW_THRESHOLD_RATIO * mean;
    let high = HIGH_THRESHOLD_RATIO * mean;
    tracing::trace!(mean, low, high, "Gradient thresholds");

    canny(gray, low, high)
}

/// Mean Sobel gradient magnitude over the whole frame.
pub fn mean_gradient(gray: &GrayImage) -> f32 {
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let total: f64 = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(dx, dy)| {
            let (dx, dy) = (dx[0] as f64, dy[0] as f64);
            (dx * dx + dy * dy).sqrt()
        })
        .sum();
    let count = gray.width() as f64 * gray.height() as f64;
    if count == 0.0 {
        return 0.0;
    }
    (total / count) as f32
}

/// Close one-pixel breaks (typically at corners) so a document outline stays a
/// single component.
pub fn bridge_gaps(edges: &GrayImage) -> GrayImage {
    dilate(edges, Norm::LInf, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    const EDGE: u8 = 255;

    fn is_edge(edges: &GrayImage, x: u32, y: u32) -> bool {
        edges.get_pixel(x, y)[0] == EDGE
    }

    fn count_edges(edges: &GrayImage) -> usize {
        edges.pixels().filter(|p| p[0] == EDGE).count()
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = GrayImage::from_pixel(50, 40, Luma([128]));
        assert_eq!(mean_gradient(&img), 0.0);
        assert_eq!(count_edges(&detect_edges(&img)), 0);
    }

    #[test]
    fn vertical_step_yields_vertical_edge() {
        let img: GrayImage = ImageBuffer::from_fn(60, 40, |x, _| Luma([if x < 30 { 20 } else { 220 }]));
        let edges = detect_edges(&img);
        assert!(count_edges(&edges) > 0);
        for (x, _, p) in edges.enumerate_pixels() {
            if p[0] == EDGE {
                assert!((27..=32).contains(&x), "edge pixel at unexpected column {x}");
            }
        }
        // The ridge runs the interior height.
        for y in 2..38 {
            assert!((27..=32).any(|x| is_edge(&edges, x, y)), "gap at row {y}");
        }
    }

    #[test]
    fn faint_step_is_still_found() {
        // Thresholds follow the frame's own contrast, so a low-contrast step
        // is an edge just like a strong one.
        let img: GrayImage = ImageBuffer::from_fn(60, 40, |x, _| Luma([if x < 30 { 120 } else { 135 }]));
        assert!(count_edges(&detect_edges(&img)) > 0);
    }

    #[test]
    fn tiny_image_has_no_edges() {
        let img = GrayImage::from_pixel(2, 2, Luma([0]));
        assert_eq!(count_edges(&detect_edges(&img)), 0);
    }

    #[test]
    fn bridging_closes_single_pixel_gap() {
        let mut edges = GrayImage::new(20, 5);
        for x in (0..20).filter(|&x| x != 10) {
            edges.put_pixel(x, 2, Luma([EDGE]));
        }
        assert!(!is_edge(&edges, 10, 2));
        let bridged = bridge_gaps(&edges);
        assert!(is_edge(&bridged, 10, 2));
    }
}
