use docgate_core::{Point, Quadrilateral};

/// Put four unordered corners into top-left, top-right, bottom-right,
/// bottom-left order.
///
/// Corners are sorted by angle around their centroid (clockwise on screen,
/// since y grows downward) and rotated so the smallest x+y comes first. When
/// the largest x+y does not land opposite that anchor, which happens for
/// strongly skewed shapes, the sum/difference extremes are used directly.
pub fn order_corners(points: [Point; 4]) -> Quadrilateral {
    let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;

    let mut sorted = points;
    sorted.sort_by(|a, b| {
        let ta = (a.y - cy).atan2(a.x - cx);
        let tb = (b.y - cy).atan2(b.x - cx);
        ta.total_cmp(&tb)
    });

    let tl = index_of_extreme(&sorted, |p| p.x + p.y, false);
    let br = index_of_extreme(&sorted, |p| p.x + p.y, true);

    if (tl + 2) % 4 != br {
        let picks = [
            index_of_extreme(&points, |p| p.x + p.y, false),
            index_of_extreme(&points, |p| p.y - p.x, false),
            index_of_extreme(&points, |p| p.x + p.y, true),
            index_of_extreme(&points, |p| p.y - p.x, true),
        ];
        let distinct = (0..4).all(|i| (i + 1..4).all(|j| picks[i] != picks[j]));
        if distinct {
            return Quadrilateral::new(points[picks[0]], points[picks[1]], points[picks[2]], points[picks[3]]);
        }
        // Extremes collide on a 45° diamond; the angular order is still valid.
    }

    sorted.rotate_left(tl);
    Quadrilateral::new(sorted[0], sorted[1], sorted[2], sorted[3])
}

/// Interior angle at each corner, in degrees.
pub fn interior_angles(quad: &Quadrilateral) -> [f32; 4] {
    let c = quad.corners();
    let mut angles = [0.0f32; 4];
    for (i, angle) in angles.iter_mut().enumerate() {
        let prev = c[(i + 3) % 4];
        let next = c[(i + 1) % 4];
        let (ax, ay) = (prev.x - c[i].x, prev.y - c[i].y);
        let (bx, by) = (next.x - c[i].x, next.y - c[i].y);
        let norm = (ax.hypot(ay) * bx.hypot(by)).max(f32::EPSILON);
        let cos = ((ax * bx + ay * by) / norm).clamp(-1.0, 1.0);
        *angle = cos.acos().to_degrees();
    }
    angles
}

/// 1.0 for a perfect rectangle, falling linearly with the mean deviation of
/// the corners from a right angle.
pub fn angle_score(quad: &Quadrilateral) -> f32 {
    let deviation = interior_angles(quad)
        .iter()
        .map(|a| (a - 90.0).abs())
        .sum::<f32>()
        / 4.0;
    (1.0 - deviation / 90.0).max(0.0)
}

fn index_of_extreme(points: &[Point; 4], key: impl Fn(&Point) -> f32, max: bool) -> usize {
    let mut best = 0;
    for i in 1..4 {
        let (k, b) = (key(&points[i]), key(&points[best]));
        if (max && k > b) || (!max && k < b) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn shuffled_rectangle_is_ordered() {
        let q = order_corners([p(300.0, 200.0), p(10.0, 20.0), p(10.0, 200.0), p(300.0, 20.0)]);
        assert_eq!(q.top_left, p(10.0, 20.0));
        assert_eq!(q.top_right, p(300.0, 20.0));
        assert_eq!(q.bottom_right, p(300.0, 200.0));
        assert_eq!(q.bottom_left, p(10.0, 200.0));
        assert!(q.signed_area() > 0.0);
    }

    #[test]
    fn every_permutation_gives_the_same_order() {
        let corners = [p(50.0, 40.0), p(420.0, 60.0), p(400.0, 330.0), p(30.0, 300.0)];
        let expected = Quadrilateral::new(corners[0], corners[1], corners[2], corners[3]);
        let mut input = corners;
        for _ in 0..4 {
            input.rotate_left(1);
            assert_eq!(order_corners(input), expected);
            let mut reversed = input;
            reversed.reverse();
            assert_eq!(order_corners(reversed), expected);
        }
    }

    #[test]
    fn rotated_square_keeps_positive_winding() {
        // A diamond: the x+y anchors are not opposite after the angle sort.
        let q = order_corners([p(50.0, 0.0), p(100.0, 50.0), p(50.0, 100.0), p(0.0, 50.0)]);
        assert!(q.signed_area() > 0.0);
        assert!((q.signed_area() - 5000.0).abs() < 1e-3);
        assert_eq!(q.top_left, p(50.0, 0.0));
        assert_eq!(q.bottom_right, p(50.0, 100.0));
    }

    #[test]
    fn tilted_card_is_ordered() {
        let q = order_corners([p(0.0, 40.0), p(100.0, 0.0), p(140.0, 90.0), p(30.0, 120.0)]);
        assert_eq!(q.top_left, p(0.0, 40.0));
        assert_eq!(q.top_right, p(100.0, 0.0));
        assert_eq!(q.bottom_right, p(140.0, 90.0));
        assert_eq!(q.bottom_left, p(30.0, 120.0));
        assert!(q.signed_area() > 0.0);
    }

    #[test]
    fn rectangle_scores_one() {
        let q = Quadrilateral::new(p(0.0, 0.0), p(100.0, 0.0), p(100.0, 50.0), p(0.0, 50.0));
        for a in interior_angles(&q) {
            assert!((a - 90.0).abs() < 1e-3);
        }
        assert!((angle_score(&q) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn skewed_shape_scores_lower() {
        let rect = Quadrilateral::new(p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0));
        let skewed = Quadrilateral::new(p(0.0, 0.0), p(100.0, 0.0), p(160.0, 100.0), p(60.0, 100.0));
        let s = angle_score(&skewed);
        assert!(s < angle_score(&rect));
        assert!(s > 0.0);
        let sum: f32 = interior_angles(&skewed).iter().sum();
        assert!((sum - 360.0).abs() < 1e-2);
    }
}
