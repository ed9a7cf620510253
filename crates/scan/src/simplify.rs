//! Polygon reduction for closed rings of edge pixels.

use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point;

type Pt = (f32, f32);

/// Reduce a closed ring to its dominant vertices.
///
/// The ring is split at the point farthest from `centroid` and the point
/// farthest from that one; each half is simplified independently and the
/// joined polygon is cleaned of near-straight vertices.
pub fn simplify_ring(ring: &[Pt], centroid: Pt, epsilon_ratio: f32) -> Vec<Pt> {
    if ring.len() < 4 {
        return ring.to_vec();
    }
    let epsilon = epsilon_ratio * perimeter(ring);
    if epsilon <= 0.0 {
        return Vec::new();
    }

    let start = farthest_from(ring, centroid);
    let rotated: Vec<Pt> = ring[start..].iter().chain(&ring[..start]).copied().collect();
    let split = farthest_from(&rotated, rotated[0]);
    if split == 0 {
        return Vec::new();
    }

    let mut second_half: Vec<Pt> = rotated[split..].to_vec();
    second_half.push(rotated[0]);

    let mut first = douglas_peucker(&rotated[..=split], epsilon);
    let mut second = douglas_peucker(&second_half, epsilon);
    first.pop();
    second.pop();
    first.append(&mut second);

    drop_flat_vertices(first, epsilon)
}

/// Closed-ring length.
pub fn perimeter(ring: &[Pt]) -> f32 {
    if ring.len() < 2 {
        return 0.0;
    }
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| distance(*a, *b))
        .sum()
}

/// Douglas-Peucker reduction of an open polyline. Endpoints are always kept.
///
/// Ring points sit on the pixel grid, so they round-trip through integer
/// points without loss.
pub fn douglas_peucker(points: &[Pt], epsilon: f32) -> Vec<Pt> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let curve: Vec<Point<i32>> = points
        .iter()
        .map(|&(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect();
    approximate_polygon_dp(&curve, epsilon as f64, false)
        .into_iter()
        .map(|p| (p.x as f32, p.y as f32))
        .collect()
}

/// Drop vertices lying within `epsilon` of the chord joining their neighbours.
pub fn drop_flat_vertices(mut polygon: Vec<Pt>, epsilon: f32) -> Vec<Pt> {
    loop {
        let n = polygon.len();
        if n <= 3 {
            return polygon;
        }
        let flat = (0..n).find(|&i| {
            let prev = polygon[(i + n - 1) % n];
            let next = polygon[(i + 1) % n];
            distance_to_chord(polygon[i], prev, next) < epsilon
        });
        match flat {
            Some(i) => {
                polygon.remove(i);
            }
            None => return polygon,
        }
    }
}

/// True when every turn has the same sign.
pub fn is_convex(polygon: &[Pt]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let (a, b, c) = (polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
        let cross = (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

fn farthest_from(points: &[Pt], origin: Pt) -> usize {
    points
        .iter()
        .enumerate()
        .fold((0, -1.0f32), |best, (i, p)| {
            let d = distance(*p, origin);
            if d > best.1 { (i, d) } else { best }
        })
        .0
}

fn distance(a: Pt, b: Pt) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn distance_to_chord(p: Pt, a: Pt, b: Pt) -> f32 {
    let len = distance(a, b);
    if len <= f32::EPSILON {
        return distance(p, a);
    }
    ((b.0 - a.0) * (a.1 - p.1) - (a.0 - p.0) * (b.1 - a.1)).abs() / len
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points along the outline of an axis-aligned rectangle, clockwise from top-left.
    fn rect_ring(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Pt> {
        let mut ring = Vec::new();
        let mut x = x0;
        while x < x1 {
            ring.push((x, y0));
            x += 1.0;
        }
        let mut y = y0;
        while y < y1 {
            ring.push((x1, y));
            y += 1.0;
        }
        let mut x = x1;
        while x > x0 {
            ring.push((x, y1));
            x -= 1.0;
        }
        let mut y = y1;
        while y > y0 {
            ring.push((x0, y));
            y -= 1.0;
        }
        ring
    }

    fn centroid(ring: &[Pt]) -> Pt {
        let n = ring.len() as f32;
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.0, sy + p.1));
        (sx / n, sy / n)
    }

    #[test]
    fn rectangle_ring_reduces_to_its_corners() {
        let ring = rect_ring(10.0, 20.0, 210.0, 140.0);
        let poly = simplify_ring(&ring, centroid(&ring), 0.02);
        assert_eq!(poly.len(), 4, "got {poly:?}");
        for corner in [(10.0, 20.0), (210.0, 20.0), (210.0, 140.0), (10.0, 140.0)] {
            assert!(poly.contains(&corner), "missing corner {corner:?} in {poly:?}");
        }
        assert!(is_convex(&poly));
    }

    #[test]
    fn circle_does_not_reduce_to_four_points() {
        let ring: Vec<Pt> = (0..360)
            .map(|d| {
                let t = (d as f32).to_radians();
                (100.0 + 50.0 * t.cos(), 100.0 + 50.0 * t.sin())
            })
            .collect();
        let poly = simplify_ring(&ring, (100.0, 100.0), 0.02);
        assert!(poly.len() > 4, "circle collapsed to {poly:?}");
    }

    #[test]
    fn douglas_peucker_keeps_only_endpoints_of_a_line() {
        let line: Vec<Pt> = (0..50).map(|i| (i as f32, 2.0 * i as f32)).collect();
        assert_eq!(douglas_peucker(&line, 1.0), vec![(0.0, 0.0), (49.0, 98.0)]);
    }

    #[test]
    fn douglas_peucker_keeps_a_sharp_bend() {
        let mut pts: Vec<Pt> = (0..=20).map(|i| (i as f32, 0.0)).collect();
        pts.extend((1..=20).map(|i| (20.0, i as f32)));
        assert_eq!(douglas_peucker(&pts, 1.0), vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0)]);
    }

    #[test]
    fn flat_vertices_are_removed() {
        let poly = vec![(0.0, 0.0), (50.0, 0.5), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
        let cleaned = drop_flat_vertices(poly, 2.0);
        assert_eq!(cleaned, vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
    }

    #[test]
    fn convexity() {
        assert!(is_convex(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
        assert!(!is_convex(&[(0.0, 0.0), (10.0, 0.0), (3.0, 3.0), (0.0, 10.0)]));
        assert!(!is_convex(&[(0.0, 0.0), (1.0, 1.0)]));
    }

    #[test]
    fn perimeter_of_square() {
        let sq = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!((perimeter(&sq) - 40.0).abs() < 1e-4);
    }
}
