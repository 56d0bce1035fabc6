use imageproc::point::Point;

/// Euclidean distance between two points, in pixels.
pub fn distance(p1: &Point<f32>, p2: &Point<f32>) -> f32 {
    (p1.x - p2.x).hypot(p1.y - p2.y)
}

/// Relabels four corner points into the canonical order top-left, top-right,
/// bottom-right, bottom-left.
///
/// The corner with the minimum `x + y` is top-left and the maximum is
/// bottom-right; the minimum `y - x` is top-right and the maximum is
/// bottom-left. Returns `None` when the input does not have exactly four
/// points, which callers treat as "not a quadrilateral". Degenerate shapes
/// whose extremal indices coincide are relabeled as the classification falls
/// out, possibly assigning one input point to more than one corner.
pub fn reorder_quad(points: &[Point<f32>]) -> Option<[Point<f32>; 4]> {
    if points.len() != 4 {
        return None;
    }

    let sums: Vec<f32> = points.iter().map(|p| p.x + p.y).collect();
    let diffs: Vec<f32> = points.iter().map(|p| p.y - p.x).collect();

    let mut top_left = 0;
    let mut bottom_right = 0;
    let mut top_right = 0;
    let mut bottom_left = 0;
    for i in 1..4 {
        if sums[i] < sums[top_left] {
            top_left = i;
        }
        if sums[i] > sums[bottom_right] {
            bottom_right = i;
        }
        if diffs[i] < diffs[top_right] {
            top_right = i;
        }
        if diffs[i] > diffs[bottom_left] {
            bottom_left = i;
        }
    }

    Some([
        points[top_left],
        points[top_right],
        points[bottom_right],
        points[bottom_left],
    ])
}

/// Area enclosed by a closed contour, computed with the shoelace formula.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut doubled_area = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        doubled_area += f64::from(p.x) * f64::from(q.y) - f64::from(q.x) * f64::from(p.y);
    }
    doubled_area.abs() / 2.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point<f32>,
    pub radius: f32,
}

impl Circle {
    fn contains(&self, p: &Point<f32>) -> bool {
        distance(&self.center, p) <= self.radius + CONTAINS_TOLERANCE
    }
}

// Absorbs floating-point error when testing circle membership.
const CONTAINS_TOLERANCE: f32 = 1e-3;

/// Smallest circle containing all of the given points, or `None` for an
/// empty slice.
///
/// Incremental Welzl construction: grow the circle each time a point falls
/// outside it, pinning that point to the boundary and rebuilding over the
/// prefix already seen.
pub fn min_enclosing_circle(points: &[Point<f32>]) -> Option<Circle> {
    let first = points.first()?;
    let mut circle = Circle {
        center: *first,
        radius: 0.0,
    };
    for (i, p) in points.iter().enumerate().skip(1) {
        if !circle.contains(p) {
            circle = circle_with_boundary_point(&points[..i], p);
        }
    }
    Some(circle)
}

fn circle_with_boundary_point(points: &[Point<f32>], q: &Point<f32>) -> Circle {
    let mut circle = Circle {
        center: *q,
        radius: 0.0,
    };
    for (i, p) in points.iter().enumerate() {
        if !circle.contains(p) {
            circle = circle_with_two_boundary_points(&points[..i], p, q);
        }
    }
    circle
}

fn circle_with_two_boundary_points(
    points: &[Point<f32>],
    q1: &Point<f32>,
    q2: &Point<f32>,
) -> Circle {
    let mut circle = circle_from_two(q1, q2);
    for p in points {
        if !circle.contains(p) {
            circle = circle_from_three(q1, q2, p).unwrap_or_else(|| widest_pair_circle(q1, q2, p));
        }
    }
    circle
}

fn circle_from_two(a: &Point<f32>, b: &Point<f32>) -> Circle {
    let center = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    Circle {
        center,
        radius: distance(a, b) / 2.0,
    }
}

/// Circumcircle of three points, or `None` when they are collinear.
fn circle_from_three(a: &Point<f32>, b: &Point<f32>, c: &Point<f32>) -> Option<Circle> {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (bx, by) = (f64::from(b.x), f64::from(b.y));
    let (cx, cy) = (f64::from(c.x), f64::from(c.y));

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-9 {
        return None;
    }

    let a_sq = ax * ax + ay * ay;
    let b_sq = bx * bx + by * by;
    let c_sq = cx * cx + cy * cy;
    let ux = (a_sq * (by - cy) + b_sq * (cy - ay) + c_sq * (ay - by)) / d;
    let uy = (a_sq * (cx - bx) + b_sq * (ax - cx) + c_sq * (bx - ax)) / d;

    let center = Point::new(ux as f32, uy as f32);
    let radius = distance(&center, a);
    Some(Circle { center, radius })
}

/// Fallback for collinear triples: the diameter circle of the farthest pair
/// contains the third point.
fn widest_pair_circle(a: &Point<f32>, b: &Point<f32>, c: &Point<f32>) -> Circle {
    let candidates = [
        circle_from_two(a, b),
        circle_from_two(a, c),
        circle_from_two(b, c),
    ];
    let mut widest = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.radius > widest.radius {
            widest = *candidate;
        }
    }
    widest
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reorder_quad_rejects_wrong_point_counts() {
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 10.0),
        ];
        assert_eq!(reorder_quad(&triangle), None);

        let pentagon = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(12.0, 8.0),
            Point::new(5.0, 12.0),
            Point::new(-2.0, 8.0),
        ];
        assert_eq!(reorder_quad(&pentagon), None);
    }

    #[test]
    fn reorder_quad_is_idempotent_on_canonical_input() {
        let canonical = [
            Point::new(10.0, 10.0),
            Point::new(110.0, 12.0),
            Point::new(112.0, 115.0),
            Point::new(8.0, 112.0),
        ];
        assert_eq!(reorder_quad(&canonical), Some(canonical));
    }

    #[test]
    fn reorder_quad_relabels_reversed_corners() {
        let reversed = vec![
            Point::new(112.0, 115.0),
            Point::new(8.0, 112.0),
            Point::new(10.0, 10.0),
            Point::new(110.0, 12.0),
        ];
        let expected = [
            Point::new(10.0, 10.0),
            Point::new(110.0, 12.0),
            Point::new(112.0, 115.0),
            Point::new(8.0, 112.0),
        ];
        assert_eq!(reorder_quad(&reversed), Some(expected));
    }

    #[test]
    fn contour_area_of_a_square() {
        let square = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert!((contour_area(&square) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn contour_area_of_degenerate_contours_is_zero() {
        assert_eq!(contour_area(&[]), 0.0);
        assert_eq!(contour_area(&[Point::new(3, 4)]), 0.0);
        assert_eq!(contour_area(&[Point::new(3, 4), Point::new(8, 9)]), 0.0);
    }

    #[test]
    fn min_enclosing_circle_of_nothing_is_none() {
        assert_eq!(min_enclosing_circle(&[]), None);
    }

    #[test]
    fn min_enclosing_circle_of_one_point_has_zero_radius() {
        let circle = min_enclosing_circle(&[Point::new(5.0, 7.0)]).unwrap();
        assert_eq!(circle.center, Point::new(5.0, 7.0));
        assert_eq!(circle.radius, 0.0);
    }

    #[test]
    fn min_enclosing_circle_of_two_points_spans_them() {
        let circle =
            min_enclosing_circle(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        assert!(distance(&circle.center, &Point::new(5.0, 0.0)) < 1e-3);
        assert!((circle.radius - 5.0).abs() < 1e-3);
    }

    #[test]
    fn min_enclosing_circle_of_square_corners_is_the_circumcircle() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        let circle = min_enclosing_circle(&corners).unwrap();
        assert!(distance(&circle.center, &Point::new(1.0, 1.0)) < 1e-2);
        assert!((circle.radius - 2.0_f32.sqrt()).abs() < 1e-2);
    }

    proptest! {
        #[test]
        fn reorder_quad_is_invariant_under_permutation(
            x in 10.0f32..500.0,
            y in 10.0f32..500.0,
            w in 50.0f32..400.0,
            h in 50.0f32..400.0,
            jitter in proptest::collection::vec(-5.0f32..5.0, 8),
            permutation in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
        ) {
            // Jitter small relative to the side lengths keeps the four
            // extremal indices distinct.
            let canonical = [
                Point::new(x + jitter[0], y + jitter[1]),
                Point::new(x + w + jitter[2], y + jitter[3]),
                Point::new(x + w + jitter[4], y + h + jitter[5]),
                Point::new(x + jitter[6], y + h + jitter[7]),
            ];
            let shuffled: Vec<Point<f32>> =
                permutation.iter().map(|&i| canonical[i]).collect();
            prop_assert_eq!(reorder_quad(&shuffled), Some(canonical));
        }

        #[test]
        fn min_enclosing_circle_contains_every_point(
            points in proptest::collection::vec((0.0f32..300.0, 0.0f32..300.0), 1..40),
        ) {
            let points: Vec<Point<f32>> =
                points.into_iter().map(|(x, y)| Point::new(x, y)).collect();
            let circle = min_enclosing_circle(&points).unwrap();
            for p in &points {
                prop_assert!(distance(&circle.center, p) <= circle.radius + 1e-2);
            }
        }
    }
}
