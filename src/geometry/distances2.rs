use itertools::Itertools;
use ncollide2d::na::{Point2, RealField, Vector2};

/// Return the distance between two 2D points
pub fn dist<N: RealField + Copy>(a: &Point2<N>, b: &Point2<N>) -> N {
    (a - b).norm()
}

pub fn mid_point<N: RealField + Copy>(a: &Point2<N>, b: &Point2<N>) -> Point2<N> {
    Point2::from((a.coords + b.coords) / (N::one() + N::one()))
}

pub fn signed_angle<N: RealField + Copy>(v1: &Vector2<N>, v2: &Vector2<N>) -> N {
    (v1.x * v2.y - v1.y * v2.x).atan2(v1.x * v2.x + v1.y * v2.y)
}

/// Sum of the distances between consecutive points, zero for fewer than two points
pub fn polyline_length(points: &[Point2<f64>]) -> f64 {
    points.iter().tuple_windows().map(|(a, b)| dist(a, b)).sum()
}

/// Shoelace area of the closed polygon through the points. Positive for counter-clockwise
/// ordering, negative for clockwise.
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice = 0.0;
    for (a, b) in points.iter().circular_tuple_windows() {
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}
