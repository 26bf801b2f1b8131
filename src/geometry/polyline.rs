use crate::geometry::distances2::dist;
use crate::geometry::line2::Line2;
use ncollide2d::na::{Point2, Unit, Vector2};
use ncollide2d::query::Ray;

pub type UnitVec2 = Unit<Vector2<f64>>;

/// Copies the points, removing adjacent duplicates and a trailing point which repeats the first
/// one, so that the result describes an implicitly closed chain with no zero length edges.
pub fn cleaned_points(points: &[Point2<f64>], tol: f64) -> Vec<Point2<f64>> {
    let mut vertices = points.to_vec();
    vertices.dedup_by(|a, b| dist(a, b) <= tol);

    while vertices.len() > 1 && dist(&vertices[0], &vertices[vertices.len() - 1]) <= tol {
        vertices.pop();
    }

    vertices
}

/// Estimates the outward normal of a clockwise ordered closed contour at a vertex from the
/// chord between its two neighbors. Travelling clockwise, the outside of the contour is on the
/// left hand side of the direction of travel.
pub fn outward_normal(prev: &Point2<f64>, next: &Point2<f64>) -> Option<UnitVec2> {
    let chord = Ray::new(*prev, next - prev);
    Unit::try_new(chord.orthogonal(), 1e-14)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn sample_points(p: &[(f64, f64)]) -> Vec<Point2<f64>> {
        p.iter().map(|(a, b)| Point2::new(*a, *b)).collect()
    }

    #[test_case(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0)], 3)]
    #[test_case(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)], 3)]
    #[test_case(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (0.0, 0.0), (0.0, 0.0)], 2)]
    #[test_case(&[(0.0, 0.0), (1e-9, 0.0)], 1)]
    fn test_cleaned_points(p: &[(f64, f64)], e: usize) {
        assert_eq!(e, cleaned_points(&sample_points(p), 1e-6).len());
    }

    #[test]
    fn normal_on_clockwise_square() {
        // Clockwise square, walking across the top edge from left to right
        let n = outward_normal(&Point2::new(0.0, 1.0), &Point2::new(1.0, 1.0)).unwrap();
        assert_relative_eq!(0.0, n.x, epsilon = 1e-12);
        assert_relative_eq!(1.0, n.y, epsilon = 1e-12);

        // ...and across the bottom edge from right to left
        let n = outward_normal(&Point2::new(1.0, 0.0), &Point2::new(0.0, 0.0)).unwrap();
        assert_relative_eq!(-1.0, n.y, epsilon = 1e-12);
    }

    #[test]
    fn coincident_neighbors_have_no_normal() {
        let p = Point2::new(0.3, 0.2);
        assert!(outward_normal(&p, &p).is_none());
    }
}
