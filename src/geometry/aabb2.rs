use ncollide2d::bounding_volume::AABB;
use ncollide2d::na::{Point2, Vector2};

/// Axis aligned bounding box of a set of points, `None` if there are no points
pub fn points_aabb(points: &[Point2<f64>]) -> Option<AABB<f64>> {
    let first = points.first()?;
    let mut mins = *first;
    let mut maxs = *first;
    for p in points.iter().skip(1) {
        mins.x = mins.x.min(p.x);
        mins.y = mins.y.min(p.y);
        maxs.x = maxs.x.max(p.x);
        maxs.y = maxs.y.max(p.y);
    }

    Some(AABB::new(mins, maxs))
}

/// The largest distance from `center` to either side of the box, measured independently along
/// each axis. The box does not need to contain the center.
pub fn offsets_from(b: &AABB<f64>, center: &Point2<f64>) -> Vector2<f64> {
    Vector2::new(
        (b.mins.x - center.x).abs().max((b.maxs.x - center.x).abs()),
        (b.mins.y - center.y).abs().max((b.maxs.y - center.y).abs()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn sample() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.06),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, -0.04),
        ]
    }

    #[test]
    fn test_points_aabb() {
        let b = points_aabb(&sample()).unwrap();
        assert_relative_eq!(0.0, b.mins.x, epsilon = 1e-12);
        assert_relative_eq!(-0.04, b.mins.y, epsilon = 1e-12);
        assert_relative_eq!(1.0, b.maxs.x, epsilon = 1e-12);
        assert_relative_eq!(0.06, b.maxs.y, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_aabb() {
        assert!(points_aabb(&[]).is_none());
    }

    #[test_case((0.25, 0.0), (0.75, 0.06))]
    #[test_case((0.5, 0.0), (0.5, 0.06))]
    #[test_case((2.0, 1.0), (2.0, 1.04))]
    fn test_offsets(c: (f64, f64), e: (f64, f64)) {
        let b = points_aabb(&sample()).unwrap();
        let o = offsets_from(&b, &Point2::new(c.0, c.1));
        assert_relative_eq!(e.0, o.x, epsilon = 1e-12);
        assert_relative_eq!(e.1, o.y, epsilon = 1e-12);
    }
}
