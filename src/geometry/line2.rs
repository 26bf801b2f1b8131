use crate::errors::{MeshError, MeshResult};
use ncollide2d::na::{Point2, Vector2};
use ncollide2d::query::Ray;

/// Determinants below this fraction of the product of the direction norms are treated as
/// parallel
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// A parameterized 2D line, `origin + t * dir`
pub trait Line2 {
    fn dir(&self) -> Vector2<f64>;

    fn at(&self, t: f64) -> Point2<f64>;

    /// The direction rotated a quarter turn counter-clockwise, which is the left hand side of the
    /// direction of travel
    fn orthogonal(&self) -> Vector2<f64> {
        let d = self.dir();
        Vector2::new(-d.y, d.x)
    }
}

impl Line2 for Ray<f64> {
    fn dir(&self) -> Vector2<f64> {
        self.dir
    }

    fn at(&self, t: f64) -> Point2<f64> {
        self.point_at(t)
    }
}

/// Solves `a.origin + t0 * a.dir = b.origin + t1 * b.dir` and returns `(t0, t1)`. Rays whose
/// directions are parallel (or either of which has a zero direction) give a `DegenerateGeometry`
/// error, which callers are expected to replace with a fallback.
pub fn intersect_rays(a: &Ray<f64>, b: &Ray<f64>) -> MeshResult<(f64, f64)> {
    let det = a.dir.x * b.dir.y - a.dir.y * b.dir.x;
    let scale = a.dir.norm() * b.dir.norm();
    if scale == 0.0 || !(det.abs() > PARALLEL_EPSILON * scale) {
        return Err(MeshError::DegenerateGeometry(format!(
            "rays from ({:.6}, {:.6}) and ({:.6}, {:.6}) are parallel",
            a.origin.x, a.origin.y, b.origin.x, b.origin.y
        )));
    }

    let dx = b.origin.x - a.origin.x;
    let dy = b.origin.y - a.origin.y;

    Ok((
        (dx * b.dir.y - dy * b.dir.x) / det,
        (dx * a.dir.y - dy * a.dir.x) / det,
    ))
}

/// True when segments `a` and `b` cross at a point strictly inside both. Segments that only touch,
/// including at a shared end point, do not cross.
pub fn segments_cross(a: (&Point2<f64>, &Point2<f64>), b: (&Point2<f64>, &Point2<f64>)) -> bool {
    let side = |p: &Point2<f64>, q: &Point2<f64>, r: &Point2<f64>| {
        let u = q - p;
        let v = r - p;
        u.x * v.y - u.y * v.x
    };

    let (a0, a1) = a;
    let (b0, b1) = b;
    side(a0, a1, b0) * side(a0, a1, b1) < 0.0 && side(b0, b1, a0) * side(b0, b1, a1) < 0.0
}

/// Intersection point of two rays, if they are not parallel
pub fn intersection_point(a: &Ray<f64>, b: &Ray<f64>) -> MeshResult<Point2<f64>> {
    intersect_rays(a, b).map(|(t0, _)| a.point_at(t0))
}

/// Intersection point of two rays, or the value of `fallback` when they are parallel. The
/// substitution is logged since it usually means the resulting mesh is less orthogonal than it
/// could be.
pub fn intersection_or_else<F>(a: &Ray<f64>, b: &Ray<f64>, what: &str, fallback: F) -> Point2<f64>
where
    F: FnOnce() -> Point2<f64>,
{
    match intersection_point(a, b) {
        Ok(p) => p,
        Err(e) => {
            let p = fallback();
            log::warn!("{}: {}, using ({:.6}, {:.6}) instead", what, e, p.x, p.y);
            p
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn ray(v: (f64, f64, f64, f64)) -> Ray<f64> {
        Ray::new(Point2::new(v.0, v.1), Vector2::new(v.2, v.3))
    }

    #[test_case((0.0, 0.0, 0.0, 1.0), (1.0, 1.0, 1.0, 0.0), (1.0, -1.0))]
    #[test_case((0.0, 0.0, 1.0, 1.0), (2.0, 0.0, -1.0, 1.0), (1.0, 1.0))]
    #[test_case((0.0, 0.0, 2.0, 0.0), (1.0, 3.0, 0.0, -1.0), (0.5, 3.0))]
    fn intersection_parameters(av: (f64, f64, f64, f64), bv: (f64, f64, f64, f64), p: (f64, f64)) {
        let (t0, t1) = intersect_rays(&ray(av), &ray(bv)).unwrap();

        assert_relative_eq!(p.0, t0, epsilon = 1.0e-9);
        assert_relative_eq!(p.1, t1, epsilon = 1.0e-9);
    }

    #[test]
    fn crossing_diagonals_meet_at_one_one() {
        let a = ray((0.0, 0.0, 1.0, 1.0));
        let b = ray((2.0, 0.0, -1.0, 1.0));
        let p = intersection_point(&a, &b).unwrap();

        assert_relative_eq!(1.0, p.x, epsilon = 1.0e-12);
        assert_relative_eq!(1.0, p.y, epsilon = 1.0e-12);
        assert_relative_eq!(p.x, b.at(1.0).x, epsilon = 1.0e-12);
    }

    #[test_case((0.0, 0.0, 1.0, 1.0), (2.0, 0.0, 2.0, 2.0))]
    #[test_case((0.0, 0.0, 1.0, 0.0), (0.0, 1.0, -3.0, 0.0))]
    #[test_case((0.0, 0.0, 0.0, 0.0), (0.0, 1.0, 1.0, 0.0))]
    fn parallel_rays_are_degenerate(av: (f64, f64, f64, f64), bv: (f64, f64, f64, f64)) {
        let result = intersect_rays(&ray(av), &ray(bv));
        assert!(matches!(result, Err(MeshError::DegenerateGeometry(_))));
    }

    #[test]
    fn parallel_rays_use_fallback() {
        let a = ray((0.0, 0.0, 1.0, 0.0));
        let b = ray((0.0, 1.0, 1.0, 0.0));
        let p = intersection_or_else(&a, &b, "test", || Point2::new(-1.0, 0.5));
        assert_relative_eq!(-1.0, p.x, epsilon = 1.0e-12);
        assert_relative_eq!(0.5, p.y, epsilon = 1.0e-12);
    }

    #[test_case((0.0, 0.0, 2.0, 2.0), (0.0, 2.0, 2.0, 0.0), true; "diagonals")]
    #[test_case((0.0, 0.0, 1.0, 0.0), (1.0, 0.0, 1.0, 1.0), false; "shared end point")]
    #[test_case((0.0, 0.0, 1.0, 0.0), (0.5, 0.0, 0.5, 1.0), false; "touching")]
    #[test_case((0.0, 0.0, 1.0, 0.0), (2.0, -1.0, 2.0, 1.0), false; "beyond the end")]
    #[test_case((0.0, 0.0, 1.0, 0.0), (0.0, 1.0, 1.0, 1.0), false; "parallel")]
    fn segment_crossings(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64), e: bool) {
        let (a0, a1) = (Point2::new(a.0, a.1), Point2::new(a.2, a.3));
        let (b0, b1) = (Point2::new(b.0, b.1), Point2::new(b.2, b.3));
        assert_eq!(e, segments_cross((&a0, &a1), (&b0, &b1)));
        assert_eq!(e, segments_cross((&b1, &b0), (&a0, &a1)));
    }

    #[test]
    fn orthogonal_is_left_hand_side() {
        let r = ray((0.0, 0.0, 1.0, 0.0));
        let n = r.orthogonal();
        assert_relative_eq!(0.0, n.x, epsilon = 1.0e-12);
        assert_relative_eq!(1.0, n.y, epsilon = 1.0e-12);
    }
}
