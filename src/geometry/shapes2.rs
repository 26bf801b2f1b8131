use crate::geometry::distances2::dist;
use crate::serialize::{Ballf64, Point2f64};
use ncollide2d::na::Point2;
use ncollide2d::shape::Ball;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct Circle2 {
    #[serde(with = "Point2f64")]
    pub center: Point2<f64>,

    #[serde(with = "Ballf64")]
    pub ball: Ball<f64>,
}

impl Circle2 {
    pub fn from_point(center: Point2<f64>, r: f64) -> Circle2 {
        Circle2 {
            center,
            ball: Ball::new(r),
        }
    }

    /// The circle centered at `center` passing through `on`
    pub fn through(center: Point2<f64>, on: &Point2<f64>) -> Circle2 {
        Circle2::from_point(center, dist(&center, on))
    }

    pub fn radius(&self) -> f64 {
        self.ball.radius
    }

    /// Checks whether a point lies on the circle within a tolerance relative to the radius
    pub fn passes_through(&self, p: &Point2<f64>, rel_tol: f64) -> bool {
        (dist(&self.center, p) - self.radius()).abs() <= rel_tol * self.radius().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn circle_through_point() {
        let c = Circle2::through(Point2::new(1.0, 0.0), &Point2::new(4.0, 4.0));
        assert_relative_eq!(5.0, c.radius(), epsilon = 1e-12);
        assert!(c.passes_through(&Point2::new(1.0, 5.0), 1e-9));
        assert!(c.passes_through(&Point2::new(-4.0, 0.0), 1e-9));
        assert!(!c.passes_through(&Point2::new(1.0, 4.9), 1e-9));
    }
}
