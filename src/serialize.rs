use ncollide2d::na::Point2;
use ncollide2d::shape::Ball;
use serde::{Serialize, Serializer};

#[derive(Serialize)]
#[serde(remote = "Point2<f64>")]
pub struct Point2f64 {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
#[serde(remote = "Ball<f64>")]
pub struct Ballf64 {
    radius: f64,
}

/// Serializes a list of points (a `Vec` or an array) as a sequence of `{x, y}` objects, for use
/// with `#[serde(serialize_with = "points_as_xy")]`
pub fn points_as_xy<P, S>(points: &P, s: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<[Point2<f64>]>,
    S: Serializer,
{
    #[derive(Serialize)]
    struct Xy(#[serde(with = "Point2f64")] Point2<f64>);

    s.collect_seq(points.as_ref().iter().map(|p| Xy(*p)))
}
