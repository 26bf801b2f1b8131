//! Closure of blunt trailing edges. A structured C-mesh needs a single trailing edge vertex for
//! the wake edges to start from, so when the contour ends in two points at the maximum x a
//! synthetic point is placed where the two surfaces would meet if extended.

use crate::geometry::distances2::{dist, mid_point};
use crate::geometry::line2::intersect_rays;
use ncollide2d::na::{Point2, Vector2};
use ncollide2d::query::Ray;

/// A synthetic point inserted between the two trailing edge points of a blunt contour
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrailingClosure {
    /// Index the synthetic point must be inserted at
    pub index: usize,
    pub point: Point2<f64>,
}

/// Looks for a blunt trailing edge on a clockwise contour starting at its leading edge. The
/// edge is blunt when two consecutive points both sit at the maximum x within `tol` and are
/// further than `tol` apart.
///
/// The upper and lower surfaces are extended along their last segments; the synthetic point is
/// their intersection when it lies downstream of the edge, pulled back to at most `max_extension`
/// chords downstream of the edge midpoint. If the extensions are parallel or meet upstream the
/// point is placed half the gap height behind the edge midpoint.
pub fn close_blunt_trailing_edge(
    points: &[Point2<f64>],
    tol: f64,
    max_extension: f64,
) -> Option<TrailingClosure> {
    let n = points.len();
    if n < 4 {
        return None;
    }

    let x_max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let x_min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let chord = x_max - x_min;

    let u = points.iter().position(|p| p.x >= x_max - tol)?;
    if u == 0 || u + 1 >= n {
        return None;
    }

    let upper = points[u];
    let lower = points[u + 1];
    if lower.x < x_max - tol || dist(&upper, &lower) <= tol {
        return None;
    }

    let mid = mid_point(&upper, &lower);
    let gap = dist(&upper, &lower);
    let fallback = mid + Vector2::new(0.5 * gap, 0.0);

    let upper_ray = Ray::new(upper, upper - points[u - 1]);
    let lower_ray = Ray::new(lower, lower - points[(u + 2) % n]);

    let point = match intersect_rays(&upper_ray, &lower_ray) {
        Ok((t0, t1)) if t0 > 0.0 && t1 > 0.0 => {
            let p = upper_ray.point_at(t0);
            if p.x <= x_max {
                log::warn!("trailing edge extensions meet upstream, using offset point");
                fallback
            } else if p.x > x_max + max_extension * chord {
                log::warn!(
                    "trailing edge extensions meet at x = {:.4}, clamping to {} chord",
                    p.x,
                    max_extension
                );
                let limit = (max_extension * chord) / (p.x - mid.x);
                mid + (p - mid) * limit
            } else {
                p
            }
        }
        Ok(_) => {
            log::warn!("trailing edge extensions diverge, using offset point");
            fallback
        }
        Err(e) => {
            log::warn!("trailing edge closure: {}, using offset point", e);
            fallback
        }
    };

    Some(TrailingClosure {
        index: u + 1,
        point,
    })
}
