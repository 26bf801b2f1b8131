//! The airfoil contour model. A contour moves through a fixed sequence of stages, each one a
//! distinct type so that only the next legal operation is available:
//!
//! `Raw -> Positioned -> Split -> Realized -> Tagged`
//!
//! A raw contour is cleaned, clockwise, and starts at its leading edge. Positioning applies the
//! angle of attack. Splitting picks the two points that separate the front arc from the upper and
//! lower surfaces. Realizing creates the points and the three arc splines in a meshing kernel,
//! and tagging registers the arcs as the airfoil boundary group.

use crate::errors::{MeshError, MeshResult};
use crate::geometry::distances2::{polyline_length, signed_area};
use crate::geometry::polyline::cleaned_points;
use crate::kernel::{EntityDim, MeshKernel, Tag};
use itertools::Itertools;
use ncollide2d::na::{Isometry2, Point2};
use serde::Serialize;

pub mod generate;
pub mod trailing;

use trailing::close_blunt_trailing_edge;

pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Largest distance behind the trailing edge, in chords, at which a synthetic trailing point of a
/// blunt airfoil may be placed
pub const MAX_TRAILING_EXTENSION: f64 = 1.0;

/// Angle of attack rotations are applied about this point unless told otherwise
pub const DEFAULT_PIVOT: (f64, f64) = (0.5, 0.0);

/// The three arcs a split contour is partitioned into
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ArcKind {
    /// Wraps the leading edge, from the lower split point to the upper split point
    Front,

    /// From the upper split point to the trailing edge
    Upper,

    /// From the trailing edge to the lower split point
    Lower,
}

impl ArcKind {
    pub const ALL: [ArcKind; 3] = [ArcKind::Front, ArcKind::Upper, ArcKind::Lower];
}

/// Contour indices of the first points past the split threshold on the upper and lower surface
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitIndices {
    pub upper: usize,
    pub lower: usize,
}

#[derive(Copy, Clone, Debug)]
pub struct Raw;

#[derive(Copy, Clone, Debug)]
pub struct Positioned {
    pose: Isometry2<f64>,
    aoa_deg: f64,
}

#[derive(Copy, Clone, Debug)]
pub struct Split {
    positioned: Positioned,
    indices: SplitIndices,
}

#[derive(Clone, Debug)]
pub struct Realized {
    split: Split,
    point_tags: Vec<Tag>,
    arc_tags: [Tag; 3],
}

#[derive(Clone, Debug)]
pub struct Tagged {
    realized: Realized,
    group: Tag,
}

#[derive(Clone, Debug)]
pub struct AirfoilContour<S> {
    points: Vec<Point2<f64>>,
    leading_edge: usize,
    trailing_edge: usize,
    state: S,
}

impl<S> AirfoilContour<S> {
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn leading_edge_index(&self) -> usize {
        self.leading_edge
    }

    pub fn trailing_edge_index(&self) -> usize {
        self.trailing_edge
    }

    pub fn leading_edge(&self) -> Point2<f64> {
        self.points[self.leading_edge]
    }

    pub fn trailing_edge(&self) -> Point2<f64> {
        self.points[self.trailing_edge]
    }

    pub fn chord(&self) -> f64 {
        (self.trailing_edge() - self.leading_edge()).norm()
    }

    /// The neighbors of point `i`, wrapping around the closed contour
    pub fn neighbors(&self, i: usize) -> (Point2<f64>, Point2<f64>) {
        let n = self.points.len();
        (self.points[(i + n - 1) % n], self.points[(i + 1) % n])
    }

    /// Fraction of the chord at which point `i` sits, measured in the airfoil's own frame so the
    /// angle of attack does not move the split points
    fn body_chord_fraction(&self, pose: &Isometry2<f64>, i: usize) -> f64 {
        let body = |p: &Point2<f64>| pose.inverse_transform_point(p);
        let le = body(&self.leading_edge());
        let te = body(&self.trailing_edge());
        (body(&self.points[i]).x - le.x) / (te.x - le.x)
    }

    fn advance<T>(self, state: T) -> AirfoilContour<T> {
        AirfoilContour {
            points: self.points,
            leading_edge: self.leading_edge,
            trailing_edge: self.trailing_edge,
            state,
        }
    }
}

impl AirfoilContour<Raw> {
    /// Builds a contour from a raw point cloud. Consecutive duplicates and a repeated closing
    /// point are removed, the points are put in clockwise order starting at the minimum x, and a
    /// blunt trailing edge is closed with a synthetic point.
    pub fn new(points: &[Point2<f64>], tol: Option<f64>) -> MeshResult<AirfoilContour<Raw>> {
        let tol = tol.unwrap_or(DEFAULT_TOLERANCE);
        let mut points = cleaned_points(points, tol);

        if points.len() < 3 {
            return Err(MeshError::InvalidContour(format!(
                "{} distinct points, at least 3 are needed",
                points.len()
            )));
        }

        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(MeshError::InvalidContour("non-finite coordinates".to_string()));
        }

        let (x_min, x_max) = points
            .iter()
            .map(|p| p.x)
            .minmax()
            .into_option()
            .ok_or_else(|| MeshError::InvalidContour("empty contour".to_string()))?;
        if x_max - x_min <= tol {
            return Err(MeshError::InvalidContour(
                "leading and trailing edge cannot be told apart".to_string(),
            ));
        }

        if signed_area(&points) > 0.0 {
            points.reverse();
        }

        let start = points
            .iter()
            .position_min_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap_or(0);
        points.rotate_left(start);

        if let Some(closure) = close_blunt_trailing_edge(&points, tol, MAX_TRAILING_EXTENSION) {
            log::debug!(
                "closed blunt trailing edge with ({:.6}, {:.6})",
                closure.point.x,
                closure.point.y
            );
            points.insert(closure.index, closure.point);
        }

        let trailing_edge = points
            .iter()
            .position_max_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap_or(0);

        Ok(AirfoilContour {
            points,
            leading_edge: 0,
            trailing_edge,
            state: Raw,
        })
    }

    /// Rotates the contour by the angle of attack (positive nose up) about the default pivot
    pub fn position(self, aoa_deg: f64) -> AirfoilContour<Positioned> {
        self.position_about(aoa_deg, Point2::new(DEFAULT_PIVOT.0, DEFAULT_PIVOT.1))
    }

    pub fn position_about(self, aoa_deg: f64, pivot: Point2<f64>) -> AirfoilContour<Positioned> {
        let pose = Isometry2::translation(pivot.x, pivot.y)
            * Isometry2::rotation(-aoa_deg.to_radians())
            * Isometry2::translation(-pivot.x, -pivot.y);

        let mut moved = self.advance(Positioned { pose, aoa_deg });
        for p in moved.points.iter_mut() {
            *p = pose * *p;
        }
        moved
    }
}

impl AirfoilContour<Positioned> {
    pub fn aoa_deg(&self) -> f64 {
        self.state.aoa_deg
    }

    pub fn chord_fraction(&self, i: usize) -> f64 {
        self.body_chord_fraction(&self.state.pose, i)
    }

    /// Finds the first point beyond `threshold` chord fraction on each surface, scanning away
    /// from the leading edge.
    pub fn split(self, threshold: f64) -> MeshResult<AirfoilContour<Split>> {
        let n = self.points.len();
        let te = self.trailing_edge;

        let upper = (1..te).find(|i| self.chord_fraction(*i) > threshold);
        let lower = (te + 1..n).rev().find(|i| self.chord_fraction(*i) > threshold);

        match (upper, lower) {
            (Some(upper), Some(lower)) => {
                log::debug!(
                    "split contour at {} (upper) and {} (lower) of {} points",
                    upper,
                    lower,
                    n
                );
                let positioned = self.state;
                Ok(self.advance(Split {
                    positioned,
                    indices: SplitIndices { upper, lower },
                }))
            }
            _ => Err(MeshError::InvalidContour(format!(
                "no point beyond {} chord on both surfaces",
                threshold
            ))),
        }
    }
}

impl AirfoilContour<Split> {
    pub fn split_indices(&self) -> SplitIndices {
        self.state.indices
    }

    pub fn chord_fraction(&self, i: usize) -> f64 {
        self.body_chord_fraction(&self.state.positioned.pose, i)
    }

    pub fn upper_split(&self) -> Point2<f64> {
        self.points[self.state.indices.upper]
    }

    pub fn lower_split(&self) -> Point2<f64> {
        self.points[self.state.indices.lower]
    }

    pub fn aoa_deg(&self) -> f64 {
        self.state.positioned.aoa_deg
    }

    /// Contour indices of the points making up an arc, in the arc's direction
    pub fn arc_indices(&self, arc: ArcKind) -> Vec<usize> {
        let SplitIndices { upper, lower } = self.state.indices;
        let n = self.points.len();
        match arc {
            ArcKind::Front => (lower..n).chain(0..=upper).collect(),
            ArcKind::Upper => (upper..=self.trailing_edge).collect(),
            ArcKind::Lower => (self.trailing_edge..=lower).collect(),
        }
    }

    pub fn arc_points(&self, arc: ArcKind) -> Vec<Point2<f64>> {
        self.arc_indices(arc)
            .into_iter()
            .map(|i| self.points[i])
            .collect()
    }

    pub fn arc_length(&self, arc: ArcKind) -> f64 {
        polyline_length(&self.arc_points(arc))
    }

    /// Creates every contour point and the three arc splines in the kernel
    pub fn realize<K: MeshKernel>(
        self,
        kernel: &mut K,
        mesh_size: f64,
    ) -> MeshResult<AirfoilContour<Realized>> {
        let point_tags = self
            .points
            .iter()
            .map(|p| kernel.add_point(p, mesh_size))
            .collect::<MeshResult<Vec<Tag>>>()?;

        let mut arc_tags = [Tag(0); 3];
        for (slot, arc) in arc_tags.iter_mut().zip(ArcKind::ALL.iter()) {
            let tags: Vec<Tag> = self
                .arc_indices(*arc)
                .into_iter()
                .map(|i| point_tags[i])
                .collect();
            *slot = kernel.add_spline(&tags)?;
        }

        let split = self.state;
        Ok(self.advance(Realized {
            split,
            point_tags,
            arc_tags,
        }))
    }
}

impl AirfoilContour<Realized> {
    pub fn split_indices(&self) -> SplitIndices {
        self.state.split.indices
    }

    pub fn point_tag(&self, i: usize) -> Tag {
        self.state.point_tags[i]
    }

    pub fn arc_tag(&self, arc: ArcKind) -> Tag {
        match arc {
            ArcKind::Front => self.state.arc_tags[0],
            ArcKind::Upper => self.state.arc_tags[1],
            ArcKind::Lower => self.state.arc_tags[2],
        }
    }

    /// Registers the three arcs as one boundary group
    pub fn tag_boundary<K: MeshKernel>(
        self,
        kernel: &mut K,
        name: &str,
    ) -> MeshResult<AirfoilContour<Tagged>> {
        let group = kernel.add_physical_group(EntityDim::Curve, &self.state.arc_tags, name)?;
        let realized = self.state.clone();
        Ok(self.advance(Tagged { realized, group }))
    }
}

impl AirfoilContour<Tagged> {
    pub fn group(&self) -> Tag {
        self.state.group
    }

    pub fn split_indices(&self) -> SplitIndices {
        self.state.realized.split.indices
    }

    pub fn aoa_deg(&self) -> f64 {
        self.state.realized.split.positioned.aoa_deg
    }

    pub fn arc_tag(&self, arc: ArcKind) -> Tag {
        match arc {
            ArcKind::Front => self.state.realized.arc_tags[0],
            ArcKind::Upper => self.state.realized.arc_tags[1],
            ArcKind::Lower => self.state.realized.arc_tags[2],
        }
    }
}
