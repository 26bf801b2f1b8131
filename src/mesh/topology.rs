//! The five block C-type topology around a split airfoil contour.
//!
//! ```text
//!           p1 ---------L1---------- p2 ---------L2--------- p3
//!          /  \                      |                       |
//!         /    L0        B           L8          C           L3
//!        /      \                    |                       |
//!   arc |   A    k1 ----upper----- te ---------L10--------- p4
//!  (p0) |      (front)               |                       |
//!        \      /                    L9          D           L4
//!         \    L7        E           |                       |
//!          \  /                      |                       |
//!           p7 ---------L6---------- p6 ---------L5--------- p5
//! ```
//!
//! `k1` and `k2` are the upper and lower split points on the contour, `p0` is the center of the
//! inlet arc. Every block loop runs counter-clockwise, its first and third sides are opposite, as
//! are its second and fourth.

use crate::airfoil::{AirfoilContour, ArcKind, Split};
use crate::errors::{MeshError, MeshResult};
use crate::geometry::distances2::mid_point;
use crate::geometry::line2::{intersection_or_else, segments_cross};
use crate::geometry::polyline::outward_normal;
use crate::geometry::shapes2::Circle2;
use crate::kernel::Orientation;
use crate::mesh::params::{MeshParams, TuningParameters};
use crate::serialize::{points_as_xy, Point2f64};
use itertools::Itertools;
use ncollide2d::na::{Point2, Vector2};
use ncollide2d::query::Ray;
use serde::Serialize;

/// A corner of the topology. `Outer(0)` is the inlet arc center and never an edge end point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Vertex {
    Outer(usize),
    UpperSplit,
    LowerSplit,
    TrailingEdge,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EdgeId {
    L0,
    L1,
    L2,
    L3,
    L4,
    L5,
    L6,
    L7,
    L8,
    L9,
    L10,
    InletArc,
    Front,
    Upper,
    Lower,
}

impl EdgeId {
    pub const ALL: [EdgeId; 15] = [
        EdgeId::L0,
        EdgeId::L1,
        EdgeId::L2,
        EdgeId::L3,
        EdgeId::L4,
        EdgeId::L5,
        EdgeId::L6,
        EdgeId::L7,
        EdgeId::L8,
        EdgeId::L9,
        EdgeId::L10,
        EdgeId::InletArc,
        EdgeId::Front,
        EdgeId::Upper,
        EdgeId::Lower,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub enum EdgeShape {
    Straight,

    /// Arc around the inlet center `Outer(0)`
    CircleArc,

    /// One of the contour splines
    Airfoil(ArcKind),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub start: Vertex,
    pub end: Vertex,
    pub shape: EdgeShape,
}

impl Edge {
    fn new(id: EdgeId, start: Vertex, end: Vertex, shape: EdgeShape) -> Edge {
        Edge {
            id,
            start,
            end,
            shape,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrientedEdge {
    pub edge: EdgeId,
    pub orientation: Orientation,
}

impl OrientedEdge {
    fn fwd(edge: EdgeId) -> OrientedEdge {
        OrientedEdge {
            edge,
            orientation: Orientation::Forward,
        }
    }

    fn rev(edge: EdgeId) -> OrientedEdge {
        OrientedEdge {
            edge,
            orientation: Orientation::Reversed,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BlockLabel {
    A,
    B,
    C,
    D,
    E,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub label: BlockLabel,
    pub sides: [OrientedEdge; 4],
}

#[derive(Clone, Debug, Serialize)]
pub struct CTypeTopology {
    #[serde(serialize_with = "points_as_xy")]
    outer: [Point2<f64>; 8],

    #[serde(with = "Point2f64")]
    upper_split: Point2<f64>,

    #[serde(with = "Point2f64")]
    lower_split: Point2<f64>,

    #[serde(with = "Point2f64")]
    trailing_edge: Point2<f64>,

    inlet_arc: Circle2,
    inlet_offset: f64,
    arc_lengths: [f64; 3],
    edges: [Edge; 15],
    blocks: [Block; 5],
}

fn c_type_edges() -> [Edge; 15] {
    use EdgeShape::*;
    use Vertex::*;

    [
        Edge::new(EdgeId::L0, UpperSplit, Outer(1), Straight),
        Edge::new(EdgeId::L1, Outer(1), Outer(2), Straight),
        Edge::new(EdgeId::L2, Outer(2), Outer(3), Straight),
        Edge::new(EdgeId::L3, Outer(3), Outer(4), Straight),
        Edge::new(EdgeId::L4, Outer(4), Outer(5), Straight),
        Edge::new(EdgeId::L5, Outer(5), Outer(6), Straight),
        Edge::new(EdgeId::L6, Outer(6), Outer(7), Straight),
        Edge::new(EdgeId::L7, Outer(7), LowerSplit, Straight),
        Edge::new(EdgeId::L8, TrailingEdge, Outer(2), Straight),
        Edge::new(EdgeId::L9, TrailingEdge, Outer(6), Straight),
        Edge::new(EdgeId::L10, Outer(4), TrailingEdge, Straight),
        Edge::new(EdgeId::InletArc, Outer(7), Outer(1), CircleArc),
        Edge::new(EdgeId::Front, LowerSplit, UpperSplit, Airfoil(ArcKind::Front)),
        Edge::new(EdgeId::Upper, UpperSplit, TrailingEdge, Airfoil(ArcKind::Upper)),
        Edge::new(EdgeId::Lower, TrailingEdge, LowerSplit, Airfoil(ArcKind::Lower)),
    ]
}

fn c_type_blocks() -> [Block; 5] {
    use EdgeId::*;
    use OrientedEdge as O;

    [
        Block {
            label: BlockLabel::A,
            sides: [O::fwd(L7), O::fwd(Front), O::fwd(L0), O::rev(InletArc)],
        },
        Block {
            label: BlockLabel::B,
            sides: [O::fwd(Upper), O::fwd(L8), O::rev(L1), O::rev(L0)],
        },
        Block {
            label: BlockLabel::C,
            sides: [O::rev(L10), O::rev(L3), O::rev(L2), O::rev(L8)],
        },
        Block {
            label: BlockLabel::D,
            sides: [O::rev(L5), O::rev(L4), O::fwd(L10), O::fwd(L9)],
        },
        Block {
            label: BlockLabel::E,
            sides: [O::rev(L6), O::rev(L9), O::fwd(Lower), O::rev(L7)],
        },
    ]
}

impl CTypeTopology {
    /// Places the outer points around a split contour. The inlet points are found by casting a
    /// ray along the contour normal at each split point up to the top and bottom of the domain,
    /// then clamped between `inlet_max_upstream` and `inlet_min_offset * dy` ahead of the leading
    /// edge. The inlet arc center is where the perpendicular bisector of the two inlet points
    /// crosses the vertical through the leading edge.
    pub fn build(
        contour: &AirfoilContour<Split>,
        params: &MeshParams,
        tuning: &TuningParameters,
    ) -> CTypeTopology {
        let h = params.half_height();
        let le = contour.leading_edge();
        let te = contour.trailing_edge();
        let split = contour.split_indices();

        let upstream_limit = le.x - tuning.inlet_min_offset * params.dy;
        let farthest = (le.x - tuning.inlet_max_upstream).min(upstream_limit);

        let inlet = |k: usize, y: f64| -> Point2<f64> {
            let from = contour.points()[k];
            let (prev, next) = contour.neighbors(k);
            let fallback = || Point2::new(le.x - tuning.inlet_fallback_offset, y);
            let boundary = Ray::new(Point2::new(le.x, y), Vector2::new(1.0, 0.0));

            let x = match outward_normal(&prev, &next) {
                Some(n) => {
                    let normal = Ray::new(from, n.into_inner());
                    intersection_or_else(&normal, &boundary, "inlet point", fallback).x
                }
                None => {
                    log::warn!("no contour normal at split point {}, using offset inlet", k);
                    fallback().x
                }
            };

            let clamped = x.max(farthest).min(upstream_limit);
            if clamped != x {
                log::warn!("inlet point x = {:.4} clamped to {:.4}", x, clamped);
            }
            Point2::new(clamped, y)
        };

        let p1 = inlet(split.upper, h);
        let p7 = inlet(split.lower, -h);

        let mid = mid_point(&p1, &p7);
        let d = p1 - p7;
        let bisector = Ray::new(mid, Vector2::new(d.y, -d.x));
        let vertical = Ray::new(le, Vector2::new(0.0, 1.0));
        let p0 = intersection_or_else(&bisector, &vertical, "inlet arc center", || {
            mid + Vector2::new(d.y, -d.x).normalize() * tuning.inlet_fallback_offset
        });

        let x_end = te.x + params.dx_trail;
        let outer = [
            p0,
            p1,
            Point2::new(te.x, h),
            Point2::new(x_end, h),
            Point2::new(x_end, te.y),
            Point2::new(x_end, -h),
            Point2::new(te.x, -h),
            p7,
        ];

        log::debug!(
            "inlet points ({:.4}, {:.4}) and ({:.4}, {:.4}) around ({:.4}, {:.4})",
            p1.x,
            p1.y,
            p7.x,
            p7.y,
            p0.x,
            p0.y
        );

        CTypeTopology {
            outer,
            upper_split: contour.upper_split(),
            lower_split: contour.lower_split(),
            trailing_edge: te,
            inlet_arc: Circle2::through(p0, &p1),
            inlet_offset: le.x - 0.5 * (p1.x + p7.x),
            arc_lengths: [
                contour.arc_length(ArcKind::Front),
                contour.arc_length(ArcKind::Upper),
                contour.arc_length(ArcKind::Lower),
            ],
            edges: c_type_edges(),
            blocks: c_type_blocks(),
        }
    }

    pub fn outer_points(&self) -> &[Point2<f64>; 8] {
        &self.outer
    }

    pub fn point(&self, v: Vertex) -> Point2<f64> {
        match v {
            Vertex::Outer(i) => self.outer[i],
            Vertex::UpperSplit => self.upper_split,
            Vertex::LowerSplit => self.lower_split,
            Vertex::TrailingEdge => self.trailing_edge,
        }
    }

    pub fn edges(&self) -> &[Edge; 15] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn blocks(&self) -> &[Block; 5] {
        &self.blocks
    }

    pub fn inlet_arc(&self) -> &Circle2 {
        &self.inlet_arc
    }

    /// How far upstream of the leading edge the inlet points sit on average
    pub fn inlet_offset(&self) -> f64 {
        self.inlet_offset
    }

    pub fn arc_length(&self, arc: ArcKind) -> f64 {
        match arc {
            ArcKind::Front => self.arc_lengths[0],
            ArcKind::Upper => self.arc_lengths[1],
            ArcKind::Lower => self.arc_lengths[2],
        }
    }

    /// Start and end vertex of an edge in the direction a loop traverses it
    pub fn oriented_endpoints(&self, side: &OrientedEdge) -> (Vertex, Vertex) {
        let e = self.edge(side.edge);
        match side.orientation {
            Orientation::Forward => (e.start, e.end),
            Orientation::Reversed => (e.end, e.start),
        }
    }

    /// Fails when a straight edge cuts through the contour. At steep angles of attack the rays
    /// from the split points and the vertical edges at the trailing edge pass through the body, and
    /// the blocks on either side of such an edge overlap the airfoil.
    pub fn check_clear_of<S>(&self, contour: &AirfoilContour<S>) -> MeshResult<()> {
        for edge in self.edges.iter().filter(|e| e.shape == EdgeShape::Straight) {
            let a = self.point(edge.start);
            let b = self.point(edge.end);
            let crossed = contour
                .points()
                .iter()
                .circular_tuple_windows()
                .find(|&(p, q)| segments_cross((&a, &b), (p, q)));

            if let Some((p, q)) = crossed {
                return Err(MeshError::InvalidParameters(format!(
                    "edge {:?} crosses the contour between ({:.4}, {:.4}) and ({:.4}, {:.4}), \
                     the angle of attack is too steep for a C-type topology",
                    edge.id, p.x, p.y, q.x, q.y
                )));
            }
        }

        Ok(())
    }

    /// Corner vertices of a block in loop order
    pub fn corners(&self, block: &Block) -> [Vertex; 4] {
        let mut corners = [Vertex::Outer(0); 4];
        for (c, side) in corners.iter_mut().zip(block.sides.iter()) {
            *c = self.oriented_endpoints(side).0;
        }
        corners
    }
}
