use crate::errors::MeshResult;
use ncollide2d::na::Point2;
use serde::Serialize;

pub mod recording;

/// Handle to an entity created in a meshing kernel. Tags are only meaningful to the kernel that
/// issued them, and each entity dimension has its own tag space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tag(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Forward,
    Reversed,
}

/// A curve handle together with the direction in which a curve loop traverses it
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrientedTag {
    pub tag: Tag,
    pub orientation: Orientation,
}

impl OrientedTag {
    pub fn forward(tag: Tag) -> Self {
        OrientedTag {
            tag,
            orientation: Orientation::Forward,
        }
    }

    pub fn reversed(tag: Tag) -> Self {
        OrientedTag {
            tag,
            orientation: Orientation::Reversed,
        }
    }

    /// The gmsh convention of a negative tag for a reversed curve
    pub fn signed(&self) -> i64 {
        match self.orientation {
            Orientation::Forward => self.tag.0 as i64,
            Orientation::Reversed => -(self.tag.0 as i64),
        }
    }
}

/// Node spacing law along a transfinite curve, in the direction of the curve itself
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub enum SpacingLaw {
    Uniform,

    /// Each cell is `ratio` times the size of the previous one
    Progression(f64),

    /// Symmetric refinement toward both ends of the curve, stronger for smaller coefficients
    Bump(f64),
}

impl SpacingLaw {
    /// The same physical distribution described from the other end of the curve
    pub fn reversed(&self) -> SpacingLaw {
        match self {
            SpacingLaw::Progression(r) => SpacingLaw::Progression(1.0 / r),
            other => *other,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EntityDim {
    Curve,
    Surface,
}

/// The operations the mesher needs from a geometry and meshing engine. Implementations own a
/// single modelling session, opened when the kernel is created. All calls made while building one
/// mesh go to the same session in the order they are issued, and `finalize` closes it.
pub trait MeshKernel {
    fn add_point(&mut self, p: &Point2<f64>, mesh_size: f64) -> MeshResult<Tag>;

    fn add_line(&mut self, start: Tag, end: Tag) -> MeshResult<Tag>;

    fn add_spline(&mut self, points: &[Tag]) -> MeshResult<Tag>;

    /// An arc of less than half a turn from `start` to `end` around `center`
    fn add_circle_arc(&mut self, start: Tag, center: Tag, end: Tag) -> MeshResult<Tag>;

    fn add_curve_loop(&mut self, curves: &[OrientedTag]) -> MeshResult<Tag>;

    fn add_plane_surface(&mut self, loops: &[Tag]) -> MeshResult<Tag>;

    fn set_transfinite_curve(&mut self, curve: Tag, nodes: usize, law: SpacingLaw)
        -> MeshResult<()>;

    fn set_transfinite_surface(&mut self, surface: Tag) -> MeshResult<()>;

    fn set_recombine(&mut self, surface: Tag, angle_deg: f64) -> MeshResult<()>;

    fn add_physical_group(&mut self, dim: EntityDim, members: &[Tag], name: &str)
        -> MeshResult<Tag>;

    /// Ends the session. Called exactly once per mesh request, after the last construction call.
    fn finalize(&mut self) -> MeshResult<()> {
        Ok(())
    }
}
