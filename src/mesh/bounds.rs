use crate::airfoil::AirfoilContour;
use crate::errors::{MeshError, MeshResult};
use crate::geometry::aabb2::{offsets_from, points_aabb};
use crate::mesh::params::{Farfield, MeshParams};
use ncollide2d::na::{Point2, Vector2};

/// The C-domain's own extent, used when no farfield envelope is given
pub fn default_envelope(params: &MeshParams, chord: f64) -> Farfield {
    Farfield::Box {
        length: 2.0 * (params.dx_trail + chord),
        width: params.dy,
    }
}

/// Half extents of the room available around the quarter chord
pub fn available_room(farfield: &Farfield) -> Vector2<f64> {
    match farfield {
        Farfield::Circle { radius } => Vector2::new(*radius, *radius),
        Farfield::Box { length, width } => Vector2::new(length / 2.0, width / 2.0),
    }
}

/// Fails with `OutOfBounds` if the contour, grown by the boundary layer thickness on every side,
/// reaches past the farfield envelope centered on the quarter chord.
pub fn check_bounds<S>(
    contour: &AirfoilContour<S>,
    farfield: &Farfield,
    boundary_layer: f64,
) -> MeshResult<()> {
    let le = contour.leading_edge();
    let te = contour.trailing_edge();
    let center: Point2<f64> = le + (te - le) * 0.25;

    let extent = points_aabb(contour.points())
        .ok_or_else(|| MeshError::InvalidContour("empty contour".to_string()))?;
    let offsets = offsets_from(&extent, &center).add_scalar(boundary_layer);
    let room = available_room(farfield);

    for (axis, offset, room) in [("x", offsets.x, room.x), ("y", offsets.y, room.y)] {
        if offset > room {
            return Err(MeshError::OutOfBounds { axis, offset, room });
        }
    }

    Ok(())
}
