//! Structured C-type mesh assembly. `build_structured_mesh` runs the whole pipeline for one
//! request against a meshing kernel:
//!
//! 1. validate the parameters and position the contour at its angle of attack
//! 2. check that the airfoil and its boundary layer fit inside the farfield
//! 3. split the contour, build the block topology and check that its edges stay clear of the
//!    contour
//! 4. derive the discretization of every edge
//! 5. create the geometry in the kernel, then the five transfinite surfaces and the boundary
//!    groups
//! 6. finalize the kernel session, whether or not the build succeeded
//!
//! Nothing but the final call reaches the kernel before the bounds and topology checks have
//! passed.

use crate::airfoil::{AirfoilContour, ArcKind, Raw, Tagged};
use crate::errors::MeshResult;
use crate::kernel::{EntityDim, MeshKernel, OrientedTag, Orientation, Tag};
use serde::Serialize;

pub mod bounds;
pub mod discretization;
pub mod params;
pub mod topology;

use bounds::{check_bounds, default_envelope};
use discretization::{Discretization, EdgeDiscretizationPolicy};
use params::{MeshParams, TuningParameters};
use topology::{BlockLabel, CTypeTopology, EdgeId, EdgeShape, Vertex};

pub const AIRFOIL_GROUP: &str = "airfoil";
pub const FARFIELD_GROUP: &str = "farfield";
pub const FLUID_GROUP: &str = "fluid";

/// A block as created in the kernel
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BlockSurface {
    pub label: BlockLabel,
    pub surface: Tag,
    pub curve_loop: Tag,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BoundaryTags {
    pub airfoil: Tag,
    pub farfield: Tag,
    pub fluid: Tag,
}

/// The outcome of a successful mesh request
#[derive(Clone, Debug)]
pub struct StructuredMesh {
    pub blocks: Vec<BlockSurface>,
    pub boundary_tags: BoundaryTags,
    pub topology: CTypeTopology,
    pub discretization: Discretization,
    pub contour: AirfoilContour<Tagged>,
}

impl StructuredMesh {
    pub fn block(&self, label: BlockLabel) -> Option<&BlockSurface> {
        self.blocks.iter().find(|b| b.label == label)
    }
}

/// Kernel tags of the topology's vertices and edges
struct RealizedTopology {
    outer: [Tag; 8],
    upper_split: Tag,
    lower_split: Tag,
    trailing_edge: Tag,
    curves: [Tag; 15],
}

impl RealizedTopology {
    fn vertex(&self, v: Vertex) -> Tag {
        match v {
            Vertex::Outer(i) => self.outer[i],
            Vertex::UpperSplit => self.upper_split,
            Vertex::LowerSplit => self.lower_split,
            Vertex::TrailingEdge => self.trailing_edge,
        }
    }

    fn curve(&self, edge: EdgeId) -> Tag {
        self.curves[edge.index()]
    }
}

/// Builds the five block structured mesh of a contour in the given kernel, then finalizes the
/// kernel session. On error the kernel may hold a partial model, which the caller must discard
/// rather than export.
pub fn build_structured_mesh<K: MeshKernel>(
    kernel: &mut K,
    contour: AirfoilContour<Raw>,
    params: &MeshParams,
    tuning: &TuningParameters,
) -> MeshResult<StructuredMesh> {
    let built = assemble(kernel, contour, params, tuning);
    let finalized = kernel.finalize();
    let mesh = built?;
    finalized?;
    Ok(mesh)
}

fn assemble<K: MeshKernel>(
    kernel: &mut K,
    contour: AirfoilContour<Raw>,
    params: &MeshParams,
    tuning: &TuningParameters,
) -> MeshResult<StructuredMesh> {
    params.validate()?;
    tuning.validate()?;

    let contour = contour.position_about(params.aoa_deg, tuning.pivot_point());

    let farfield = params
        .farfield
        .unwrap_or_else(|| default_envelope(params, contour.chord()));
    check_bounds(&contour, &farfield, params.boundary_layer_thickness())?;

    let contour = contour.split(tuning.split_threshold)?;
    let topology = CTypeTopology::build(&contour, params, tuning);
    topology.check_clear_of(&contour)?;
    let discretization = EdgeDiscretizationPolicy::new(params, tuning).discretize(&topology);

    let split = contour.split_indices();
    let te = contour.trailing_edge_index();
    let contour = contour.realize(kernel, params.airfoil_mesh_size)?;

    let mut outer = [Tag(0); 8];
    for (tag, p) in outer.iter_mut().zip(topology.outer_points().iter()) {
        *tag = kernel.add_point(p, params.airfoil_mesh_size)?;
    }

    let mut realized = RealizedTopology {
        outer,
        upper_split: contour.point_tag(split.upper),
        lower_split: contour.point_tag(split.lower),
        trailing_edge: contour.point_tag(te),
        curves: [Tag(0); 15],
    };

    for edge in topology.edges().iter() {
        let start = realized.vertex(edge.start);
        let end = realized.vertex(edge.end);
        let curve = match edge.shape {
            EdgeShape::Straight => kernel.add_line(start, end)?,
            EdgeShape::CircleArc => {
                kernel.add_circle_arc(start, realized.vertex(Vertex::Outer(0)), end)?
            }
            EdgeShape::Airfoil(arc) => contour.arc_tag(arc),
        };
        realized.curves[edge.id.index()] = curve;
    }

    for d in discretization.iter() {
        kernel.set_transfinite_curve(realized.curve(d.edge), d.nodes, d.law)?;
    }

    let mut blocks = Vec::with_capacity(topology.blocks().len());
    for block in topology.blocks().iter() {
        let sides: Vec<OrientedTag> = block
            .sides
            .iter()
            .map(|s| {
                let tag = realized.curve(s.edge);
                match s.orientation {
                    Orientation::Forward => OrientedTag::forward(tag),
                    Orientation::Reversed => OrientedTag::reversed(tag),
                }
            })
            .collect();

        let curve_loop = kernel.add_curve_loop(&sides)?;
        let surface = kernel.add_plane_surface(&[curve_loop])?;
        kernel.set_transfinite_surface(surface)?;
        kernel.set_recombine(surface, tuning.recombine_angle)?;

        blocks.push(BlockSurface {
            label: block.label,
            surface,
            curve_loop,
        });
    }

    let farfield_curves: Vec<Tag> = [
        EdgeId::InletArc,
        EdgeId::L1,
        EdgeId::L2,
        EdgeId::L3,
        EdgeId::L4,
        EdgeId::L5,
        EdgeId::L6,
    ]
    .iter()
    .map(|e| realized.curve(*e))
    .collect();
    let farfield = kernel.add_physical_group(EntityDim::Curve, &farfield_curves, FARFIELD_GROUP)?;

    let surfaces: Vec<Tag> = blocks.iter().map(|b| b.surface).collect();
    let fluid = kernel.add_physical_group(EntityDim::Surface, &surfaces, FLUID_GROUP)?;

    let contour = contour.tag_boundary(kernel, AIRFOIL_GROUP)?;

    log::info!(
        "structured C-mesh: {} blocks, {} edges, {} contour points, front/upper/lower arcs {:.4}/{:.4}/{:.4}",
        blocks.len(),
        discretization.len(),
        contour.len(),
        topology.arc_length(ArcKind::Front),
        topology.arc_length(ArcKind::Upper),
        topology.arc_length(ArcKind::Lower)
    );

    Ok(StructuredMesh {
        blocks,
        boundary_tags: BoundaryTags {
            airfoil: contour.group(),
            farfield,
            fluid,
        },
        topology,
        discretization,
        contour,
    })
}
