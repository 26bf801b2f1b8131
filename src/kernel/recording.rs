//! An in-memory meshing kernel which records every construction, checks it the way a geometry
//! engine would, and can print the result as a gmsh `.geo` script.

use super::{EntityDim, MeshKernel, OrientedTag, Orientation, SpacingLaw, Tag};
use crate::errors::{MeshError, MeshResult};
use crate::geometry::distances2::{dist, signed_angle};
use crate::geometry::shapes2::Circle2;
use crate::serialize::Point2f64;
use ncollide2d::na::Point2;
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

const RADIUS_TOL: f64 = 1e-9;
const HALF_TURN_TOL: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    #[serde(with = "Point2f64")]
    pub at: Point2<f64>,
    pub mesh_size: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GeoCurve {
    Line { start: Tag, end: Tag },
    Spline { points: Vec<Tag> },
    CircleArc { start: Tag, center: Tag, end: Tag },
}

impl GeoCurve {
    pub fn endpoints(&self) -> (Tag, Tag) {
        match self {
            GeoCurve::Line { start, end } => (*start, *end),
            GeoCurve::Spline { points } => (points[0], points[points.len() - 1]),
            GeoCurve::CircleArc { start, end, .. } => (*start, *end),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TransfiniteCurve {
    pub nodes: usize,
    pub law: SpacingLaw,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhysicalGroup {
    pub tag: Tag,
    pub dim: EntityDim,
    pub name: String,
    pub members: Vec<Tag>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GeoModel {
    points: Vec<GeoPoint>,
    curves: Vec<GeoCurve>,
    loops: Vec<Vec<OrientedTag>>,
    surfaces: Vec<Vec<Tag>>,
    transfinite_curves: BTreeMap<Tag, TransfiniteCurve>,
    transfinite_surfaces: Vec<Tag>,
    recombined: Vec<(Tag, f64)>,
    groups: Vec<PhysicalGroup>,

    #[serde(skip)]
    finalized: bool,
}

fn next_tag<T>(items: &[T]) -> Tag {
    Tag(items.len() + 1)
}

fn lookup<'a, T>(items: &'a [T], tag: Tag, what: &'static str) -> MeshResult<&'a T> {
    tag.0
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .ok_or_else(|| MeshError::kernel(what, format!("unknown tag {}", tag.0)))
}

impl GeoModel {
    pub fn new() -> GeoModel {
        GeoModel::default()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_open(&self) -> MeshResult<()> {
        if self.finalized {
            return Err(MeshError::kernel("session", "the model has been finalized"));
        }
        Ok(())
    }

    pub fn point(&self, tag: Tag) -> Option<&GeoPoint> {
        lookup(&self.points, tag, "point").ok()
    }

    pub fn curve(&self, tag: Tag) -> Option<&GeoCurve> {
        lookup(&self.curves, tag, "curve").ok()
    }

    pub fn curve_loop(&self, tag: Tag) -> Option<&[OrientedTag]> {
        lookup(&self.loops, tag, "curve loop").ok().map(|l| l.as_slice())
    }

    pub fn surface_loops(&self, tag: Tag) -> Option<&[Tag]> {
        lookup(&self.surfaces, tag, "surface").ok().map(|s| s.as_slice())
    }

    pub fn transfinite(&self, curve: Tag) -> Option<&TransfiniteCurve> {
        self.transfinite_curves.get(&curve)
    }

    pub fn is_transfinite_surface(&self, surface: Tag) -> bool {
        self.transfinite_surfaces.contains(&surface)
    }

    pub fn recombine_angle(&self, surface: Tag) -> Option<f64> {
        self.recombined
            .iter()
            .find(|(t, _)| *t == surface)
            .map(|(_, a)| *a)
    }

    pub fn group(&self, name: &str) -> Option<&PhysicalGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Start and end point of a curve as traversed with the given orientation
    pub fn oriented_endpoints(&self, curve: &OrientedTag) -> Option<(Tag, Tag)> {
        let (s, e) = self.curve(curve.tag)?.endpoints();
        match curve.orientation {
            Orientation::Forward => Some((s, e)),
            Orientation::Reversed => Some((e, s)),
        }
    }

    /// Renders the recorded model as a gmsh `.geo` script
    pub fn to_geo_script(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> MeshResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn require_point(&self, tag: Tag, operation: &'static str) -> MeshResult<&GeoPoint> {
        lookup(&self.points, tag, operation)
    }

    fn require_curve(&self, tag: Tag, operation: &'static str) -> MeshResult<&GeoCurve> {
        lookup(&self.curves, tag, operation)
    }

    /// The node counts of a four sided surface must match on opposite sides for the structured
    /// grid to exist
    fn check_transfinite_sides(&self, surface: Tag) -> MeshResult<()> {
        const OP: &str = "transfinite surface";
        let loops = lookup(&self.surfaces, surface, OP)?;
        if loops.len() != 1 {
            return Err(MeshError::kernel(OP, "surface with holes cannot be transfinite"));
        }

        let sides = lookup(&self.loops, loops[0], OP)?;
        let mut nodes = Vec::with_capacity(sides.len());
        for side in sides.iter() {
            let t = self.transfinite(side.tag).ok_or_else(|| {
                MeshError::kernel(OP, format!("curve {} is not transfinite", side.tag.0))
            })?;
            nodes.push(t.nodes);
        }

        match nodes.as_slice() {
            [a, b, c, d] if a == c && b == d => Ok(()),
            [_, _, _, _] => Err(MeshError::kernel(
                OP,
                format!("opposite sides of surface {} differ: {:?}", surface.0, nodes),
            )),
            _ => Err(MeshError::kernel(
                OP,
                format!("surface {} has {} sides, expected 4", surface.0, nodes.len()),
            )),
        }
    }
}

impl MeshKernel for GeoModel {
    fn add_point(&mut self, p: &Point2<f64>, mesh_size: f64) -> MeshResult<Tag> {
        self.ensure_open()?;
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(MeshError::kernel("point", format!("non-finite position {:?}", p)));
        }

        let tag = next_tag(&self.points);
        self.points.push(GeoPoint { at: *p, mesh_size });
        Ok(tag)
    }

    fn add_line(&mut self, start: Tag, end: Tag) -> MeshResult<Tag> {
        self.ensure_open()?;
        let a = self.require_point(start, "line")?.at;
        let b = self.require_point(end, "line")?.at;
        if start == end || dist(&a, &b) == 0.0 {
            return Err(MeshError::kernel("line", "zero length line"));
        }

        let tag = next_tag(&self.curves);
        self.curves.push(GeoCurve::Line { start, end });
        Ok(tag)
    }

    fn add_spline(&mut self, points: &[Tag]) -> MeshResult<Tag> {
        self.ensure_open()?;
        if points.len() < 2 {
            return Err(MeshError::kernel("spline", "at least two points are needed"));
        }
        for p in points.iter() {
            self.require_point(*p, "spline")?;
        }

        let tag = next_tag(&self.curves);
        self.curves.push(GeoCurve::Spline {
            points: points.to_vec(),
        });
        Ok(tag)
    }

    fn add_circle_arc(&mut self, start: Tag, center: Tag, end: Tag) -> MeshResult<Tag> {
        self.ensure_open()?;
        const OP: &str = "circle arc";
        let s = self.require_point(start, OP)?.at;
        let c = self.require_point(center, OP)?.at;
        let e = self.require_point(end, OP)?.at;

        let circle = Circle2::through(c, &s);
        if circle.radius() == 0.0 || !circle.passes_through(&e, RADIUS_TOL) {
            return Err(MeshError::kernel(OP, "end points are not equidistant from the center"));
        }

        if signed_angle(&(s - c), &(e - c)).abs() >= PI - HALF_TURN_TOL {
            return Err(MeshError::kernel(OP, "arc must span less than half a turn"));
        }

        let tag = next_tag(&self.curves);
        self.curves.push(GeoCurve::CircleArc { start, center, end });
        Ok(tag)
    }

    fn add_curve_loop(&mut self, curves: &[OrientedTag]) -> MeshResult<Tag> {
        self.ensure_open()?;
        const OP: &str = "curve loop";
        if curves.is_empty() {
            return Err(MeshError::kernel(OP, "empty loop"));
        }

        let mut ends = Vec::with_capacity(curves.len());
        for c in curves.iter() {
            self.require_curve(c.tag, OP)?;
            ends.push(
                self.oriented_endpoints(c)
                    .ok_or_else(|| MeshError::kernel(OP, format!("unknown curve {}", c.tag.0)))?,
            );
        }

        for (i, (_, end)) in ends.iter().enumerate() {
            let (next_start, _) = ends[(i + 1) % ends.len()];
            if *end != next_start {
                return Err(MeshError::kernel(
                    OP,
                    format!(
                        "curve {} ends at point {} but curve {} starts at point {}",
                        curves[i].signed(),
                        end.0,
                        curves[(i + 1) % curves.len()].signed(),
                        next_start.0
                    ),
                ));
            }
        }

        let tag = next_tag(&self.loops);
        self.loops.push(curves.to_vec());
        Ok(tag)
    }

    fn add_plane_surface(&mut self, loops: &[Tag]) -> MeshResult<Tag> {
        self.ensure_open()?;
        if loops.is_empty() {
            return Err(MeshError::kernel("plane surface", "no curve loops"));
        }
        for l in loops.iter() {
            lookup(&self.loops, *l, "plane surface")?;
        }

        let tag = next_tag(&self.surfaces);
        self.surfaces.push(loops.to_vec());
        Ok(tag)
    }

    fn set_transfinite_curve(
        &mut self,
        curve: Tag,
        nodes: usize,
        law: SpacingLaw,
    ) -> MeshResult<()> {
        self.ensure_open()?;
        const OP: &str = "transfinite curve";
        self.require_curve(curve, OP)?;
        if nodes < 2 {
            return Err(MeshError::kernel(OP, format!("{} nodes on curve {}", nodes, curve.0)));
        }

        let valid = match law {
            SpacingLaw::Uniform => true,
            SpacingLaw::Progression(r) | SpacingLaw::Bump(r) => r.is_finite() && r > 0.0,
        };
        if !valid {
            return Err(MeshError::kernel(OP, format!("invalid law {:?}", law)));
        }

        let setting = TransfiniteCurve { nodes, law };
        match self.transfinite_curves.get(&curve) {
            Some(existing) if *existing != setting => Err(MeshError::kernel(
                OP,
                format!(
                    "curve {} already set to {:?}, refusing {:?}",
                    curve.0, existing, setting
                ),
            )),
            _ => {
                self.transfinite_curves.insert(curve, setting);
                Ok(())
            }
        }
    }

    fn set_transfinite_surface(&mut self, surface: Tag) -> MeshResult<()> {
        self.ensure_open()?;
        self.check_transfinite_sides(surface)?;
        if !self.transfinite_surfaces.contains(&surface) {
            self.transfinite_surfaces.push(surface);
        }
        Ok(())
    }

    fn set_recombine(&mut self, surface: Tag, angle_deg: f64) -> MeshResult<()> {
        self.ensure_open()?;
        lookup(&self.surfaces, surface, "recombine")?;
        self.recombined.retain(|(t, _)| *t != surface);
        self.recombined.push((surface, angle_deg));
        Ok(())
    }

    fn add_physical_group(
        &mut self,
        dim: EntityDim,
        members: &[Tag],
        name: &str,
    ) -> MeshResult<Tag> {
        self.ensure_open()?;
        const OP: &str = "physical group";
        if name.is_empty() || members.is_empty() {
            return Err(MeshError::kernel(OP, "groups need a name and members"));
        }
        for m in members.iter() {
            match dim {
                EntityDim::Curve => self.require_curve(*m, OP).map(|_| ())?,
                EntityDim::Surface => lookup(&self.surfaces, *m, OP).map(|_| ())?,
            }
        }

        let tag = next_tag(&self.groups);
        self.groups.push(PhysicalGroup {
            tag,
            dim,
            name: name.to_string(),
            members: members.to_vec(),
        });
        Ok(tag)
    }

    fn finalize(&mut self) -> MeshResult<()> {
        self.ensure_open()?;
        self.finalized = true;
        Ok(())
    }
}

fn join<T: Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

impl Display for GeoModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "// C-type structured airfoil mesh")?;
        writeln!(f, "SetFactory(\"Built-in\");")?;

        for (i, p) in self.points.iter().enumerate() {
            writeln!(f, "Point({}) = {{{}, {}, 0, {}}};", i + 1, p.at.x, p.at.y, p.mesh_size)?;
        }

        for (i, c) in self.curves.iter().enumerate() {
            match c {
                GeoCurve::Line { start, end } => {
                    writeln!(f, "Line({}) = {{{}, {}}};", i + 1, start.0, end.0)?
                }
                GeoCurve::Spline { points } => writeln!(
                    f,
                    "Spline({}) = {{{}}};",
                    i + 1,
                    join(points.iter().map(|p| p.0))
                )?,
                GeoCurve::CircleArc { start, center, end } => writeln!(
                    f,
                    "Circle({}) = {{{}, {}, {}}};",
                    i + 1,
                    start.0,
                    center.0,
                    end.0
                )?,
            }
        }

        for (i, l) in self.loops.iter().enumerate() {
            writeln!(f, "Curve Loop({}) = {{{}}};", i + 1, join(l.iter().map(|c| c.signed())))?;
        }

        for (i, s) in self.surfaces.iter().enumerate() {
            writeln!(f, "Plane Surface({}) = {{{}}};", i + 1, join(s.iter().map(|l| l.0)))?;
        }

        for (tag, t) in self.transfinite_curves.iter() {
            match t.law {
                SpacingLaw::Uniform => writeln!(f, "Transfinite Curve {{{}}} = {};", tag.0, t.nodes)?,
                SpacingLaw::Progression(r) => writeln!(
                    f,
                    "Transfinite Curve {{{}}} = {} Using Progression {};",
                    tag.0, t.nodes, r
                )?,
                SpacingLaw::Bump(b) => writeln!(
                    f,
                    "Transfinite Curve {{{}}} = {} Using Bump {};",
                    tag.0, t.nodes, b
                )?,
            }
        }

        for s in self.transfinite_surfaces.iter() {
            writeln!(f, "Transfinite Surface {{{}}};", s.0)?;
        }

        for (s, angle) in self.recombined.iter() {
            writeln!(f, "Recombine Surface {{{}}} = {};", s.0, angle)?;
        }

        for g in self.groups.iter() {
            let kind = match g.dim {
                EntityDim::Curve => "Curve",
                EntityDim::Surface => "Surface",
            };
            writeln!(
                f,
                "Physical {}(\"{}\", {}) = {{{}}};",
                kind,
                g.name,
                g.tag.0,
                join(g.members.iter().map(|m| m.0))
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(model: &mut GeoModel) -> (Vec<Tag>, Vec<Tag>) {
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let points: Vec<Tag> = corners
            .iter()
            .map(|(x, y)| model.add_point(&Point2::new(*x, *y), 0.1).unwrap())
            .collect();
        let lines: Vec<Tag> = (0..4)
            .map(|i| model.add_line(points[i], points[(i + 1) % 4]).unwrap())
            .collect();
        (points, lines)
    }

    #[test]
    fn closed_loop_is_accepted() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented: Vec<OrientedTag> = lines.iter().map(|l| OrientedTag::forward(*l)).collect();

        let l = model.add_curve_loop(&oriented).unwrap();
        assert_eq!(Tag(1), l);
        assert_eq!(4, model.curve_loop(l).unwrap().len());
    }

    #[test]
    fn open_loop_is_rejected() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented = vec![
            OrientedTag::forward(lines[0]),
            OrientedTag::reversed(lines[1]),
            OrientedTag::forward(lines[2]),
            OrientedTag::forward(lines[3]),
        ];

        let result = model.add_curve_loop(&oriented);
        assert!(matches!(result, Err(MeshError::KernelFailure { .. })));
    }

    #[test]
    fn reversed_loop_is_accepted() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented: Vec<OrientedTag> =
            lines.iter().rev().map(|l| OrientedTag::reversed(*l)).collect();

        assert!(model.add_curve_loop(&oriented).is_ok());
    }

    #[test]
    fn circle_arc_requires_equal_radii() {
        let mut model = GeoModel::new();
        let c = model.add_point(&Point2::new(0.0, 0.0), 0.1).unwrap();
        let a = model.add_point(&Point2::new(-1.0, -1.0), 0.1).unwrap();
        let b = model.add_point(&Point2::new(-1.0, 1.0), 0.1).unwrap();
        let far = model.add_point(&Point2::new(-1.0, 2.0), 0.1).unwrap();

        assert!(model.add_circle_arc(a, c, b).is_ok());
        assert!(model.add_circle_arc(a, c, far).is_err());
    }

    #[test]
    fn circle_arc_rejects_half_turn() {
        let mut model = GeoModel::new();
        let c = model.add_point(&Point2::new(0.0, 0.0), 0.1).unwrap();
        let a = model.add_point(&Point2::new(0.0, -1.0), 0.1).unwrap();
        let b = model.add_point(&Point2::new(0.0, 1.0), 0.1).unwrap();

        assert!(model.add_circle_arc(a, c, b).is_err());
    }

    #[test]
    fn transfinite_surface_checks_opposite_sides() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented: Vec<OrientedTag> = lines.iter().map(|l| OrientedTag::forward(*l)).collect();
        let l = model.add_curve_loop(&oriented).unwrap();
        let s = model.add_plane_surface(&[l]).unwrap();

        model.set_transfinite_curve(lines[0], 10, SpacingLaw::Uniform).unwrap();
        model.set_transfinite_curve(lines[1], 5, SpacingLaw::Progression(1.2)).unwrap();
        model.set_transfinite_curve(lines[2], 10, SpacingLaw::Uniform).unwrap();
        model.set_transfinite_curve(lines[3], 6, SpacingLaw::Progression(1.0 / 1.2)).unwrap();
        assert!(model.set_transfinite_surface(s).is_err());

        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented: Vec<OrientedTag> = lines.iter().map(|l| OrientedTag::forward(*l)).collect();
        let l = model.add_curve_loop(&oriented).unwrap();
        let s = model.add_plane_surface(&[l]).unwrap();
        for (i, line) in lines.iter().enumerate() {
            let n = if i % 2 == 0 { 10 } else { 5 };
            model.set_transfinite_curve(*line, n, SpacingLaw::Uniform).unwrap();
        }
        assert!(model.set_transfinite_surface(s).is_ok());
        assert!(model.is_transfinite_surface(s));
    }

    #[test]
    fn conflicting_transfinite_settings_are_rejected() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);

        model.set_transfinite_curve(lines[0], 10, SpacingLaw::Bump(0.2)).unwrap();
        assert!(model.set_transfinite_curve(lines[0], 10, SpacingLaw::Bump(0.2)).is_ok());
        assert!(model.set_transfinite_curve(lines[0], 11, SpacingLaw::Bump(0.2)).is_err());
        assert!(model.set_transfinite_curve(lines[1], 1, SpacingLaw::Uniform).is_err());
    }

    #[test]
    fn geo_script_output() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented: Vec<OrientedTag> = lines.iter().map(|l| OrientedTag::forward(*l)).collect();
        let l = model.add_curve_loop(&oriented).unwrap();
        let s = model.add_plane_surface(&[l]).unwrap();
        model.set_transfinite_curve(lines[0], 4, SpacingLaw::Progression(1.5)).unwrap();
        model.add_physical_group(EntityDim::Surface, &[s], "fluid").unwrap();

        let script = model.to_geo_script();
        assert!(script.contains("Point(1) = {0, 0, 0, 0.1};"));
        assert!(script.contains("Line(2) = {2, 3};"));
        assert!(script.contains("Curve Loop(1) = {1, 2, 3, 4};"));
        assert!(script.contains("Transfinite Curve {1} = 4 Using Progression 1.5;"));
        assert!(script.contains("Physical Surface(\"fluid\", 1) = {1};"));
    }

    #[test]
    fn finalized_model_refuses_changes() {
        let mut model = GeoModel::new();
        let (points, _) = square(&mut model);
        assert!(!model.is_finalized());

        model.finalize().unwrap();
        assert!(model.is_finalized());
        assert!(matches!(
            model.add_line(points[0], points[2]),
            Err(MeshError::KernelFailure { operation: "session", .. })
        ));
        assert!(model.finalize().is_err());
        assert_eq!(4, model.point_count());
    }

    #[test]
    fn json_dump() {
        let mut model = GeoModel::new();
        let (_, lines) = square(&mut model);
        let oriented: Vec<OrientedTag> = lines.iter().map(|l| OrientedTag::forward(*l)).collect();
        let l = model.add_curve_loop(&oriented).unwrap();
        let s = model.add_plane_surface(&[l]).unwrap();
        model.set_transfinite_curve(lines[0], 4, SpacingLaw::Uniform).unwrap();

        assert_eq!(Some(&[l][..]), model.surface_loops(s));

        let value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(4, value["points"].as_array().unwrap().len());
        assert_eq!(1.0, value["points"][2]["at"]["x"].as_f64().unwrap());
        assert_eq!(4, value["transfinite_curves"]["1"]["nodes"].as_u64().unwrap());
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut model = GeoModel::new();
        assert!(model.add_line(Tag(1), Tag(2)).is_err());
        assert!(model.add_physical_group(EntityDim::Curve, &[Tag(0)], "x").is_err());
    }
}
