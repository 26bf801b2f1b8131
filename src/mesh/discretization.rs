use crate::airfoil::ArcKind;
use crate::algorithms::{series_ratio_from_endpoints, series_term_count, MIN_TERMS};
use crate::kernel::SpacingLaw;
use crate::mesh::params::{MeshParams, TuningParameters};
use crate::mesh::topology::{CTypeTopology, EdgeId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Node count and spacing law of one transfinite edge, in the edge's own direction
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct EdgeDiscretization {
    pub edge: EdgeId,
    pub nodes: usize,
    pub law: SpacingLaw,
}

/// One discretization per topology edge. Blocks sharing an edge look up the same entry, so they
/// can never disagree.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Discretization {
    edges: BTreeMap<EdgeId, EdgeDiscretization>,
}

impl Discretization {
    pub fn get(&self, edge: EdgeId) -> Option<&EdgeDiscretization> {
        self.edges.get(&edge)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeDiscretization> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn nodes(&self, edge: EdgeId) -> usize {
        self.edges.get(&edge).map(|d| d.nodes).unwrap_or(0)
    }

    fn assign(&mut self, edges: &[EdgeId], nodes: usize, law: SpacingLaw) {
        for edge in edges.iter() {
            if self.edges.contains_key(edge) {
                log::warn!("discretization of {:?} assigned twice, keeping the first", edge);
                continue;
            }
            self.edges.insert(
                *edge,
                EdgeDiscretization {
                    edge: *edge,
                    nodes,
                    law,
                },
            );
        }
    }
}

/// Turns the physical sizing of a mesh request into node counts and spacing laws.
///
/// * Wall-normal edges (L0, L3, L4, L7, L8, L9) cover half the domain height with a geometric
///   series starting at the first layer height and growing by the growth ratio.
/// * Wake edges (L2, L5, L10) cover the wake length starting at the surface mesh size.
/// * The upper and lower surfaces, and the top and bottom edges facing them (L1, L6), are fit with
///   a series from a fraction of the surface mesh size behind the split point up to the surface
///   mesh size at the trailing edge.
/// * The front arc and the inlet arc get a bump distribution.
pub struct EdgeDiscretizationPolicy<'a> {
    params: &'a MeshParams,
    tuning: &'a TuningParameters,
}

impl<'a> EdgeDiscretizationPolicy<'a> {
    pub fn new(params: &'a MeshParams, tuning: &'a TuningParameters) -> Self {
        Self { params, tuning }
    }

    /// Node count across the boundary layer, from the wall to the top or bottom of the domain
    pub fn wall_normal_nodes(&self) -> usize {
        series_term_count(
            self.params.half_height(),
            self.params.first_layer,
            self.params.growth_ratio,
        )
    }

    pub fn wake_nodes(&self) -> usize {
        series_term_count(
            self.params.dx_trail,
            self.params.airfoil_mesh_size,
            self.tuning.wake_progression,
        )
    }

    /// Node count and progression along a surface arc of the given length, growing from the split
    /// point toward the trailing edge. Falls back to a uniform distribution when the arc is too
    /// short for the fit.
    pub fn surface(&self, length: f64) -> (usize, f64) {
        let size = self.params.airfoil_mesh_size;
        let first = size / self.tuning.surface_divisor(size);
        let fit = series_ratio_from_endpoints(length, first, size);
        if fit.is_degenerate() {
            log::warn!(
                "surface arc of length {:.5} is too short for a progression, using {} uniform nodes",
                length,
                fit.count
            );
        }
        (fit.count, fit.ratio)
    }

    /// Node count on the front arc, scaled up from its length over the surface mesh size to
    /// resolve the leading edge curvature
    pub fn front_nodes(&self, length: f64) -> usize {
        let n = (self.tuning.front_node_multiplier * length / self.params.airfoil_mesh_size).ceil();
        if n.is_finite() {
            (n as usize).max(MIN_TERMS)
        } else {
            MIN_TERMS
        }
    }

    /// Bump coefficient shared by the front arc and the inlet arc. The further upstream the inlet
    /// sits relative to the domain half height, the smaller the coefficient and the stronger the
    /// clustering toward the ends.
    pub fn front_bump(&self, inlet_offset: f64) -> f64 {
        let h = self.params.half_height();
        let raw = self.tuning.front_bump_base * h / (h + inlet_offset.max(0.0));
        raw.max(self.tuning.front_bump_floor)
            .min(self.tuning.front_bump_base)
    }

    pub fn discretize(&self, topology: &CTypeTopology) -> Discretization {
        use EdgeId::*;

        let mut d = Discretization::default();
        let r = self.params.growth_ratio;
        let w = self.tuning.wake_progression;

        // Edges running toward the airfoil or the trailing edge take the reversed law
        let n_y = self.wall_normal_nodes();
        let wall = SpacingLaw::Progression(r);
        d.assign(&[L0, L8, L9, L4], n_y, wall);
        d.assign(&[L7, L3], n_y, wall.reversed());

        let n_w = self.wake_nodes();
        let wake = SpacingLaw::Progression(w);
        d.assign(&[L2], n_w, wake);
        d.assign(&[L10, L5], n_w, wake.reversed());

        let (n_up, r_up) = self.surface(topology.arc_length(ArcKind::Upper));
        d.assign(&[Upper, L1], n_up, SpacingLaw::Progression(r_up));

        let (n_low, r_low) = self.surface(topology.arc_length(ArcKind::Lower));
        d.assign(&[Lower, L6], n_low, SpacingLaw::Progression(r_low).reversed());

        let n_front = self.front_nodes(topology.arc_length(ArcKind::Front));
        let bump = self.front_bump(topology.inlet_offset());
        d.assign(&[Front, InletArc], n_front, SpacingLaw::Bump(bump));

        log::debug!(
            "nodes: wall normal {}, wake {}, upper {}, lower {}, front {}",
            n_y,
            n_w,
            n_up,
            n_low,
            n_front
        );

        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::generate::{AirfoilGenerator, Naca4Digit};
    use crate::airfoil::AirfoilContour;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn discretize(name: &str, params: &MeshParams) -> (CTypeTopology, Discretization) {
        let tuning = TuningParameters::default();
        let points = Naca4Digit::from_digits(name).unwrap().point_cloud(100);
        let contour = AirfoilContour::new(&points, None)
            .unwrap()
            .position(params.aoa_deg)
            .split(tuning.split_threshold)
            .unwrap();
        let topology = CTypeTopology::build(&contour, params, &tuning);
        let d = EdgeDiscretizationPolicy::new(params, &tuning).discretize(&topology);
        (topology, d)
    }

    #[test]
    fn every_edge_is_discretized_once() {
        let (_, d) = discretize("0012", &MeshParams::default());
        assert!(Discretization::default().is_empty());
        assert!(!d.is_empty());
        assert_eq!(EdgeId::ALL.len(), d.len());
        for e in EdgeId::ALL.iter() {
            let entry = d.get(*e).unwrap();
            assert_eq!(*e, entry.edge);
            assert!(entry.nodes >= MIN_TERMS);
        }
    }

    #[test]
    fn opposite_sides_match() {
        let params = MeshParams {
            aoa_deg: 4.0,
            ..MeshParams::default()
        };
        let (topology, d) = discretize("2412", &params);
        for block in topology.blocks().iter() {
            let n: Vec<usize> = block.sides.iter().map(|s| d.nodes(s.edge)).collect();
            assert_eq!(n[0], n[2], "block {:?}", block.label);
            assert_eq!(n[1], n[3], "block {:?}", block.label);
        }
    }

    #[test]
    fn symmetric_wall_normal_counts() {
        let (_, d) = discretize("0012", &MeshParams::default());
        assert_eq!(58, d.nodes(EdgeId::L0));
        assert_eq!(d.nodes(EdgeId::L0), d.nodes(EdgeId::L7));
        assert_eq!(d.nodes(EdgeId::Upper), d.nodes(EdgeId::Lower));

        match (d.get(EdgeId::L0).unwrap().law, d.get(EdgeId::L7).unwrap().law) {
            (SpacingLaw::Progression(a), SpacingLaw::Progression(b)) => {
                assert_relative_eq!(1.2, a, epsilon = 1e-12);
                assert_relative_eq!(1.0 / 1.2, b, epsilon = 1e-12);
            }
            other => panic!("unexpected laws {:?}", other),
        }
    }

    #[test]
    fn surface_grows_toward_trailing_edge() {
        let (_, d) = discretize("0012", &MeshParams::default());
        match (d.get(EdgeId::Upper).unwrap().law, d.get(EdgeId::Lower).unwrap().law) {
            (SpacingLaw::Progression(up), SpacingLaw::Progression(low)) => {
                assert!(up > 1.0);
                assert_relative_eq!(1.0 / up, low, epsilon = 1e-12);
            }
            other => panic!("unexpected laws {:?}", other),
        }
        assert_eq!(d.get(EdgeId::Upper).unwrap().law, d.get(EdgeId::L1).unwrap().law);
        assert_eq!(d.get(EdgeId::Lower).unwrap().law, d.get(EdgeId::L6).unwrap().law);
    }

    #[test]
    fn front_and_inlet_share_bump() {
        let (_, d) = discretize("0012", &MeshParams::default());
        let front = d.get(EdgeId::Front).unwrap();
        let inlet = d.get(EdgeId::InletArc).unwrap();
        assert_eq!(front.nodes, inlet.nodes);
        assert_eq!(front.law, inlet.law);
        assert!(front.nodes > 20);
    }

    #[test]
    fn short_surface_falls_back_to_uniform() {
        let params = MeshParams::default();
        let tuning = TuningParameters::default();
        let policy = EdgeDiscretizationPolicy::new(&params, &tuning);

        assert_eq!((MIN_TERMS, 1.0), policy.surface(0.005));
        assert_eq!((MIN_TERMS, 1.0), policy.surface(0.0));
    }

    #[test_case(0.0, 0.5)]
    #[test_case(5.0, 0.25)]
    #[test_case(1e6, 0.05)]
    fn bump_strengthens_with_inlet_offset(offset: f64, e: f64) {
        let params = MeshParams::default();
        let tuning = TuningParameters::default();
        let policy = EdgeDiscretizationPolicy::new(&params, &tuning);
        assert_relative_eq!(e, policy.front_bump(offset), epsilon = 1e-12);
    }

    #[test]
    fn wake_node_count() {
        let params = MeshParams::default();
        let tuning = TuningParameters::default();
        let policy = EdgeDiscretizationPolicy::new(&params, &tuning);
        assert_eq!(series_term_count(10.0, 0.01, 1.025), policy.wake_nodes());
        assert!(policy.wake_nodes() > 100);
    }
}
