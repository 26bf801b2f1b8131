use crate::errors::{MeshError, MeshResult};
use ncollide2d::na::Point2;
use serde::{Deserialize, Serialize};

/// Outer envelope the airfoil and its boundary layer must fit inside
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Farfield {
    Circle { radius: f64 },
    Box { length: f64, width: f64 },
}

/// Physical sizing of a structured C-mesh request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Length of the wake region behind the trailing edge
    pub dx_trail: f64,

    /// Full height of the domain
    pub dy: f64,

    /// Target cell size along the airfoil surface
    pub airfoil_mesh_size: f64,

    /// Height of the first cell next to the wall
    pub first_layer: f64,

    /// Growth ratio of the cells away from the wall
    pub growth_ratio: f64,

    /// Angle of attack in degrees, positive nose up
    pub aoa_deg: f64,

    /// Number of boundary layer cells counted in the bounds check
    pub nb_layers: usize,

    /// Envelope for the bounds check. Without one, the C-domain itself is used.
    pub farfield: Option<Farfield>,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            dx_trail: 10.0,
            dy: 10.0,
            airfoil_mesh_size: 0.01,
            first_layer: 3e-5,
            growth_ratio: 1.2,
            aoa_deg: 0.0,
            nb_layers: 35,
            farfield: None,
        }
    }
}

fn positive(name: &str, value: f64) -> MeshResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::InvalidParameters(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

impl MeshParams {
    pub fn from_json(text: &str) -> MeshResult<MeshParams> {
        let params: MeshParams = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> MeshResult<()> {
        positive("dx_trail", self.dx_trail)?;
        positive("dy", self.dy)?;
        positive("airfoil_mesh_size", self.airfoil_mesh_size)?;
        positive("first_layer", self.first_layer)?;
        if !(self.growth_ratio.is_finite() && self.growth_ratio > 1.0) {
            return Err(MeshError::InvalidParameters(format!(
                "growth_ratio must be greater than 1, got {}",
                self.growth_ratio
            )));
        }
        if !self.aoa_deg.is_finite() || self.aoa_deg.abs() >= 90.0 {
            return Err(MeshError::InvalidParameters(format!(
                "angle of attack {} is out of range",
                self.aoa_deg
            )));
        }

        match self.farfield {
            Some(Farfield::Circle { radius }) => positive("farfield radius", radius),
            Some(Farfield::Box { length, width }) => {
                positive("farfield length", length)?;
                positive("farfield width", width)
            }
            None => Ok(()),
        }
    }

    /// Total height of `nb_layers` wall cells growing geometrically from `first_layer`
    pub fn boundary_layer_thickness(&self) -> f64 {
        let r = self.growth_ratio;
        let n = self.nb_layers as f64;
        if (r - 1.0).abs() < 1e-12 {
            self.first_layer * n
        } else {
            self.first_layer * (r.powf(n) - 1.0) / (r - 1.0)
        }
    }

    pub fn half_height(&self) -> f64 {
        self.dy / 2.0
    }
}

/// First cell divisor used for surface meshes finer than `below`
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeRegime {
    pub below: f64,
    pub divisor: f64,
}

/// Empirical constants of the topology builder and the edge discretization policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningParameters {
    /// Chord fraction past which the front arc ends on each surface
    pub split_threshold: f64,

    /// Furthest the inlet points may sit upstream of the leading edge
    pub inlet_max_upstream: f64,

    /// Closest the inlet points may sit to the leading edge, as a fraction of `dy`
    pub inlet_min_offset: f64,

    /// Upstream offset used when the inlet point construction degenerates
    pub inlet_fallback_offset: f64,

    /// Cell growth along the wake
    pub wake_progression: f64,

    /// Extra resolution on the front arc relative to its length over the surface mesh size
    pub front_node_multiplier: f64,

    /// Largest bump coefficient on the front arc and inlet
    pub front_bump_base: f64,

    /// Smallest bump coefficient on the front arc and inlet
    pub front_bump_floor: f64,

    /// Divisors of the surface mesh size giving the first cell behind the split points, by
    /// increasing mesh size
    pub surface_regimes: Vec<SizeRegime>,

    /// Divisor for surface mesh sizes above every regime
    pub coarse_divisor: f64,

    pub recombine_angle: f64,

    /// Center of the angle of attack rotation
    pub pivot: [f64; 2],
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            split_threshold: 0.041,
            inlet_max_upstream: 3.5,
            inlet_min_offset: 0.05,
            inlet_fallback_offset: 1.0,
            wake_progression: 1.025,
            front_node_multiplier: 3.0,
            front_bump_base: 0.5,
            front_bump_floor: 0.05,
            surface_regimes: vec![
                SizeRegime {
                    below: 0.005,
                    divisor: 1.4,
                },
                SizeRegime {
                    below: 0.02,
                    divisor: 8.0 / 3.0,
                },
            ],
            coarse_divisor: 3.0,
            recombine_angle: 90.0,
            pivot: [0.5, 0.0],
        }
    }
}

impl TuningParameters {
    pub fn from_json(text: &str) -> MeshResult<TuningParameters> {
        let tuning: TuningParameters = serde_json::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> MeshResult<()> {
        if !(self.split_threshold > 0.0 && self.split_threshold < 0.5) {
            return Err(MeshError::InvalidParameters(format!(
                "split threshold {} must be within (0, 0.5)",
                self.split_threshold
            )));
        }
        positive("inlet_max_upstream", self.inlet_max_upstream)?;
        positive("inlet_min_offset", self.inlet_min_offset)?;
        positive("inlet_fallback_offset", self.inlet_fallback_offset)?;
        if !(self.wake_progression.is_finite() && self.wake_progression >= 1.0) {
            return Err(MeshError::InvalidParameters(format!(
                "wake_progression must be at least 1, got {}",
                self.wake_progression
            )));
        }
        positive("front_node_multiplier", self.front_node_multiplier)?;
        positive("front_bump_floor", self.front_bump_floor)?;
        positive("coarse_divisor", self.coarse_divisor)?;
        positive("recombine_angle", self.recombine_angle)?;
        if self.front_bump_base < self.front_bump_floor {
            return Err(MeshError::InvalidParameters(
                "front bump base is below its floor".to_string(),
            ));
        }
        for r in self.surface_regimes.iter() {
            positive("surface regime bound", r.below)?;
            positive("surface regime divisor", r.divisor)?;
        }
        if !self.pivot.iter().all(|v| v.is_finite()) {
            return Err(MeshError::InvalidParameters("pivot must be finite".to_string()));
        }

        Ok(())
    }

    /// Divisor of the surface mesh size for the first cell after the split points. Finer meshes
    /// use a smaller divisor.
    pub fn surface_divisor(&self, airfoil_mesh_size: f64) -> f64 {
        self.surface_regimes
            .iter()
            .find(|r| airfoil_mesh_size < r.below)
            .map(|r| r.divisor)
            .unwrap_or(self.coarse_divisor)
    }

    pub fn pivot_point(&self) -> Point2<f64> {
        Point2::new(self.pivot[0], self.pivot[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test]
    fn defaults_are_valid() {
        assert!(MeshParams::default().validate().is_ok());
        assert!(TuningParameters::default().validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let params =
            MeshParams::from_json(r#"{"dy": 20.0, "farfield": {"circle": {"radius": 8.0}}}"#)
                .unwrap();

        assert_relative_eq!(20.0, params.dy);
        assert_relative_eq!(10.0, params.dx_trail);
        assert_eq!(Some(Farfield::Circle { radius: 8.0 }), params.farfield);
    }

    #[test]
    fn tuning_json() {
        let tuning = TuningParameters::from_json(r#"{"split_threshold": 0.031}"#).unwrap();
        assert_relative_eq!(0.031, tuning.split_threshold);
        assert_eq!(2, tuning.surface_regimes.len());
    }

    #[test_case(r#"{"dy": -1.0}"#)]
    #[test_case(r#"{"growth_ratio": 1.0}"#)]
    #[test_case(r#"{"first_layer": 0.0}"#)]
    #[test_case(r#"{"aoa_deg": 95.0}"#)]
    #[test_case(r#"{"farfield": {"box": {"length": 4.0, "width": 0.0}}}"#)]
    fn invalid_params(text: &str) {
        assert!(matches!(
            MeshParams::from_json(text),
            Err(MeshError::InvalidParameters(_))
        ));
    }

    #[test_case(r#"{"wake_progression": 0.98}"#)]
    #[test_case(r#"{"wake_progression": 0.0}"#)]
    #[test_case(r#"{"split_threshold": 0.6}"#)]
    fn invalid_tuning(text: &str) {
        assert!(matches!(
            TuningParameters::from_json(text),
            Err(MeshError::InvalidParameters(_))
        ));
    }

    #[test]
    fn uniform_wake_is_accepted() {
        let tuning = TuningParameters::from_json(r#"{"wake_progression": 1.0}"#).unwrap();
        assert_relative_eq!(1.0, tuning.wake_progression);
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            MeshParams::from_json("{dy: 1"),
            Err(MeshError::Json(_))
        ));
    }

    #[test_case(0.001, 1.4)]
    #[test_case(0.01, 8.0 / 3.0)]
    #[test_case(0.02, 3.0)]
    #[test_case(0.1, 3.0)]
    fn surface_divisor_regimes(size: f64, e: f64) {
        assert_relative_eq!(e, TuningParameters::default().surface_divisor(size));
    }

    #[test]
    fn boundary_layer_thickness() {
        let params = MeshParams::default();
        let expected = 3e-5 * (1.2f64.powi(35) - 1.0) / 0.2;
        assert_relative_eq!(expected, params.boundary_layer_thickness(), epsilon = 1e-12);
        assert!(params.boundary_layer_thickness() > 0.08);
        assert!(params.boundary_layer_thickness() < 0.1);
    }
}
