use crate::errors::{MeshError, MeshResult};
use ncollide2d::na::Point2;
use std::f64::consts::PI;

pub const DEFAULT_STATIONS: usize = 100;

/// The camber point and the two surface points at one chord station
#[derive(Copy, Clone, Debug)]
pub struct CamberStation {
    pub camber: Point2<f64>,
    pub upper: Point2<f64>,
    pub lower: Point2<f64>,
}

impl CamberStation {
    pub fn new(camber: Point2<f64>, upper: Point2<f64>, lower: Point2<f64>) -> CamberStation {
        CamberStation {
            camber,
            upper,
            lower,
        }
    }
}

/// Chord fractions from 0.0 to 1.0 clustered toward both the leading and the trailing edge
pub fn cosine_spacing(count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![0.0; count];
    }

    (0..count)
        .map(|i| {
            let beta = PI * i as f64 / (count - 1) as f64;
            0.5 * (1.0 - beta.cos())
        })
        .collect()
}

/// An AirfoilGenerator is an entity which can generate the x, y position of the mean camber line
/// and the airfoil thickness at fractions of the chord. This provides the information necessary
/// for a generator to compute the airfoil surfaces.
pub trait AirfoilGenerator {
    /// Return a 2D point with the position of the camber line at a fraction from 0.0 to 1.0
    fn camber_line(&self, x: f64) -> Point2<f64>;

    /// Slope dy/dx of the camber line at a fraction from 0.0 to 1.0
    fn camber_slope(&self, x: f64) -> f64;

    /// Return the full thickness of the airfoil with respect to the camber line at a fraction from
    /// 0.0 to 1.0
    fn thickness(&self, x: f64) -> f64;

    /// The surface points at a chord fraction, with the half thickness laid off perpendicular to
    /// the camber line
    fn station_at(&self, x: f64) -> CamberStation {
        let c = self.camber_line(x);
        let theta = self.camber_slope(x).atan();
        let half = self.thickness(x) / 2.0;
        let (s, co) = theta.sin_cos();

        CamberStation::new(
            c,
            Point2::new(c.x - half * s, c.y + half * co),
            Point2::new(c.x + half * s, c.y - half * co),
        )
    }

    /// A closed, clockwise point cloud starting at the leading edge: the upper surface from the
    /// leading edge up to (but not including) the trailing edge station, followed by the lower
    /// surface from the trailing edge back toward the leading edge, without repeating it.
    fn point_cloud(&self, nb_stations: usize) -> Vec<Point2<f64>> {
        let stations: Vec<CamberStation> = cosine_spacing(nb_stations)
            .into_iter()
            .map(|x| self.station_at(x))
            .collect();

        if stations.len() < 2 {
            return stations.iter().map(|s| s.camber).collect();
        }

        let last = stations.len() - 1;
        let mut cloud: Vec<Point2<f64>> = stations[..last].iter().map(|s| s.upper).collect();
        cloud.extend(stations[1..].iter().rev().map(|s| s.lower));
        cloud
    }
}

/// A generator for a NACA 4-digit airfoil of the form MPTT, where M is the maximum camber P is the
/// location of the maximum camber, and TT is the maximum thickness of the airfoil as a fraction of
/// the chord.  For example, a NACA 2412 airfoil has a 2% camber at 40% of the chord and a max
/// thickness which is 12% of the chord length. The thickness uses the closed trailing edge form,
/// so both surfaces meet at a single point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Naca4Digit {
    t: f64,
    chord_len: f64,
    m: f64,
    p: f64,
}

impl Naca4Digit {
    /// Create a new NACA 4 digit generator.
    ///
    /// # Arguments
    ///
    /// * `t_max` - the maximum thickness of the airfoil as a fraction of the chord length. For
    /// instance, on a NACA 2412 t_max should be 0.12
    ///
    /// * `chord_len` - the actual length of the airfoil chord
    ///
    /// * `max_camber` - The max camber as a fraction, for example on a NACA 2412 this value should
    /// be set to 0.02
    ///
    /// * `max_camber_chord` - The location of the max camber as a fraction of chord length. For
    /// example on a NACA 2412 this values should be 0.4
    pub fn new(t_max: f64, chord_len: f64, max_camber: f64, max_camber_chord: f64) -> Naca4Digit {
        Naca4Digit {
            t: t_max,
            chord_len,
            m: max_camber,
            p: max_camber_chord,
        }
    }

    /// Parses a designation such as "0012" or "2412" into a unit chord generator
    pub fn from_digits(designation: &str) -> MeshResult<Naca4Digit> {
        let digits: Vec<u32> = designation
            .trim()
            .chars()
            .map(|c| c.to_digit(10))
            .collect::<Option<Vec<u32>>>()
            .ok_or_else(|| {
                MeshError::InvalidParameters(format!("'{}' is not a NACA 4 digit name", designation))
            })?;

        if digits.len() != 4 {
            return Err(MeshError::InvalidParameters(format!(
                "'{}' is not a NACA 4 digit name",
                designation
            )));
        }

        let t = (digits[2] * 10 + digits[3]) as f64 / 100.0;
        if t <= 0.0 {
            return Err(MeshError::InvalidParameters(format!(
                "NACA {} has no thickness",
                designation
            )));
        }

        Ok(Naca4Digit::new(
            t,
            1.0,
            digits[0] as f64 / 100.0,
            digits[1] as f64 / 10.0,
        ))
    }

    fn is_symmetric(&self) -> bool {
        self.p < 1e-6 || self.m == 0.0
    }
}

impl AirfoilGenerator for Naca4Digit {
    fn camber_line(&self, x: f64) -> Point2<f64> {
        let y = if self.is_symmetric() {
            0.0
        } else if x < self.p {
            (self.m / self.p.powf(2.0)) * (2.0 * self.p * x - x.powf(2.0))
        } else {
            (self.m / (1.0 - self.p).powf(2.0))
                * ((1.0 - 2.0 * self.p) + 2.0 * self.p * x - x.powf(2.0))
        };

        Point2::new(x * self.chord_len, y * self.chord_len)
    }

    fn camber_slope(&self, x: f64) -> f64 {
        if self.is_symmetric() {
            0.0
        } else if x < self.p {
            (2.0 * self.m / self.p.powf(2.0)) * (self.p - x)
        } else {
            (2.0 * self.m / (1.0 - self.p).powf(2.0)) * (self.p - x)
        }
    }

    fn thickness(&self, x: f64) -> f64 {
        (10.0 * self.t * self.chord_len)
            * (0.2969 * x.sqrt()
                + -0.126 * x
                + -0.3516 * x.powf(2.0)
                + 0.2843 * x.powf(3.0)
                + -0.1036 * x.powf(4.0))
    }
}
