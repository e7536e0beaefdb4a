use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A reference ellipsoid of revolution, described by its semi-major axis and flattening.
///
/// Everything else the conversions need (eccentricities, the semi-minor axis, the coefficients
/// of the meridional arc series) is derived once at construction.
///
/// When (de)serialized, only the two defining parameters are written, and deserialization goes
/// through the same validation as [`Ellipsoid::new`]:
///
/// ```yaml
/// semi_major_axis: 6378137.0
/// flattening: 0.0033528106647474805
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Parameters", into = "Parameters")
)]
pub struct Ellipsoid {
    #[doc(alias = "a")]
    semi_major_axis: f64,
    #[doc(alias = "f")]
    flattening: f64,
    #[doc(alias = "b")]
    semi_minor_axis: f64,
    #[doc(alias = "e^2")]
    eccentricity_sq: f64,
    #[doc(alias = "e2prime")]
    second_eccentricity_sq: f64,
    // coefficients of the meridional arc series, see `meridional_arc`
    arc: [f64; 4],
}

impl Ellipsoid {
    /// The [World Geodetic System '84](https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84)
    /// ellipsoid.
    ///
    /// <https://nsgreg.nga.mil/doc/view?i=4085> table 3.1
    pub const WGS84: Self = Self::new_unchecked(6_378_137.0, 1.0 / 298.257_223_563);

    /// The GRS 80 ellipsoid, which differs from WGS84 only in the ninth significant digit of the
    /// flattening.
    pub const GRS80: Self = Self::new_unchecked(6_378_137.0, 1.0 / 298.257_222_101);

    /// The WGS 72 ellipsoid.
    pub const WGS72: Self = Self::new_unchecked(6_378_135.0, 1.0 / 298.26);

    /// Constructs an ellipsoid from its semi-major axis `a` in meters and its flattening `f`.
    ///
    /// `a` must be finite and positive, `f` must be finite and in `[0, 1)`.
    pub fn new(semi_major_axis: f64, flattening: f64) -> Result<Self> {
        if !(semi_major_axis.is_finite() && semi_major_axis > 0.)
            || !(flattening.is_finite() && (0. ..1.).contains(&flattening))
        {
            return Err(Error::InvalidEllipsoid {
                semi_major_axis,
                flattening,
            });
        }
        Ok(Self::new_unchecked(semi_major_axis, flattening))
    }

    const fn new_unchecked(a: f64, f: f64) -> Self {
        // b/a = 1 - f
        let b = a * (1.0 - f);
        // e^2 = 1 - b^2/a^2
        //     = 1 - (1 - f)^2
        //     = 2 * f - f^2
        let e2 = 2.0 * f - f * f;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        Self {
            semi_major_axis: a,
            flattening: f,
            semi_minor_axis: b,
            eccentricity_sq: e2,
            second_eccentricity_sq: e2 / (1.0 - e2),
            // Snyder, "Map Projections: A Working Manual", eq. 3-21
            arc: [
                1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
                3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
                15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
                35.0 * e6 / 3072.0,
            ],
        }
    }

    /// The equatorial radius `a`, in meters.
    #[must_use]
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// The flattening `f = (a - b) / a`.
    #[must_use]
    pub fn flattening(&self) -> f64 {
        self.flattening
    }

    /// The polar radius `b`, in meters.
    #[must_use]
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_minor_axis
    }

    /// The first eccentricity squared, `e² = 2f - f²`.
    #[must_use]
    pub fn eccentricity_sq(&self) -> f64 {
        self.eccentricity_sq
    }

    /// The second eccentricity squared, `e'² = e² / (1 - e²)`.
    #[must_use]
    pub fn second_eccentricity_sq(&self) -> f64 {
        self.second_eccentricity_sq
    }

    /// Radius of curvature in the prime vertical at geodetic latitude `lat` (radians).
    ///
    /// <https://en.wikipedia.org/wiki/Earth_radius#Prime_vertical>
    #[must_use]
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.semi_major_axis / (1. - self.eccentricity_sq * lat.sin().powi(2)).sqrt()
    }

    /// Radius of curvature in the meridian at geodetic latitude `lat` (radians).
    #[must_use]
    pub fn meridional_radius(&self, lat: f64) -> f64 {
        self.semi_major_axis * (1. - self.eccentricity_sq)
            / (1. - self.eccentricity_sq * lat.sin().powi(2)).powf(1.5)
    }

    /// Distance along the meridian from the equator to geodetic latitude `lat` (radians).
    #[must_use]
    pub fn meridional_arc(&self, lat: f64) -> f64 {
        let [m0, m2, m4, m6] = self.arc;
        self.semi_major_axis
            * (m0 * lat - m2 * (2. * lat).sin() + m4 * (4. * lat).sin() - m6 * (6. * lat).sin())
    }

    /// The leading coefficient of [`Ellipsoid::meridional_arc`], ie the arc length per radian
    /// near the equator divided by `a`.
    pub(crate) fn rectifying_factor(&self) -> f64 {
        self.arc[0]
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Serialized form of [`Ellipsoid`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct Parameters {
    semi_major_axis: f64,
    flattening: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<Parameters> for Ellipsoid {
    type Error = Error;

    fn try_from(p: Parameters) -> Result<Self> {
        Self::new(p.semi_major_axis, p.flattening)
    }
}

#[cfg(feature = "serde")]
impl From<Ellipsoid> for Parameters {
    fn from(e: Ellipsoid) -> Self {
        Self {
            semi_major_axis: e.semi_major_axis,
            flattening: e.flattening,
        }
    }
}
