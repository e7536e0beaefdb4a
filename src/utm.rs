//! The [Universal Transverse Mercator] projection.
//!
//! UTM splits the globe into 60 zones of 6° longitude each, and projects each of them with a
//! transverse Mercator projection centered on the zone's central meridian. Positions are given
//! as meters east of a line 500 km west of the central meridian ("easting") and meters north of
//! the equator ("northing"), where the southern hemisphere adds 10,000 km so that northings stay
//! positive.
//!
//! The zone is always derived from the longitude alone: the irregular zones around Norway and
//! Svalbard are not applied.
//!
//! [Universal Transverse Mercator]: https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system

use crate::ellipsoid::Ellipsoid;
use crate::error::{Error, Result};
use crate::geodetic;
use crate::util::BoundedAngle;
use std::fmt;
use std::fmt::Display;
use uom::si::f64::{Angle, Length};
use uom::si::{
    angle::{degree, radian},
    length::meter,
};
use uom::ConstZero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of the equator a UTM northing is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// The hemisphere a latitude falls in. The equator counts as north.
    #[must_use]
    pub fn from_latitude(latitude: impl Into<Angle>) -> Self {
        if BoundedAngle::new(latitude).to_signed_range() < 0. {
            Self::South
        } else {
            Self::North
        }
    }

    fn false_northing(self) -> f64 {
        match self {
            Self::North => 0.,
            Self::South => UniversalTransverseMercator::FALSE_NORTHING_SOUTH,
        }
    }
}

impl TryFrom<char> for Hemisphere {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        match c {
            'N' | 'n' => Ok(Self::North),
            'S' | 's' => Ok(Self::South),
            _ => Err(Error::InvalidHemisphere(c)),
        }
    }
}

impl Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::North => f.write_str("N"),
            Self::South => f.write_str("S"),
        }
    }
}

/// A position in UTM coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    zone: u8,
    hemisphere: Hemisphere,
    easting: Length,
    northing: Length,
}

impl Point {
    /// Constructs a UTM position.
    ///
    /// Returns [`Error::InvalidZone`] if `zone` is not in `1..=60`. Easting and northing are not
    /// range-checked, since positions just outside of a zone are routinely projected into it.
    pub fn new(
        zone: u8,
        hemisphere: Hemisphere,
        easting: impl Into<Length>,
        northing: impl Into<Length>,
    ) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }
        Ok(Self {
            zone,
            hemisphere,
            easting: easting.into(),
            northing: northing.into(),
        })
    }

    #[must_use]
    pub fn zone(&self) -> u8 {
        self.zone
    }

    #[must_use]
    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Distance east of the false origin 500 km west of the zone's central meridian.
    #[must_use]
    pub fn easting(&self) -> Length {
        self.easting
    }

    /// Distance north of the equator, plus 10,000 km in the southern hemisphere.
    #[must_use]
    pub fn northing(&self) -> Length {
        self.northing
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {:.0}mE {:.0}mN",
            self.zone,
            self.hemisphere,
            self.easting.get::<meter>(),
            self.northing.get::<meter>()
        )
    }
}

/// Projects geodetic positions to and from UTM on a given ellipsoid.
///
/// The series used are the ones from Snyder, "Map Projections: A Working Manual" (USGS
/// Professional Paper 1395), pages 61-64. They are accurate to well below a millimeter inside
/// a zone and degrade gracefully a few degrees beyond its edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniversalTransverseMercator {
    ellipsoid: Ellipsoid,
}

impl UniversalTransverseMercator {
    /// Scale factor along the central meridian.
    #[doc(alias = "k0")]
    pub const SCALE_FACTOR: f64 = 0.9996;

    /// Easting of the central meridian, in meters.
    pub const FALSE_EASTING: f64 = 500_000.;

    /// Added to southern hemisphere northings, in meters.
    pub const FALSE_NORTHING_SOUTH: f64 = 10_000_000.;

    /// Maximum number of Newton steps used to find the footpoint latitude in
    /// [`UniversalTransverseMercator::to_geodetic`].
    pub const MAX_ITERATIONS: usize = 10;

    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// The zone (1 to 60) containing `longitude`, which may be given in any turn.
    #[must_use]
    pub fn zone_for(longitude: impl Into<Angle>) -> u8 {
        let longitude = BoundedAngle::new(longitude).signed().get::<degree>();
        // the float to int conversion saturates, and the value is in [0, 60] anyway
        let index = ((longitude + 180.) / 6.).floor() as u8;
        index % 60 + 1
    }

    /// The longitude at the center of `zone`.
    pub fn central_meridian(zone: u8) -> Result<Angle> {
        if !(1..=60).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }
        Ok(Angle::new::<degree>(f64::from(zone) * 6. - 183.))
    }

    /// Projects `point` into the zone that contains it.
    ///
    /// The altitude of `point` is ignored.
    #[must_use]
    pub fn from_geodetic(&self, point: &geodetic::Point) -> Point {
        let zone = Self::zone_for(point.longitude());
        let central_meridian = Angle::new::<degree>(f64::from(zone) * 6. - 183.);
        self.project(point, zone, central_meridian)
    }

    /// Projects `point` into `zone` even if the point lies outside of it.
    ///
    /// This is useful to express nearby positions that straddle a zone boundary in a common
    /// grid. Accuracy degrades with distance from the zone's central meridian.
    pub fn from_geodetic_in_zone(&self, point: &geodetic::Point, zone: u8) -> Result<Point> {
        let central_meridian = Self::central_meridian(zone)?;
        Ok(self.project(point, zone, central_meridian))
    }

    fn project(&self, point: &geodetic::Point, zone: u8, central_meridian: Angle) -> Point {
        let k0 = Self::SCALE_FACTOR;
        let ep2 = self.ellipsoid.second_eccentricity_sq();

        let phi = BoundedAngle::new(point.latitude()).to_signed_range();
        let delta_lambda =
            BoundedAngle::new(point.longitude() - central_meridian).to_signed_range();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = sin_phi / cos_phi;

        let n = self.ellipsoid.prime_vertical_radius(phi);
        let t = tan_phi.powi(2);
        let c = ep2 * cos_phi.powi(2);
        let a = cos_phi * delta_lambda;
        let m = self.ellipsoid.meridional_arc(phi);

        let x = k0
            * n
            * (a + (1. - t + c) * a.powi(3) / 6.
                + (5. - 18. * t + t.powi(2) + 72. * c - 58. * ep2) * a.powi(5) / 120.);
        let y = k0
            * (m + n
                * tan_phi
                * (a.powi(2) / 2.
                    + (5. - t + 9. * c + 4. * c.powi(2)) * a.powi(4) / 24.
                    + (61. - 58. * t + t.powi(2) + 600. * c - 330. * ep2) * a.powi(6) / 720.));

        let hemisphere = Hemisphere::from_latitude(point.latitude());
        Point {
            zone,
            hemisphere,
            easting: Length::new::<meter>(x + Self::FALSE_EASTING),
            northing: Length::new::<meter>(y + hemisphere.false_northing()),
        }
    }

    /// Converts a UTM position back to latitude and longitude.
    ///
    /// The returned longitude is relative to the zone's central meridian and may therefore fall
    /// outside of [-180°, 180°) for positions projected past the antimeridian. The altitude is
    /// always zero.
    ///
    /// Returns [`Error::NonConvergence`] if the footpoint latitude cannot be found, which only
    /// happens for non-finite northings.
    pub fn to_geodetic(&self, point: &Point) -> Result<geodetic::Point> {
        let k0 = Self::SCALE_FACTOR;
        let ep2 = self.ellipsoid.second_eccentricity_sq();
        let central_meridian = Self::central_meridian(point.zone)?;

        let x = point.easting.get::<meter>() - Self::FALSE_EASTING;
        let y = point.northing.get::<meter>() - point.hemisphere.false_northing();
        let phi1 = self.footpoint_latitude(y / k0)?;

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = sin_phi1 / cos_phi1;
        let n1 = self.ellipsoid.prime_vertical_radius(phi1);
        let r1 = self.ellipsoid.meridional_radius(phi1);
        let t1 = tan_phi1.powi(2);
        let c1 = ep2 * cos_phi1.powi(2);
        let d = x / (n1 * k0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d.powi(2) / 2.
                    - (5. + 3. * t1 + 10. * c1 - 4. * c1.powi(2) - 9. * ep2) * d.powi(4) / 24.
                    + (61. + 90. * t1 + 298. * c1 + 45. * t1.powi(2) - 252. * ep2
                        - 3. * c1.powi(2))
                        * d.powi(6)
                        / 720.);
        let delta_lon = (d - (1. + 2. * t1 + c1) * d.powi(3) / 6.
            + (5. - 2. * c1 + 28. * t1 - 3. * c1.powi(2) + 8. * ep2 + 24. * t1.powi(2))
                * d.powi(5)
                / 120.)
            / cos_phi1;

        Ok(geodetic::Point::new(
            Angle::new::<radian>(lat),
            central_meridian + Angle::new::<radian>(delta_lon),
            Length::ZERO,
        ))
    }

    /// The latitude whose meridional arc is `arc` meters, found with Newton's method.
    fn footpoint_latitude(&self, arc: f64) -> Result<f64> {
        let ellipsoid = &self.ellipsoid;
        let mut phi = arc / (ellipsoid.semi_major_axis() * ellipsoid.rectifying_factor());
        for iteration in 1..=Self::MAX_ITERATIONS {
            let step = (ellipsoid.meridional_arc(phi) - arc) / ellipsoid.meridional_radius(phi);
            if !step.is_finite() {
                break;
            }
            phi -= step;
            if step.abs() < 1e-14 {
                log::trace!("footpoint latitude settled after {iteration} iterations");
                return Ok(phi);
            }
        }
        log::debug!(
            "footpoint latitude for meridional arc {arc} m did not settle in {} iterations",
            Self::MAX_ITERATIONS
        );
        Err(Error::NonConvergence {
            operation: "UTM footpoint latitude",
            iterations: Self::MAX_ITERATIONS,
        })
    }
}
