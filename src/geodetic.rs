//! Positions expressed as latitude, longitude, and height above a reference ellipsoid.
//!
//! [`Point`] is the interchange type of the crate: every other representation
//! ([ECEF](crate::Geocentric), [local tangent plane](crate::LocalCartesian),
//! [UTM](crate::UniversalTransverseMercator), [MGRS](crate::Mgrs)) converts to and from it.

use crate::ellipsoid::Ellipsoid;
use crate::error::{Error, Result};
use crate::util::BoundedAngle;
use std::fmt;
use std::fmt::Display;
use uom::si::f64::{Angle, Length};
use uom::si::{
    angle::{degree, radian},
    length::meter,
};

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An Earth-bound location given by geodetic latitude, longitude, and height above the
/// ellipsoid.
///
/// Which ellipsoid is implied is up to the converter that produced or consumes the point; the
/// point itself carries only the three components.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    // NOTE: uom does not guarantee how these angles are normalized, and neither do we. a
    // longitude of 270° is stored as 270°, and every conversion accepts it as -90°.
    latitude: Angle,
    longitude: Angle,
    altitude: Length,
}

impl Point {
    /// Constructs a location from latitude, longitude, and altitude.
    ///
    /// No range checks are applied. Use [`Point::build`] when the latitude comes from
    /// untrusted input.
    #[must_use]
    pub fn new(
        latitude: impl Into<Angle>,
        longitude: impl Into<Angle>,
        altitude: impl Into<Length>,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            altitude: altitude.into(),
        }
    }

    /// Constructs a location from its named components.
    ///
    /// The latitude must be in [-90°,90°] % 360°. If it is not, this returns
    /// [`Error::LatitudeOutOfRange`].
    pub fn build(
        Components {
            latitude,
            longitude,
            altitude,
        }: Components,
    ) -> Result<Self> {
        let signed = BoundedAngle::new(latitude).to_signed_range();
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2).contains(&signed) {
            return Err(Error::LatitudeOutOfRange(latitude.get::<degree>()));
        }
        Ok(Self::new(latitude, longitude, altitude))
    }

    /// Geodetic latitude, positive north of the equator, exactly as given at construction.
    #[must_use]
    pub fn latitude(&self) -> Angle {
        self.latitude
    }

    /// Longitude east of the prime meridian, exactly as given at construction.
    #[must_use]
    pub fn longitude(&self) -> Angle {
        self.longitude
    }

    /// Height above the reference ellipsoid.
    ///
    /// Note that the ellipsoid does not perfectly align with ground level. Thus, while this is
    /// similar to altitude above sea/ground level, it is not equal to either of those measures.
    #[must_use]
    pub fn altitude(&self) -> Length {
        self.altitude
    }

    /// Computes the [great-circle distance] between the two locations on the surface of the
    /// earth, treating it as a sphere with the WGS84 equatorial radius.
    ///
    /// Note that this is an approximation as the earth is not a perfect sphere, and that
    /// altitude is ignored.
    ///
    /// [great-circle distance]: https://en.wikipedia.org/wiki/Great-circle_distance
    #[doc(alias = "great_circle_distance")]
    #[doc(alias = "haversine_distance")]
    #[must_use]
    pub fn haversine_distance_on_surface(&self, other: &Point) -> Length {
        let angle = central_angle_by_inverse_haversine(
            self.latitude,
            other.latitude,
            self.longitude,
            other.longitude,
        );
        Length::new::<meter>(angle.get::<radian>() * Ellipsoid::WGS84.semi_major_axis())
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = BoundedAngle::new(self.latitude).signed().get::<degree>();
        let lon = BoundedAngle::new(self.longitude).signed().get::<degree>();
        let alt = self.altitude.get::<meter>();
        let ns = if lat < 0. { 'S' } else { 'N' };
        let ew = if lon < 0. { 'W' } else { 'E' };
        write!(
            f,
            "{:.6}°{ns}, {:.6}°{ew}, {alt:.2}m",
            lat.abs(),
            lon.abs()
        )
    }
}

/// The angle subtended at the centre of a sphere by two latitude/longitude pairs, from the
/// [haversine formula].
///
/// [haversine formula]: https://en.wikipedia.org/wiki/Haversine_formula
pub(crate) fn central_angle_by_inverse_haversine(
    lat_a: Angle,
    lat_b: Angle,
    lon_a: Angle,
    lon_b: Angle,
) -> Angle {
    let haversine = |theta: f64| (theta / 2.).sin().powi(2);
    let (phi_a, phi_b) = (lat_a.get::<radian>(), lat_b.get::<radian>());
    let delta_lambda = (lon_b - lon_a).get::<radian>();

    let h = haversine(phi_b - phi_a) + phi_a.cos() * phi_b.cos() * haversine(delta_lambda);
    // rounding can push h just outside of [0, 1]
    Angle::new::<radian>(2. * h.clamp(0., 1.).sqrt().asin())
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Point {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        // a little under a meter, which is about what the iterative ECEF inverse guarantees
        Length::new::<meter>(0.75)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let surface = self.haversine_distance_on_surface(other);
        let vertical = (self.altitude - other.altitude).abs();
        surface < epsilon && vertical <= epsilon
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Point {
    fn default_max_relative() -> Self::Epsilon {
        Length::new::<meter>(f64::default_max_relative())
    }

    /// Positions on the surface are compared absolutely, and only altitudes relatively.
    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        let epsilon_m = epsilon.get::<meter>();
        self.haversine_distance_on_surface(other).get::<meter>() <= epsilon_m
            && self.altitude.get::<meter>().relative_eq(
                &other.altitude.get::<meter>(),
                epsilon_m,
                max_relative.get::<meter>(),
            )
    }
}

/// Argument type for [`Point::build`].
#[derive(Debug, Default, Clone, Copy)]
#[must_use]
pub struct Components {
    /// The latitude angle of the proposed [`Point`].
    ///
    /// The latitude must be in [-90°,90°] % 360°.
    pub latitude: Angle,

    /// The longitude angle of the proposed [`Point`].
    pub longitude: Angle,

    /// The height of the proposed [`Point`] above the reference ellipsoid.
    pub altitude: Length,
}

#[cfg(test)]
mod tests {
    use super::{Components, Point};
    use crate::error::Error;
    use approx::assert_relative_eq;
    use quickcheck::Arbitrary;
    use rstest::rstest;
    use uom::si::f64::{Angle, Length};
    use uom::si::{
        angle::degree,
        length::{kilometer, meter},
    };

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }
    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    impl Arbitrary for Point {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            // draw until we get something usable, then fold it into range
            let mut draw = |period: f64| loop {
                let f = f64::arbitrary(g);
                if f.is_finite() {
                    break f.rem_euclid(period);
                }
            };
            let latitude = draw(180.) - 90.;
            let longitude = draw(360.);
            let altitude = draw(50_000.) - 10_000.;
            Self::new(d(latitude), d(longitude), m(altitude))
        }

        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            // shrink towards sea level, then towards the prime meridian
            let Self {
                latitude,
                longitude,
                altitude,
            } = *self;
            let meters = altitude.get::<meter>();
            if meters != 0. {
                return Box::new(
                    meters
                        .shrink()
                        .map(move |alt| Self::new(latitude, longitude, m(alt))),
                );
            }
            Box::new(
                longitude
                    .get::<degree>()
                    .shrink()
                    .map(move |lon| Self::new(latitude, d(lon), altitude)),
            )
        }
    }

    #[rstest]
    #[case(d(90.5), d(7.8), m(1000.))]
    #[case(d(200.), d(-19.9), m(0.))]
    #[case(d(-91.), d(0.), m(0.))]
    fn build_fails_with_bad_lat(
        #[case] latitude: Angle,
        #[case] longitude: Angle,
        #[case] altitude: Length,
    ) {
        assert!(matches!(
            Point::build(Components {
                latitude,
                longitude,
                altitude
            }),
            Err(Error::LatitudeOutOfRange(_))
        ));
    }

    #[rstest]
    #[case(d(90.), d(0.), m(0.))]
    #[case(d(-90.), d(540.), m(-12.))]
    #[case(d(360. + 45.), d(0.), m(0.))]
    fn build_accepts_wrapped_lat(
        #[case] latitude: Angle,
        #[case] longitude: Angle,
        #[case] altitude: Length,
    ) {
        let point = Point::build(Components {
            latitude,
            longitude,
            altitude,
        })
        .unwrap();
        assert_eq!(point, Point::new(latitude, longitude, altitude));
    }

    #[test]
    fn point_keeps_components_as_given() {
        let point = Point::new(d(10.), d(270.), m(5.));
        assert_relative_eq!(point.longitude().get::<degree>(), 270., epsilon = 1e-9);
        assert_relative_eq!(point.latitude().get::<degree>(), 10., epsilon = 1e-9);
        assert_eq!(point.altitude(), m(5.));
    }

    #[test]
    fn point_display() {
        insta::assert_snapshot!(Point::new(d(0.), d(0.), m(0.)), @"0.000000°N, 0.000000°E, 0.00m");
        // Mt. Fuji
        insta::assert_snapshot!(
            Point::new(d(35.3619), d(138.7280), m(2294.)),
            @"35.361900°N, 138.728000°E, 2294.00m"
        );
        insta::assert_snapshot!(
            Point::new(d(-35.3619), d(-138.7280), m(2294.)),
            @"35.361900°S, 138.728000°W, 2294.00m"
        );
        insta::assert_snapshot!(
            Point::new(d(42.), d(360. - 83.2), m(-1.5)),
            @"42.000000°N, 83.200000°W, -1.50m"
        );
    }

    #[test]
    fn haversine_distance() {
        let a = Point::new(d(0.), d(0.), m(0.));
        let b = Point::new(d(0.), d(90.), m(0.));
        assert_relative_eq!(
            a.haversine_distance_on_surface(&b).get::<kilometer>(),
            6378.137 * std::f64::consts::FRAC_PI_2,
            epsilon = 1e-6
        );
        assert_eq!(a.haversine_distance_on_surface(&a), m(0.));

        // altitude does not count
        let c = Point::new(d(0.), d(90.), m(1000.));
        assert_relative_eq!(
            a.haversine_distance_on_surface(&b).get::<meter>(),
            a.haversine_distance_on_surface(&c).get::<meter>()
        );

        // one full turn of longitude is the same place
        let e = Point::new(d(0.), d(450.), m(0.));
        assert!(b.haversine_distance_on_surface(&e).get::<meter>() < 1e-6);
    }

    #[test]
    fn approx_compares_positions_on_the_surface() {
        let a = Point::new(d(42.), d(-83.), m(10.));
        let b = Point::new(d(42.), d(-83. + 360.), m(10.2));
        assert_relative_eq!(a, b);
        let c = Point::new(d(42.0001), d(-83.), m(10.));
        approx::assert_relative_ne!(a, c);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let point = Point::new(d(42.), d(-83.), m(10.));
        let yaml = serde_yaml::to_string(&point).unwrap();
        let back: Point = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(point, back);
    }
}
