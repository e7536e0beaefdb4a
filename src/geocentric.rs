use crate::ellipsoid::Ellipsoid;
use crate::error::{Error, Result};
use crate::geodetic::Point;
use crate::util::BoundedAngle;
use crate::vector::Vector3;
use crate::UnitQuaternion;
use nalgebra::{Matrix3, Rotation3};
use std::f64::consts::PI;
use uom::si::angle::radian;
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Converts between geodetic coordinates and Earth-Centered, Earth-Fixed (ECEF) Cartesian
/// coordinates.
///
/// ECEF has its origin at the center of the ellipsoid, the X axis through the intersection of
/// the equator and the prime meridian, the Z axis through the north pole, and the Y axis
/// completing a right-handed system. All components are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geocentric {
    ellipsoid: Ellipsoid,
}

/// An attitude expressed in the local North-East-Down frame at some position, as Tait-Bryan
/// angles applied in heading, pitch, roll order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orientation {
    /// Rotation about the body's lateral axis, nose up is positive.
    pub pitch: Angle,
    /// Rotation about the body's longitudinal axis, right wing down is positive.
    pub roll: Angle,
    /// Rotation about the down axis, clockwise from north.
    #[doc(alias = "yaw")]
    pub heading: Angle,
}

impl Geocentric {
    /// Maximum number of Newton steps [`Geocentric::to_geodetic`] takes before giving up.
    pub const MAX_ITERATIONS: usize = 10;

    #[must_use]
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Converts latitude, longitude, and altitude to ECEF.
    ///
    /// See:
    /// <https://en.wikipedia.org/wiki/Geographic_coordinate_conversion#From_geodetic_to_ECEF_coordinates>
    #[must_use]
    pub fn from_geodetic(&self, point: &Point) -> Vector3 {
        let h = point.altitude().get::<meter>();
        let (sin_lat, cos_lat) = point.latitude().get::<radian>().sin_cos();
        let (sin_lon, cos_lon) = point.longitude().get::<radian>().sin_cos();

        let e2 = self.ellipsoid.eccentricity_sq();
        let n = self.ellipsoid.prime_vertical_radius(point.latitude().get::<radian>());

        // distance from the polar axis
        let equatorial = (n + h) * cos_lat;
        Vector3::new(
            equatorial * cos_lon,
            equatorial * sin_lon,
            ((1. - e2) * n + h) * sin_lat,
        )
    }

    /// Converts an ECEF position into latitude, longitude, and altitude.
    ///
    /// There is no closed form for this direction that behaves well everywhere, so this uses
    /// the iterative method from
    ///
    ///   An iterative algorithm to compute geodetic coordinates
    ///   Chanfang Shu, Fei Li
    ///   <https://www.sciencedirect.com/science/article/pii/S0098300410001238>
    ///
    /// which finds the parameter `k` of the surface normal through the point with Newton's
    /// method. It settles within three steps for everything from the crust out to geostationary
    /// orbit, and takes at most [`Geocentric::MAX_ITERATIONS`]. Within a few tens of kilometers
    /// of the center a point lies on several surface normals; whichever one Newton's method
    /// finds is returned, and some such points report [`Error::NonConvergence`] instead.
    ///
    /// The returned longitude is in [-180°, 180°] and the latitude in [-90°, 90°].
    ///
    /// Returns [`Error::NonConvergence`] for the center of the ellipsoid, where latitude is
    /// undefined, and for non-finite input.
    pub fn to_geodetic(&self, ecef: &Vector3) -> Result<Point> {
        let (x, y, z) = (ecef.x(), ecef.y(), ecef.z());
        let non_convergence = |iterations| Error::NonConvergence {
            operation: "geocentric to geodetic",
            iterations,
        };
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            log::debug!("refusing to convert non-finite ECEF position {ecef}");
            return Err(non_convergence(0));
        }

        let a = self.ellipsoid.semi_major_axis();
        let b = self.ellipsoid.semi_minor_axis();
        let a2 = a.powi(2);
        let b2 = b.powi(2);
        let z2 = z.powi(2);
        let r2 = x.powi(2) + y.powi(2);
        let r = r2.sqrt();
        let bigr2 = r2 + z2;

        // the starting point is exact for a sphere and within a few millimeters on the ellipsoid
        let denominator = a2 * z2 + b2 * r2;
        let mut k = ((denominator.sqrt() - a * b) * bigr2) / denominator;

        let mut converged = None;
        for iteration in 1..=Self::MAX_ITERATIONS {
            let p = a + b * k;
            let q = b + a * k;
            // f(k) vanishes when (x, y, z) lies on the normal at parameter k
            let f_k = r2 * q.powi(2) + z2 * p.powi(2) - p.powi(2) * q.powi(2);
            let df_k = 2. * (a * r2 * q + b * z2 * p - p * q * (b * q + a * p));
            let dk = -f_k / df_k;
            if !dk.is_finite() {
                break;
            }
            k += dk;
            if dk.abs() <= 4. * f64::EPSILON * k.abs().max(1.) {
                converged = Some(iteration);
                break;
            }
        }

        let Some(iterations) = converged else {
            log::debug!(
                "geodetic latitude of {ecef} did not settle within {} iterations",
                Self::MAX_ITERATIONS
            );
            return Err(non_convergence(Self::MAX_ITERATIONS));
        };
        log::trace!("geodetic latitude of {ecef} settled after {iterations} iterations");

        // foot of the normal through (r, z) on the meridian ellipse
        let p = a + b * k;
        let q = b + a * k;
        let mut foot_r = if r == 0. { 0. } else { r * a / p };
        let foot_z = if z == 0. { 0. } else { z * b / q };
        let mut r = r;
        let mut lon = y.atan2(x);
        // deep inside the ellipsoid the normal may meet the surface on the opposite meridian
        if foot_r < 0. {
            foot_r = -foot_r;
            r = -r;
            lon = if lon > 0. { lon - PI } else { lon + PI };
        }
        let lat = (a2 * foot_z).atan2(b2 * foot_r);
        // (r, z) - foot lies along the outward normal (cos lat, sin lat)
        let altitude = (r - foot_r) * lat.cos() + (z - foot_z) * lat.sin();

        Ok(Point::new(
            Angle::new::<radian>(lat),
            Angle::new::<radian>(lon),
            Length::new::<meter>(altitude),
        ))
    }

    /// Converts an attitude given in the local North-East-Down frame at `latitude`/`longitude`
    /// into Euler angles relative to the ECEF axes.
    ///
    /// The result is `(theta, phi, psi)` in radians, the rotations about the ECEF Y, X and Z
    /// axes respectively, such that `Rz(psi) * Ry(theta) * Rx(phi)` is the body attitude
    /// expressed in ECEF.
    #[must_use]
    pub fn from_geodetic_angle(
        latitude: impl Into<Angle>,
        longitude: impl Into<Angle>,
        orientation: Orientation,
    ) -> Vector3 {
        let ned_to_ecef = ned_to_ecef_rotation(latitude.into(), longitude.into());
        let body_to_ned = Rotation3::from_euler_angles(
            orientation.roll.get::<radian>(),
            orientation.pitch.get::<radian>(),
            orientation.heading.get::<radian>(),
        );
        let (phi, theta, psi) = (ned_to_ecef * body_to_ned).euler_angles();
        Vector3::new(theta, phi, psi)
    }

    /// The inverse of [`Geocentric::from_geodetic_angle`].
    ///
    /// The returned heading is in [0°, 360°), pitch in [-90°, 90°], and roll in [-180°, 180°].
    #[must_use]
    pub fn to_geodetic_angle(
        latitude: impl Into<Angle>,
        longitude: impl Into<Angle>,
        ecef_angles: Vector3,
    ) -> Orientation {
        let ned_to_ecef = ned_to_ecef_rotation(latitude.into(), longitude.into());
        let body_to_ecef =
            Rotation3::from_euler_angles(ecef_angles.y(), ecef_angles.x(), ecef_angles.z());
        let (roll, pitch, heading) = (ned_to_ecef.inverse() * body_to_ecef).euler_angles();
        Orientation {
            pitch: Angle::new::<radian>(pitch),
            roll: Angle::new::<radian>(roll),
            heading: Angle::new::<radian>(
                BoundedAngle::new(Angle::new::<radian>(heading)).get_bounded(),
            ),
        }
    }
}

/// The rotation that takes North-East-Down vectors at the given latitude and longitude to
/// ECEF.
///
/// See
/// <https://en.wikipedia.org/wiki/Local_tangent_plane_coordinates#Local_north,_east,_down_(NED)_coordinates>.
pub(crate) fn ned_to_ecef_rotation(latitude: Angle, longitude: Angle) -> Rotation3<f64> {
    let phi = latitude.get::<radian>();
    let lambda = longitude.get::<radian>();

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let sin_lambda = lambda.sin();
    let cos_lambda = lambda.cos();

    // columns are N, E, D
    let matrix = Matrix3::new(
        -cos_lambda * sin_phi,
        -sin_lambda,
        -cos_lambda * cos_phi,
        -sin_lambda * sin_phi,
        cos_lambda,
        -sin_lambda * cos_phi,
        cos_phi,
        0.,
        -sin_phi,
    );
    Rotation3::from_matrix(&matrix)
}

/// The rotation that takes East-North-Up vectors at the given latitude and longitude to ECEF.
///
/// See
/// <https://en.wikipedia.org/wiki/Local_tangent_plane_coordinates#Local_east,_north,_up_(ENU)_coordinates>.
pub(crate) fn enu_to_ecef_rotation(latitude: Angle, longitude: Angle) -> UnitQuaternion {
    let phi = latitude.get::<radian>();
    let lambda = longitude.get::<radian>();

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let sin_lambda = lambda.sin();
    let cos_lambda = lambda.cos();

    // columns are E, N, U
    let matrix = Matrix3::new(
        -sin_lambda,
        -cos_lambda * sin_phi,
        cos_lambda * cos_phi,
        cos_lambda,
        -sin_lambda * sin_phi,
        sin_lambda * cos_phi,
        0.,
        cos_phi,
        sin_phi,
    );
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix(&matrix))
}
