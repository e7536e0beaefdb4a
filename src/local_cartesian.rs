use crate::ellipsoid::Ellipsoid;
use crate::error::Result;
use crate::geocentric::{enu_to_ecef_rotation, Geocentric};
use crate::geodetic::Point;
use crate::quaternion::Quaternion;
use crate::vector::Vector3;
use uom::si::angle::radian;
use uom::si::f64::Angle;
use uom::ConstZero;

/// A Cartesian frame tangent to the ellipsoid at some origin.
///
/// At zero heading the axes are East (x), North (y), and Up (z). A non-zero heading rotates the
/// frame about Up so that +y points along the heading, measured clockwise from north, and +x
/// points 90° clockwise of that.
///
/// The origin's ECEF position and the frame's orientation are computed once at construction, so
/// every conversion is a single rotation and translation.
///
/// See <https://en.wikipedia.org/wiki/Local_tangent_plane_coordinates>.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCartesian {
    geocentric: Geocentric,
    origin: Point,
    heading: Angle,
    origin_ecef: Vector3,
    // takes local vectors to ECEF
    orientation: Quaternion,
}

impl LocalCartesian {
    /// Constructs a frame at `origin` whose +y axis points along `heading`.
    #[must_use]
    pub fn new(ellipsoid: Ellipsoid, origin: Point, heading: impl Into<Angle>) -> Self {
        let heading = heading.into();
        let geocentric = Geocentric::new(ellipsoid);
        let enu_to_ecef = Quaternion::from(enu_to_ecef_rotation(
            origin.latitude(),
            origin.longitude(),
        ));
        // clockwise from north is a negative rotation about up
        let heading_to_enu =
            Quaternion::create_rotation(-heading.get::<radian>(), &Vector3::Z_UNIT);

        Self {
            geocentric,
            origin,
            heading,
            origin_ecef: geocentric.from_geodetic(&origin),
            orientation: (enu_to_ecef * heading_to_enu).normalized(),
        }
    }

    /// Constructs an East-North-Up frame at `origin`.
    #[must_use]
    pub fn at(ellipsoid: Ellipsoid, origin: Point) -> Self {
        Self::new(ellipsoid, origin, Angle::ZERO)
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[must_use]
    pub fn heading(&self) -> Angle {
        self.heading
    }

    /// Expresses an ECEF position as an offset from the origin along the local axes.
    #[must_use]
    pub fn from_geocentric(&self, ecef: &Vector3) -> Vector3 {
        self.orientation.conjugate().rotate(*ecef - self.origin_ecef)
    }

    /// Expresses a geodetic position as an offset from the origin along the local axes.
    #[must_use]
    pub fn from_geodetic(&self, point: &Point) -> Vector3 {
        self.from_geocentric(&self.geocentric.from_geodetic(point))
    }

    /// Converts an offset along the local axes into an ECEF position.
    #[must_use]
    pub fn to_geocentric(&self, local: &Vector3) -> Vector3 {
        self.orientation.rotate(*local) + self.origin_ecef
    }

    /// Converts an offset along the local axes into a geodetic position.
    ///
    /// Offsets far from the origin are fine, but note that the tangent plane leaves the surface
    /// quickly: 100 km along x is roughly 780 m above the ellipsoid.
    pub fn to_geodetic(&self, local: &Vector3) -> Result<Point> {
        self.geocentric.to_geodetic(&self.to_geocentric(local))
    }
}
