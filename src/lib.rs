//! Vector and quaternion algebra, planar geometry, and ellipsoidal Earth coordinate conversions.
//!
//! The crate has two halves. The first is a small set of value types for 3-D math:
//! [`Vector3`] and [`Quaternion`], and the [`geometry`] routines built on them (segment
//! distances, convex hulls, minimum bounding rectangles). The second converts positions
//! between the ways the Earth is usually carved up:
//!
//! - [geodetic](geodetic::Point) latitude, longitude, and height above the ellipsoid, which is
//!   the interchange representation every other conversion goes through;
//! - [`Geocentric`] (ECEF) Cartesian coordinates;
//! - [`LocalCartesian`] offsets in a tangent plane anchored at some origin;
//! - [`UniversalTransverseMercator`] zone, easting, and northing;
//! - [`Mgrs`] grid reference strings.
//!
//! Every converter is parameterized by an [`Ellipsoid`], which defaults to WGS84. Converters
//! hold nothing but precomputed constants, so they can be shared freely between threads.
//!
//! # Examples
//!
//! ```
//! use geomath::{geodetic, Geocentric, Mgrs, UniversalTransverseMercator};
//! use uom::si::f64::{Angle, Length};
//! use uom::si::{angle::degree, length::meter};
//!
//! let position = geodetic::Point::new(
//!     Angle::new::<degree>(42.),
//!     Angle::new::<degree>(-83.),
//!     Length::new::<meter>(0.),
//! );
//!
//! let ecef = Geocentric::default().from_geodetic(&position);
//! let utm = UniversalTransverseMercator::default().from_geodetic(&position);
//! assert_eq!(utm.zone(), 17);
//!
//! let mgrs = Mgrs::default().from_geodetic(&position, 5)?;
//! assert_eq!(mgrs, "17TLG3436151711");
//!
//! let back = Mgrs::default().to_geodetic(&mgrs)?;
//! assert!((back.latitude().get::<degree>() - 42.).abs() < 0.01);
//! # let _ = ecef;
//! # Ok::<(), geomath::Error>(())
//! ```

mod ellipsoid;
mod error;
mod geocentric;
mod local_cartesian;
mod quaternion;
mod util;
mod vector;

pub mod geodetic;
pub mod geometry;
pub mod mgrs;
pub mod utm;

pub(crate) type Vec3 = nalgebra::Vector3<f64>;
pub(crate) type NQuaternion = nalgebra::Quaternion<f64>;
pub(crate) type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

pub use ellipsoid::Ellipsoid;
pub use error::{Error, Result};
pub use geocentric::{Geocentric, Orientation};
pub use local_cartesian::LocalCartesian;
pub use mgrs::Mgrs;
pub use quaternion::Quaternion;
pub use utm::UniversalTransverseMercator;
pub use vector::Vector3;
