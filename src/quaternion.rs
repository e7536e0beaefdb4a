use crate::vector::Vector3;
use crate::{NQuaternion, UnitQuaternion};
use std::fmt::{self, Display, Formatter};
use std::ops::Mul;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rotation expressed as a [quaternion] with scalar part `w` and vector part `v`.
///
/// Quaternions built through [`Quaternion::create_rotation`] and
/// [`Quaternion::create_mapping_rotation`] are of unit length. Those built directly through
/// [`Quaternion::new`] are taken as given and are not re-normalized; see
/// [`Quaternion::normalized`].
///
/// Composition follows the usual Hamilton product convention: `(a * b).rotate(v)` is
/// `a.rotate(b.rotate(v))`.
///
/// [quaternion]: https://en.wikipedia.org/wiki/Quaternions_and_spatial_rotation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quaternion {
    w: f64,
    v: Vector3,
}

impl Quaternion {
    /// The rotation that leaves every vector where it is.
    pub const IDENTITY: Self = Self {
        w: 1.,
        v: Vector3::ZERO,
    };

    #[must_use]
    pub const fn new(w: f64, v: Vector3) -> Self {
        Self { w, v }
    }

    /// The scalar (real) part.
    #[must_use]
    pub fn w(&self) -> f64 {
        self.w
    }

    /// The vector (imaginary) part.
    #[must_use]
    pub fn v(&self) -> Vector3 {
        self.v
    }

    fn to_nalgebra(self) -> NQuaternion {
        NQuaternion::from_parts(self.w, self.v.inner)
    }

    fn from_nalgebra(q: NQuaternion) -> Self {
        Self {
            w: q.w,
            v: Vector3::from_nalgebra_vector(q.imag()),
        }
    }

    /// Builds the unit quaternion for a right-handed rotation of `angle` radians about `axis`.
    ///
    /// `axis` is normalized internally. A zero axis describes no rotation, and yields
    /// [`Quaternion::IDENTITY`].
    #[must_use]
    pub fn create_rotation(angle: f64, axis: &Vector3) -> Self {
        let axis = axis.normalized();
        if axis == Vector3::ZERO {
            return Self::IDENTITY;
        }
        let half = angle / 2.;
        Self {
            w: half.cos(),
            v: axis * half.sin(),
        }
    }

    /// Builds the smallest rotation that turns the direction of `from` into the direction of
    /// `to`.
    ///
    /// Neither vector needs to be normalized. Parallel inputs produce
    /// [`Quaternion::IDENTITY`]. Anti-parallel inputs have infinitely many minimal rotations; we
    /// pick the half turn about `from × X`, falling back to `from × Y` when `from` lies along X.
    /// A zero input also produces [`Quaternion::IDENTITY`].
    #[must_use]
    pub fn create_mapping_rotation(from: &Vector3, to: &Vector3) -> Self {
        let from = from.normalized();
        let to = to.normalized();
        if from == Vector3::ZERO || to == Vector3::ZERO {
            return Self::IDENTITY;
        }

        let cos = from.dot(&to);
        let axis = from.cross(&to);
        let sin = axis.length();

        // below this the cross product carries no usable direction
        if sin < 1e-12 {
            if cos > 0. {
                return Self::IDENTITY;
            }
            let mut perpendicular = from.cross(&Vector3::X_UNIT);
            if perpendicular.length() < 1e-6 {
                perpendicular = from.cross(&Vector3::Y_UNIT);
            }
            return Self::create_rotation(std::f64::consts::PI, &perpendicular);
        }

        // atan2 rather than acos(cos) to keep precision for small angles
        Self::create_rotation(sin.atan2(cos), &axis)
    }

    /// Rotates `v` by this quaternion using the sandwich product `q v q*`.
    ///
    /// Rotating [`Vector3::ZERO`], or rotating anything by [`Quaternion::IDENTITY`], returns the
    /// input untouched without evaluating the product.
    ///
    /// For a quaternion that is not of unit length the result is additionally scaled by the
    /// squared norm, as the sandwich product implies.
    #[must_use]
    pub fn rotate(&self, v: Vector3) -> Vector3 {
        if v == Vector3::ZERO || *self == Self::IDENTITY {
            return v;
        }
        let q = self.to_nalgebra();
        let rotated = q * NQuaternion::from_imag(v.inner) * q.conjugate();
        Vector3::from_nalgebra_vector(rotated.imag())
    }

    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self { w: self.w, v: -self.v }
    }

    #[must_use]
    pub fn norm(&self) -> f64 {
        self.to_nalgebra().norm()
    }

    /// Returns this quaternion scaled to unit length, or [`Quaternion::IDENTITY`] if it is zero.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if !(norm >= f64::EPSILON) {
            return Self::IDENTITY;
        }
        Self::from_nalgebra(self.to_nalgebra() / norm)
    }

    /// Returns the rotation that undoes this one.
    ///
    /// For unit quaternions this is the [conjugate](Quaternion::conjugate). The zero quaternion
    /// has no inverse and maps to [`Quaternion::IDENTITY`].
    #[must_use]
    pub fn inverse(&self) -> Self {
        self.to_nalgebra()
            .try_inverse()
            .map_or(Self::IDENTITY, Self::from_nalgebra)
    }

    /// The rotation angle in radians, in `[0, 2π]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        2. * self.v.length().atan2(self.w)
    }

    /// The (normalized) rotation axis, or [`Vector3::ZERO`] for a rotation by zero.
    #[must_use]
    pub fn axis(&self) -> Vector3 {
        self.v.normalized()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Display for Quaternion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.w, self.v)
    }
}

impl From<UnitQuaternion> for Quaternion {
    fn from(q: UnitQuaternion) -> Self {
        Self::from_nalgebra(q.into_inner())
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_nalgebra(self.to_nalgebra() * rhs.to_nalgebra())
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Quaternion {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        Vector3::DEFAULT_EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.w.abs_diff_eq(&other.w, epsilon) && self.v.abs_diff_eq(&other.v, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Quaternion {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.w.relative_eq(&other.w, epsilon, max_relative)
            && self.v.relative_eq(&other.v, epsilon, max_relative)
    }
}
