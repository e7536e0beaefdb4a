use crate::error::{Error, Result};
use crate::Vec3;
use std::fmt::{self, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable three-component vector of `f64`s.
///
/// Every operation returns a new value; nothing mutates in place. Equality through `==` is exact,
/// use [`Vector3::epsilon_equals`] (or the `approx` traits) to compare with a tolerance.
///
/// The type doubles as a point in whatever Cartesian frame the caller is working in (ECEF,
/// local tangent plane, or the plane of a [`Polygon`](crate::geometry::Polygon)).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// no need for the "inner": indirection
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Vector3 {
    pub(crate) inner: Vec3,
}

impl Vector3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0., 0., 0.);
    /// Unit vector along X.
    pub const X_UNIT: Self = Self::new(1., 0., 0.);
    /// Unit vector along Y.
    pub const Y_UNIT: Self = Self::new(0., 1., 0.);
    /// Unit vector along Z.
    pub const Z_UNIT: Self = Self::new(0., 0., 1.);

    /// Tolerance used by [`Vector3::epsilon_equals_default`].
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            inner: Vec3::new(x, y, z),
        }
    }

    pub(crate) fn from_nalgebra_vector(inner: Vec3) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.inner.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.inner.y
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.inner.z
    }

    /// Returns `self + rhs`.
    #[must_use]
    pub fn add(&self, rhs: &Self) -> Self {
        *self + *rhs
    }

    /// Returns `self - rhs`.
    #[must_use]
    pub fn subtract(&self, rhs: &Self) -> Self {
        *self - *rhs
    }

    /// Returns this vector scaled by `scalar`.
    #[must_use]
    pub fn multiply(&self, scalar: f64) -> Self {
        *self * scalar
    }

    #[must_use]
    pub fn dot(&self, rhs: &Self) -> f64 {
        self.inner.dot(&rhs.inner)
    }

    /// Right-handed cross product `self × rhs`.
    #[must_use]
    pub fn cross(&self, rhs: &Self) -> Self {
        Self::from_nalgebra_vector(self.inner.cross(&rhs.inner))
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.inner.norm()
    }

    #[must_use]
    pub fn length_squared(&self) -> f64 {
        self.inner.norm_squared()
    }

    /// Returns the unit vector pointing in the same direction as `self`.
    ///
    /// A vector whose length is (near) zero has no direction; normalizing it returns
    /// [`Vector3::ZERO`] rather than a vector of NaNs.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let length = self.length();
        if !(length >= f64::EPSILON) {
            return Self::ZERO;
        }
        Self::from_nalgebra_vector(self.inner / length)
    }

    /// Euclidean distance between the points `self` and `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.inner - other.inner).norm()
    }

    /// Returns the component of `self` along `direction`.
    ///
    /// `direction` need not be normalized. Projecting onto [`Vector3::ZERO`] yields
    /// [`Vector3::ZERO`].
    #[must_use]
    pub fn project_onto(&self, direction: &Self) -> Self {
        let unit = direction.normalized();
        unit * self.dot(&unit)
    }

    /// Removes the component of `self` along `normal`, leaving its projection onto the plane
    /// through the origin that `normal` is perpendicular to.
    ///
    /// A zero `normal` leaves `self` unchanged.
    #[must_use]
    pub fn project_onto_plane(&self, normal: &Self) -> Self {
        *self - self.project_onto(normal)
    }

    /// Angle in radians between `self` and `other`, in `[0, π]`.
    ///
    /// Returns 0 if either vector is zero.
    #[must_use]
    pub fn angle_between(&self, other: &Self) -> f64 {
        let lengths = self.length() * other.length();
        if lengths == 0. {
            return 0.;
        }
        (self.dot(other) / lengths).clamp(-1., 1.).acos()
    }

    /// Component-wise comparison with absolute tolerance `epsilon`.
    #[must_use]
    pub fn epsilon_equals(&self, other: &Self, epsilon: f64) -> bool {
        (self.x() - other.x()).abs() <= epsilon
            && (self.y() - other.y()).abs() <= epsilon
            && (self.z() - other.z()).abs() <= epsilon
    }

    /// [`Vector3::epsilon_equals`] with [`Vector3::DEFAULT_EPSILON`].
    #[must_use]
    pub fn epsilon_equals_default(&self, other: &Self) -> bool {
        self.epsilon_equals(other, Self::DEFAULT_EPSILON)
    }

    /// Parses a vector written as `(x, y, z)` or `x, y, z`.
    ///
    /// Whitespace around the parentheses and components is ignored. Anything else (a missing or
    /// extra component, a component that is not a finite number, a lone parenthesis) is
    /// rejected with [`Error::InvalidVector`].
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidVector {
            input: s.to_owned(),
            reason,
        };

        let trimmed = s.trim();
        let body = match (trimmed.strip_prefix('('), trimmed.ends_with(')')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => trimmed,
            _ => return Err(invalid("unbalanced parentheses")),
        };
        if body.contains(&['(', ')'][..]) {
            return Err(invalid("unbalanced parentheses"));
        }

        let mut components = [0.; 3];
        let mut tokens = body.split(',');
        for component in &mut components {
            let token = tokens
                .next()
                .ok_or_else(|| invalid("expected three components"))?
                .trim();
            if token.is_empty() {
                return Err(invalid("empty component"));
            }
            *component = token
                .parse::<f64>()
                .map_err(|_| invalid("component is not a number"))?;
            if !component.is_finite() {
                return Err(invalid("component is not finite"));
            }
        }
        if tokens.next().is_some() {
            return Err(invalid("expected three components"));
        }

        let [x, y, z] = components;
        Ok(Self::new(x, y, z))
    }
}

impl FromStr for Vector3 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for Vector3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x(), v.y(), v.z()]
    }
}

impl From<nalgebra::Vector3<f64>> for Vector3 {
    fn from(v: nalgebra::Vector3<f64>) -> Self {
        Self::from_nalgebra_vector(v)
    }
}

impl From<Vector3> for nalgebra::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        v.inner
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_nalgebra_vector(self.inner + rhs.inner)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_nalgebra_vector(self.inner - rhs.inner)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_nalgebra_vector(-self.inner)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::from_nalgebra_vector(self.inner * rhs)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        rhs * self
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::from_nalgebra_vector(self.inner / rhs)
    }
}

impl Sum for Vector3 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a Vector3> for Vector3 {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Vector3 {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        Self::DEFAULT_EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.inner.abs_diff_eq(&other.inner, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Vector3 {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.inner.relative_eq(&other.inner, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::Vector3;
    use crate::error::Error;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use quickcheck::{quickcheck, Arbitrary};
    use rstest::rstest;

    impl Arbitrary for Vector3 {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            // keep to finite, reasonably-sized values so lengths don't overflow
            let mut component = || loop {
                match f64::arbitrary(g) {
                    f if f.is_finite() => break f.rem_euclid(2e6) - 1e6,
                    _ => {}
                }
            };
            Self::new(component(), component(), component())
        }
    }

    #[test]
    fn constants_are_fixed() {
        assert_eq!(Vector3::ZERO, Vector3::new(0., 0., 0.));
        assert_eq!(Vector3::X_UNIT, Vector3::new(1., 0., 0.));
        assert_eq!(Vector3::Y_UNIT, Vector3::new(0., 1., 0.));
        assert_eq!(Vector3::Z_UNIT, Vector3::new(0., 0., 1.));
    }

    #[test]
    fn arithmetic() {
        let a = Vector3::new(1., 2., 3.);
        let b = Vector3::new(-4., 5., 0.5);
        assert_eq!(a + b, Vector3::new(-3., 7., 3.5));
        assert_eq!(a.add(&b), a + b);
        assert_eq!(b.add(&a), a + b);
        assert_eq!(a.subtract(&b), Vector3::new(5., -3., 2.5));
        assert_eq!(a.multiply(2.), Vector3::new(2., 4., 6.));
        assert_eq!(2. * a, a * 2.);
        assert_eq!(-a, Vector3::new(-1., -2., -3.));
        assert_eq!(a / 2., Vector3::new(0.5, 1., 1.5));
        assert_eq!(a.dot(&b), -4. + 10. + 1.5);
        assert_eq!(
            [a, b].iter().sum::<Vector3>(),
            Vector3::new(-3., 7., 3.5)
        );
    }

    #[test]
    fn cross_is_right_handed() {
        assert_eq!(Vector3::X_UNIT.cross(&Vector3::Y_UNIT), Vector3::Z_UNIT);
        assert_eq!(Vector3::Y_UNIT.cross(&Vector3::Z_UNIT), Vector3::X_UNIT);
        assert_eq!(Vector3::Z_UNIT.cross(&Vector3::X_UNIT), Vector3::Y_UNIT);
        assert_eq!(Vector3::Y_UNIT.cross(&Vector3::X_UNIT), -Vector3::Z_UNIT);
    }

    #[test]
    fn length_and_distance() {
        let v = Vector3::new(3., 4., 12.);
        assert_eq!(v.length(), 13.);
        assert_eq!(v.length_squared(), 169.);
        assert_eq!(v.distance(&Vector3::ZERO), 13.);
        assert_eq!(Vector3::new(1., 1., 1.).distance(&Vector3::new(1., 1., 3.)), 2.);
    }

    #[test]
    fn normalizing_zero_is_zero() {
        assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
        assert_eq!(Vector3::new(1e-300, 0., 0.).normalized(), Vector3::ZERO);
    }

    #[test]
    fn normalizing() {
        assert_relative_eq!(
            Vector3::new(0., 3., 4.).normalized(),
            Vector3::new(0., 0.6, 0.8)
        );
        assert_eq!(Vector3::new(0., 0., -7.).normalized(), -Vector3::Z_UNIT);
    }

    quickcheck! {
        fn normalization_is_idempotent(v: Vector3) -> bool {
            let once = v.normalized();
            let twice = once.normalized();
            once.epsilon_equals(&twice, 1e-12)
        }

        fn projection_onto_plane_is_perpendicular_to_normal(v: Vector3, n: Vector3) -> bool {
            let n = n.normalized();
            let projected = v.project_onto_plane(&n);
            projected.dot(&n).abs() <= 1e-6 * v.length().max(1.)
        }
    }

    #[test]
    fn project_onto_plane_removes_normal_component() {
        let v = Vector3::new(1., 2., 3.);
        assert_relative_eq!(v.project_onto_plane(&Vector3::Z_UNIT), Vector3::new(1., 2., 0.));
        assert_relative_eq!(
            v.project_onto_plane(&Vector3::new(0., 0., -10.)),
            Vector3::new(1., 2., 0.)
        );
        assert_eq!(v.project_onto_plane(&Vector3::ZERO), v);
    }

    #[test]
    fn angle_between() {
        assert_abs_diff_eq!(
            Vector3::X_UNIT.angle_between(&Vector3::Y_UNIT),
            std::f64::consts::FRAC_PI_2
        );
        assert_abs_diff_eq!(
            Vector3::X_UNIT.angle_between(&-Vector3::X_UNIT),
            std::f64::consts::PI
        );
        assert_eq!(Vector3::ZERO.angle_between(&Vector3::X_UNIT), 0.);
    }

    #[test]
    fn epsilon_equality() {
        let a = Vector3::new(1., 2., 3.);
        let b = Vector3::new(1. + 1e-9, 2. - 1e-9, 3.);
        assert_ne!(a, b);
        assert!(a.epsilon_equals_default(&b));
        assert!(!a.epsilon_equals(&b, 1e-10));
        assert!(!a.epsilon_equals_default(&Vector3::new(1., 2., 3.1)));
    }

    #[rstest]
    #[case("(1, 2, 3)", Vector3::new(1., 2., 3.))]
    #[case("1,2,3", Vector3::new(1., 2., 3.))]
    #[case("  ( -1.5 ,\t2e3,   0.25 )  ", Vector3::new(-1.5, 2000., 0.25))]
    #[case("0, 0, -0", Vector3::new(0., 0., -0.))]
    fn parses_well_formed_vectors(#[case] input: &str, #[case] expected: Vector3) {
        assert_eq!(Vector3::parse(input), Ok(expected));
        assert_eq!(input.parse::<Vector3>(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("(1, 2)")]
    #[case("1, 2, 3, 4")]
    #[case("(1, 2, 3")]
    #[case("1, 2, 3)")]
    #[case("((1, 2, 3))")]
    #[case("(1, two, 3)")]
    #[case("(1, , 3)")]
    #[case("1 2 3")]
    #[case("(NaN, 0, 0)")]
    #[case("(1, 2, inf)")]
    fn rejects_malformed_vectors(#[case] input: &str) {
        assert!(
            matches!(Vector3::parse(input), Err(Error::InvalidVector { .. })),
            "{input:?} should not parse"
        );
    }

    #[test]
    fn display_parses_back() {
        let v = Vector3::new(0.1, -2.5e-7, 123456.789);
        insta::assert_snapshot!(v, @"(0.1, -0.00000025, 123456.789)");
        assert_eq!(v.to_string().parse::<Vector3>(), Ok(v));
    }

    #[test]
    fn nalgebra_and_array_conversions() {
        let v = Vector3::new(1., 2., 3.);
        let n: nalgebra::Vector3<f64> = v.into();
        assert_eq!(n, nalgebra::Vector3::new(1., 2., 3.));
        assert_eq!(Vector3::from(n), v);
        assert_eq!(<[f64; 3]>::from(v), [1., 2., 3.]);
        assert_eq!(Vector3::from([1., 2., 3.]), v);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_is_a_plain_triple() {
        let v = Vector3::new(1., -2., 0.5);
        let yaml = serde_yaml::to_string(&v).unwrap();
        let back: Vector3 = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, v);
    }
}
