use std::f64::consts::{PI, TAU};
use uom::si::angle::radian;
use uom::si::f64::Angle;

/// An angle reduced to a single turn.
///
/// uom stores whatever it is given, so a longitude may arrive as anything from `-720°` to
/// `+1080°`. Anything that needs to know which side of a meridian (or of the equator) a value
/// falls on reduces it through this type first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundedAngle {
    // always in [0, 2π)
    radians: f64,
}

impl BoundedAngle {
    pub(crate) fn new(angle: impl Into<Angle>) -> Self {
        let radians = angle.into().get::<radian>().rem_euclid(TAU);
        Self {
            // rem_euclid rounds tiny negative inputs up to exactly one turn
            radians: if radians >= TAU { 0. } else { radians },
        }
    }

    /// The angle in `[0, 2π)` radians.
    pub(crate) fn get_bounded(self) -> f64 {
        self.radians
    }

    /// The angle in `[-π, π)` radians.
    pub(crate) fn to_signed_range(self) -> f64 {
        if self.radians < PI {
            self.radians
        } else {
            self.radians - TAU
        }
    }

    pub(crate) fn signed(self) -> Angle {
        Angle::new::<radian>(self.to_signed_range())
    }
}
