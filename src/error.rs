use thiserror::Error;

/// Errors produced by the conversion and parsing routines of this crate.
///
/// Every error is local to the call that produced it. Malformed input is reported through one
/// of the `Invalid*` variants, while [`Error::NonConvergence`] is reserved for inputs that are
/// well-formed but for which an iterative inverse could not settle within its iteration budget.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid vector string {input:?}: {reason}")]
    InvalidVector { input: String, reason: &'static str },

    #[error("invalid MGRS string {input:?}: {reason}")]
    InvalidMgrs { input: String, reason: &'static str },

    #[error("UTM zone {0} is outside of 1..=60")]
    InvalidZone(u8),

    #[error("hemisphere must be 'N' or 'S', got {0:?}")]
    InvalidHemisphere(char),

    #[error("MGRS precision must be between 1 and 5 digits, got {0}")]
    InvalidPrecision(usize),

    #[error("invalid ellipsoid (a = {semi_major_axis} m, f = {flattening})")]
    InvalidEllipsoid {
        semi_major_axis: f64,
        flattening: f64,
    },

    #[error("latitude {0}° is outside of the range this conversion supports")]
    LatitudeOutOfRange(f64),

    #[error("cannot build a polygon from an empty point set")]
    EmptyPointSet,

    #[error("{operation} did not converge within {iterations} iterations")]
    NonConvergence {
        operation: &'static str,
        iterations: usize,
    },
}

/// Result type for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
