//! Geometry-kernel error type.

use thiserror::Error;

/// Errors produced by kernel operations on a specific geometry.  All are
/// recoverable at pipeline level: the offending trail is reported and
/// skipped.
#[derive(Debug, Error)]
pub enum GeomError {
    #[error("polyline has {0} vertices; at least 2 required")]
    TooFewPoints(usize),

    #[error("non-finite coordinate at vertex {0}")]
    NonFinite(usize),

    #[error("polyline has zero planar length")]
    ZeroLength,

    #[error("fractional range [{r1}, {r2}] is not ascending within [0, 1]")]
    BadRange { r1: f64, r2: f64 },

    #[error("substring of {got_m:.3} m is below the {min_m:.3} m minimum segment length")]
    BelowMinimumLength { got_m: f64, min_m: f64 },
}

pub type GeomResult<T> = Result<T, GeomError>;
