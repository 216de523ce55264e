//! Detection-subsystem error type.

use thiserror::Error;

use tn_geom::GeomError;

/// Errors produced by the detector and splitter.  Geometry faults on
/// individual trails are recoverable upstream (the trail is reported and
/// skipped); a kernel failure on already-normalized input is a bug and
/// propagates.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("geometry kernel failure: {0}")]
    Geom(#[from] GeomError),
}

pub type DetectResult<T> = Result<T, DetectError>;
