//! Graph-subsystem error type.

use thiserror::Error;

use tn_core::EdgeId;
use tn_geom::GeomError;

use crate::validate::Violation;

/// Errors produced by the noder, merger, and validator.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A post-condition of a stage failed.  Fatal in strict mode; lenient
    /// mode downgrades it to a manifest entry.
    #[error("network invariant violated: {0}")]
    Invariant(Violation),

    /// A lookup hit a retired edge slot.  The merger only walks alive
    /// edges, so seeing this means the incidence lists and the edge arena
    /// disagree.
    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error("geometry kernel failure: {0}")]
    Geom(#[from] GeomError),
}

pub type GraphResult<T> = Result<T, GraphError>;
