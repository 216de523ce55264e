//! Pipeline error type, unifying every subsystem's errors.

use thiserror::Error;

use tn_core::CoreError;
use tn_detect::DetectError;
use tn_geom::GeomError;
use tn_graph::GraphError;
use tn_output::SinkError;
use tn_workspace::WorkspaceError;

/// Fatal pipeline failures.  Recoverable per-row problems (InputError,
/// per-trail GeomError) never surface here — they accumulate in the run
/// report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Geom(#[from] GeomError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
