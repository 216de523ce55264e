//! Workspace/resource error type.

use thiserror::Error;

use crate::stage::Stage;

/// Resource-class failures: workspace lifecycle, stage budget, cancellation.
/// All of these are fatal to the pipeline; the workspace is left at its
/// last-successful stage for inspection.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace name `{0}` is already in use")]
    NameTaken(String),

    #[error("operation requires stage `{expected}` but workspace `{name}` is at `{actual}`")]
    WrongStage {
        name:     String,
        expected: Stage,
        actual:   Stage,
    },

    #[error("stage `{stage}` exceeded its {budget_s} s wall-clock budget")]
    StageTimeout { stage: Stage, budget_s: u64 },

    #[error("pipeline cancelled after stage `{0}`")]
    Cancelled(Stage),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
