//! Core error type.
//!
//! Sub-crates define their own error enums (`GeomError`, `WorkspaceError`,
//! `GraphError`, …) and the pipeline crate unifies them via `From` impls.
//! `CoreError` covers only the faults that exist before any stage runs.

use thiserror::Error;

/// Errors raised by configuration validation and input row admission.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value is outside its supported range.  Fatal at
    /// startup; the pipeline never runs with a bad tolerance.
    #[error("configuration option `{option}` out of range: {reason}")]
    Tolerance {
        option: &'static str,
        reason: String,
    },

    /// A source row is unusable (empty geometry, missing attribute, unknown
    /// source tag).  Reported per-row; the pipeline continues.
    #[error("input row `{source_id}`: {reason}")]
    Input { source_id: String, reason: String },
}

/// Shorthand result type for `tn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
