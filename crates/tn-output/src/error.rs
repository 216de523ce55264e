//! Sink error type.

use thiserror::Error;

/// Errors from network sinks.  Any sink failure is fatal to the pipeline;
/// partial ingest never happens (batches are all-or-nothing).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("sink refused batch: {0}")]
    Refused(String),
}

pub type SinkResult<T> = Result<T, SinkError>;
