//! The `NetworkSink` trait implemented by all backends.

use tn_core::{Edge, Node};

use crate::error::SinkResult;

/// Push interface for the finished network: one batch per row kind.
///
/// Each batch is atomic — a backend must accept all rows or none.  The
/// composition batch is derived from the edges passed to
/// [`write_edges`](Self::write_edges); backends flatten the per-edge rows
/// themselves so edge and composition output can never disagree.
pub trait NetworkSink {
    /// Write the node batch.
    fn write_nodes(&mut self, nodes: &[Node]) -> SinkResult<()>;

    /// Write the edge batch (with per-edge composition).
    fn write_edges(&mut self, edges: &[Edge]) -> SinkResult<()>;

    /// Flush and close the backend.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> SinkResult<()>;
}
