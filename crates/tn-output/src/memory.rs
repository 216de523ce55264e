//! In-memory sink for tests and embedding callers.

use tn_core::{Edge, Node};

use crate::error::SinkResult;
use crate::sink::NetworkSink;

/// Collects emitted rows in memory.  Trivially atomic.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetworkSink for MemorySink {
    fn write_nodes(&mut self, nodes: &[Node]) -> SinkResult<()> {
        self.nodes.extend_from_slice(nodes);
        Ok(())
    }

    fn write_edges(&mut self, edges: &[Edge]) -> SinkResult<()> {
        self.edges.extend_from_slice(edges);
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.finished = true;
        Ok(())
    }
}
