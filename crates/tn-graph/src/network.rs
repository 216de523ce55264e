//! The mutable trail network: node/edge arenas with incidence lists.
//!
//! # Id discipline
//!
//! Node and edge ids are arena indices, assigned in creation order.  Retiring
//! an edge tombstones its slot — ids of retired edges are never reused, so a
//! merge-produced edge is always distinguishable from anything it replaced.
//! Nodes are never deleted; a node whose last incident edge is retired drops
//! to degree 0 and is omitted from the emitted rows.

use tn_core::{CompositionRow, Coord3, Edge, EdgeId, Node, NodeId, Polyline, TrailAttrs};

use crate::error::{GraphError, GraphResult};

/// Planar graph under construction.  Built by the noder, restructured by the
/// degree-2 merger, read by the validator.
#[derive(Debug, Default)]
pub struct TrailNetwork {
    nodes:    Vec<Node>,
    edges:    Vec<Option<Edge>>,
    /// Alive incident edges per node, ascending by edge id.
    incident: Vec<Vec<EdgeId>>,
}

impl TrailNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Growth ────────────────────────────────────────────────────────────

    /// Add a node at its canonical coordinate; degree starts at 0.
    pub fn add_node(&mut self, point: Coord3) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, point, degree: 0 });
        self.incident.push(Vec::new());
        id
    }

    /// Add an edge and update incidence and degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        attrs: TrailAttrs,
        geometry: Polyline,
        length_m: f64,
        elevation_gain_m: f64,
        elevation_loss_m: f64,
        composition: Vec<CompositionRow>,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge {
            id,
            source,
            target,
            attrs,
            geometry,
            length_m,
            elevation_gain_m,
            elevation_loss_m,
            composition,
        }));
        self.incident[source.index()].push(id);
        self.nodes[source.index()].degree += 1;
        self.incident[target.index()].push(id);
        self.nodes[target.index()].degree += 1;
        id
    }

    /// Tombstone an edge, returning it.  Incidence and degrees update; the
    /// id is never handed out again.
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] when the edge is already retired.
    pub fn retire_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self.edges[id.index()]
            .take()
            .ok_or(GraphError::EdgeNotFound(id))?;
        for node in [edge.source, edge.target] {
            self.incident[node.index()].retain(|&e| e != id);
            self.nodes[node.index()].degree -= 1;
        }
        Ok(edge)
    }

    // ── Access ────────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges[id.index()].as_ref()
    }

    /// Like [`edge`](Self::edge), for callers holding an id that must be
    /// alive (incidence lists and chain walks only carry alive edges).
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] when the slot is retired.
    pub fn require_edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.edges[id.index()]
            .as_ref()
            .ok_or(GraphError::EdgeNotFound(id))
    }

    #[inline]
    pub fn degree(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].degree
    }

    /// Alive incident edges of `node`, ascending by edge id.
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.incident[node.index()]
    }

    /// The endpoint of `edge` opposite to `node`.
    pub fn other_end(&self, edge: &Edge, node: NodeId) -> NodeId {
        if edge.source == node { edge.target } else { edge.source }
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Alive edges in id order.
    pub fn alive_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter_map(Option::as_ref)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.degree > 0).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    // ── Emission ──────────────────────────────────────────────────────────

    /// Consume the graph into emitted rows: nodes that still carry edges,
    /// and alive edges, both in id order.
    pub fn into_rows(self) -> (Vec<Node>, Vec<Edge>) {
        let nodes = self.nodes.into_iter().filter(|n| n.degree > 0).collect();
        let edges = self.edges.into_iter().flatten().collect();
        (nodes, edges)
    }
}
