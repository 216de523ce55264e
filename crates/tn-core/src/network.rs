//! Emitted network rows: nodes, edges, and composition.
//!
//! These are the plain row types pushed at the sink.  The mutable graph the
//! noder and merger operate on lives in `tn-graph`; by the time rows reach
//! this shape they are final.

use crate::geo::Coord3;
use crate::ids::{EdgeId, NodeId, SegmentId};
use crate::polyline::Polyline;
use crate::trail::TrailAttrs;

/// A topological vertex at a unique planar location.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:     NodeId,
    /// Canonical coordinate: the topology grid cell center this vertex
    /// snapped to.
    pub point:  Coord3,
    /// Count of incident edges.  1 = trailhead, ≥3 = intersection; degree 2
    /// survives only on explicitly reported cycles.
    pub degree: u32,
}

/// One row of an edge's provenance: which split segment covers which
/// fractional span of the edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositionRow {
    pub segment:          SegmentId,
    pub origin_source_id: String,
    /// 1-based position of this row along the edge.
    pub segment_seq:      u32,
    /// Fractional span of the *edge* covered by this constituent.  Rows are
    /// contiguous: row k+1 starts where row k ends; first 0.0, last 1.0.
    pub start_ratio:      f64,
    pub end_ratio:        f64,
    /// Geodesic length of the constituent in meters.
    pub length_m:         f64,
}

/// A network edge between two nodes, backed by one or more split segments.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub id:     EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Aggregated attributes: mode across constituents, first-encountered on
    /// ties.  Per-constituent values remain reachable through composition.
    pub attrs:  TrailAttrs,
    pub geometry: Polyline,
    /// Geodesic 2D length in meters.
    pub length_m: f64,
    /// Elevation gain/loss summed over constituent segment vertex deltas.
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    /// Ordered provenance covering `[0, 1]` of the edge.
    pub composition: Vec<CompositionRow>,
}
