//! Run counters, reject accumulation, and the pipeline result.

use tn_core::{Edge, Node, NodeId};
use tn_detect::Reject;
use tn_graph::Violation;
use tn_workspace::Stage;

/// Per-stage quantities, for logs and downstream QA.
#[derive(Debug, Default)]
pub struct StageCounters {
    pub raw_rows:        usize,
    pub trails_kept:     usize,
    pub trails_rejected: usize,
    pub flattened_parts: usize,

    pub intersection_points: usize,
    pub gated_candidates:    usize,
    pub endpoint_snaps:      usize,

    pub segments:      usize,
    pub refused_cuts:  usize,
    pub unsplit_trails: usize,

    pub nodes_before_merge:      usize,
    pub edges_before_merge:      usize,
    pub duplicate_edges_dropped: usize,
    pub self_loops_broken:       usize,

    pub merged_chains:    usize,
    pub merge_passes:     u32,
    pub nodes_after_merge: usize,
    pub edges_after_merge: usize,

    /// Geodesic totals across the transformation, for conservation checks.
    pub total_trail_length_m:   f64,
    pub total_segment_length_m: f64,
    pub total_edge_length_m:    f64,

    /// Wall-clock seconds per completed stage.
    pub stage_secs: Vec<(Stage, f64)>,
}

/// Everything a run reports alongside (or instead of) its network.
#[derive(Debug, Default)]
pub struct RunReport {
    pub counters: StageCounters,
    /// Per-row input rejects (InputError class; the run continued).
    pub rejects: Vec<Reject>,
    /// Validator manifest.  Empty on a clean strict run.
    pub violations: Vec<Violation>,
    /// Nodes on reported unmerged cycles.
    pub cycle_nodes: Vec<NodeId>,
    /// Synthetic boundaries promoted to break isolated cycles.
    pub promoted_nodes: Vec<NodeId>,
}

/// The emitted network plus its report.
#[derive(Debug)]
pub struct NetworkResult {
    pub nodes:  Vec<Node>,
    pub edges:  Vec<Edge>,
    pub report: RunReport,
}
