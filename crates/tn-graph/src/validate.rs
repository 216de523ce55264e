//! Post-pipeline network validation.
//!
//! Every check is a testable property; strict mode aborts on the first
//! violation, lenient mode logs all of them and lets the network ship with
//! a manifest.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use tn_core::{EdgeId, NetworkConfig, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::network::TrailNetwork;

/// Relative tolerance for length-agreement checks (0.1 %).
const LENGTH_TOLERANCE: f64 = 1e-3;

/// Absolute slack for composition ratio contiguity.
const RATIO_SLACK: f64 = 1e-6;

// ── Violations ────────────────────────────────────────────────────────────────

/// One failed post-condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// A surviving degree-2 node outside any reported cycle.
    Degree2Node(NodeId),
    /// An edge whose endpoints are the same node.
    SelfLoopEdge(EdgeId),
    /// Two edges sharing both endpoints with coincident geometry.
    DuplicateEdges(EdgeId, EdgeId),
    /// An edge without a single composition row.
    MissingComposition(EdgeId),
    /// Composition rows do not cover the edge contiguously from 0 to 1.
    CompositionGap { edge: EdgeId, seq: u32 },
    /// Summed component lengths disagree with the edge length beyond 0.1 %.
    CompositionLength { edge: EdgeId, expected_m: f64, got_m: f64 },
    /// A composition row references a segment that does not exist.
    DanglingSegment { edge: EdgeId, seq: u32 },
    /// An edge terminal does not coincide with its node's coordinate.
    EndpointMismatch { edge: EdgeId, node: NodeId },
    /// Total edge length disagrees with total split-segment length.
    LengthConservation { expected_m: f64, got_m: f64 },
    /// The merger refused chains over geometric join mismatches.
    GeometricInconsistency { chains: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Degree2Node(n) => write!(f, "unmerged degree-2 node {n}"),
            Violation::SelfLoopEdge(e) => write!(f, "self-loop edge {e}"),
            Violation::DuplicateEdges(a, b) => write!(f, "duplicate edges {a} and {b}"),
            Violation::MissingComposition(e) => write!(f, "edge {e} has no composition"),
            Violation::CompositionGap { edge, seq } => {
                write!(f, "composition of {edge} breaks at row {seq}")
            }
            Violation::CompositionLength { edge, expected_m, got_m } => write!(
                f,
                "composition of {edge} sums to {got_m:.2} m, edge is {expected_m:.2} m"
            ),
            Violation::DanglingSegment { edge, seq } => {
                write!(f, "composition row {seq} of {edge} references a missing segment")
            }
            Violation::EndpointMismatch { edge, node } => {
                write!(f, "edge {edge} terminal does not coincide with node {node}")
            }
            Violation::LengthConservation { expected_m, got_m } => write!(
                f,
                "edge lengths sum to {got_m:.2} m, split segments to {expected_m:.2} m"
            ),
            Violation::GeometricInconsistency { chains } => {
                write!(f, "{chains} chain(s) refused over join mismatches")
            }
        }
    }
}

/// Everything the validator found.  Empty means every post-condition holds.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
}

// ── Validator ─────────────────────────────────────────────────────────────────

/// Check all network post-conditions.
///
/// - `total_segment_len_m`: Σ split-segment lengths, for conservation.
/// - `segment_count`: size of the segment id space, for dangling references.
/// - `cycle_nodes`: nodes on reported cycles, exempt from the degree-2 check.
/// - `merge_inconsistencies`: refused-chain count from the merger.
///
/// # Errors
///
/// In strict mode the first violation aborts as [`GraphError::Invariant`];
/// in lenient mode all violations come back in the outcome.
pub fn validate(
    net: &TrailNetwork,
    total_segment_len_m: f64,
    segment_count: usize,
    cycle_nodes: &[NodeId],
    merge_inconsistencies: usize,
    cfg: &NetworkConfig,
) -> GraphResult<ValidationOutcome> {
    let mut out = ValidationOutcome::default();
    let exempt: FxHashSet<NodeId> = cycle_nodes.iter().copied().collect();
    let cell = cfg.grid_cell_deg;

    // Degree checks.  Degree-0 nodes are merge residue and are not emitted;
    // degree 2 survives only on reported cycles.
    for id in net.node_ids() {
        let d = net.degree(id);
        if d == 2 && !exempt.contains(&id) {
            out.violations.push(Violation::Degree2Node(id));
        }
    }

    // Per-edge checks.
    let mut by_ends: FxHashMap<(NodeId, NodeId), Vec<EdgeId>> = FxHashMap::default();
    let mut total_edge_len = 0.0f64;
    for edge in net.alive_edges() {
        total_edge_len += edge.length_m;

        if edge.source == edge.target {
            out.violations.push(Violation::SelfLoopEdge(edge.id));
        }

        // Edge terminals must coincide with their nodes' coordinates.
        for (end, node) in [
            (edge.geometry.start(), edge.source),
            (edge.geometry.end(), edge.target),
        ] {
            if end.planar_dist_deg(net.node(node).point) > cell {
                out.violations.push(Violation::EndpointMismatch { edge: edge.id, node });
            }
        }

        // Composition must cover the edge contiguously from 0 to 1.
        if edge.composition.is_empty() {
            out.violations.push(Violation::MissingComposition(edge.id));
        } else {
            let rows = &edge.composition;
            if rows[0].start_ratio.abs() > RATIO_SLACK
                || (rows[rows.len() - 1].end_ratio - 1.0).abs() > RATIO_SLACK
            {
                out.violations.push(Violation::CompositionGap { edge: edge.id, seq: 1 });
            }
            for w in rows.windows(2) {
                if (w[0].end_ratio - w[1].start_ratio).abs() > RATIO_SLACK {
                    out.violations.push(Violation::CompositionGap {
                        edge: edge.id,
                        seq:  w[1].segment_seq,
                    });
                }
            }
            for row in rows {
                if row.segment.index() >= segment_count {
                    out.violations.push(Violation::DanglingSegment {
                        edge: edge.id,
                        seq:  row.segment_seq,
                    });
                }
            }
            let sum: f64 = rows.iter().map(|r| r.length_m).sum();
            if edge.length_m > 0.0
                && ((sum - edge.length_m).abs() / edge.length_m) > LENGTH_TOLERANCE
            {
                out.violations.push(Violation::CompositionLength {
                    edge:       edge.id,
                    expected_m: edge.length_m,
                    got_m:      sum,
                });
            }
        }

        by_ends
            .entry((edge.source.min(edge.target), edge.source.max(edge.target)))
            .or_default()
            .push(edge.id);
    }

    // Geometric duplicates among same-endpoint edges.
    for ids in by_ends.values() {
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let (ea, eb) = (net.edge(a), net.edge(b));
                if let (Some(ea), Some(eb)) = (ea, eb)
                    && geometries_coincide(&ea.geometry, &eb.geometry)
                {
                    out.violations.push(Violation::DuplicateEdges(a, b));
                }
            }
        }
    }

    // Length conservation against the split-segment totals.
    if total_segment_len_m > 0.0
        && ((total_edge_len - total_segment_len_m).abs() / total_segment_len_m)
            > LENGTH_TOLERANCE
    {
        out.violations.push(Violation::LengthConservation {
            expected_m: total_segment_len_m,
            got_m:      total_edge_len,
        });
    }

    if merge_inconsistencies > 0 {
        out.violations.push(Violation::GeometricInconsistency {
            chains: merge_inconsistencies,
        });
    }

    out.violations.sort_by_key(violation_order);

    if cfg.strict_validation
        && let Some(first) = out.violations.first()
    {
        for v in &out.violations {
            log::error!("validation: {v}");
        }
        return Err(GraphError::Invariant(first.clone()));
    }
    for v in &out.violations {
        log::warn!("validation: {v}");
    }
    Ok(out)
}

/// Stable ordering for the manifest: hard topology faults first.
fn violation_order(v: &Violation) -> u8 {
    match v {
        Violation::SelfLoopEdge(_)            => 0,
        Violation::Degree2Node(_)             => 1,
        Violation::DuplicateEdges(..)         => 2,
        Violation::EndpointMismatch { .. }    => 3,
        Violation::MissingComposition(_)      => 4,
        Violation::CompositionGap { .. }      => 5,
        Violation::DanglingSegment { .. }     => 6,
        Violation::CompositionLength { .. }   => 7,
        Violation::LengthConservation { .. }  => 8,
        Violation::GeometricInconsistency { .. } => 9,
    }
}

fn geometries_coincide(a: &tn_core::Polyline, b: &tn_core::Polyline) -> bool {
    if a.vertex_count() != b.vertex_count() {
        return false;
    }
    let fwd = a.coords.iter().zip(&b.coords).all(|(x, y)| x.same_position(*y));
    let rev = a
        .coords
        .iter()
        .zip(b.coords.iter().rev())
        .all(|(x, y)| x.same_position(*y));
    fwd || rev
}
