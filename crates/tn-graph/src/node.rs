//! The noder: split segments in, planar graph out.
//!
//! Contract highlights:
//!
//! - Node identity is the topology grid cell of a segment endpoint; each
//!   distinct cell becomes exactly one node with a stable ascending id,
//!   assigned during a deterministic scan of segments sorted by
//!   `(origin_source_id, part, segment_index)`.
//! - Terminal vertices are rewritten to the node's canonical coordinate.
//! - Self-loops never survive: a segment whose endpoints share a node is
//!   broken into two edges through an injected midpoint node.
//! - Exact duplicate edges are dropped; near-duplicates (same endpoints,
//!   different geometry) are kept and reported.

use rustc_hash::FxHashMap;

use tn_core::{
    Coord3, EdgeId, NetworkConfig, NodeId, Polyline, SplitSegment, grid_key, snap_coord,
};
use tn_geom::{elevation_gain_loss, length_m, substring};

use crate::compose::{single_row, split_rows};
use crate::error::GraphResult;
use crate::network::TrailNetwork;

/// Diagnostics from the noding pass.
#[derive(Debug, Default)]
pub struct NodingReport {
    pub duplicate_edges_dropped: usize,
    /// Edge pairs sharing both endpoints with differing geometry.
    pub near_duplicate_pairs: Vec<(EdgeId, EdgeId)>,
    pub self_loops_broken: usize,
    /// Segments whose geometry collapsed below two distinct cells.
    pub degenerate_segments: usize,
}

/// Build the planar network from the split segment set.
pub fn node_network(
    segments: &[SplitSegment],
    cfg: &NetworkConfig,
) -> GraphResult<(TrailNetwork, NodingReport)> {
    let cell = cfg.grid_cell_deg;
    let mut net = TrailNetwork::new();
    let mut report = NodingReport::default();
    let mut node_of: FxHashMap<(i64, i64), NodeId> = FxHashMap::default();
    // Unordered endpoint pair → existing edges, for duplicate detection.
    let mut by_ends: FxHashMap<(NodeId, NodeId), Vec<EdgeId>> = FxHashMap::default();

    // Deterministic scan order, independent of upstream trail numbering.
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&a, &b| {
        let ka = (&segments[a].origin_source_id, segments[a].part, segments[a].segment_index);
        let kb = (&segments[b].origin_source_id, segments[b].part, segments[b].segment_index);
        ka.cmp(&kb)
    });

    for idx in order {
        let seg = &segments[idx];
        if seg.geometry.vertex_count() < 2 {
            report.degenerate_segments += 1;
            continue;
        }

        let mut node_at = |net: &mut TrailNetwork, c: Coord3| -> NodeId {
            let key = grid_key(c, cell);
            *node_of
                .entry(key)
                .or_insert_with(|| net.add_node(snap_coord(c, cell)))
        };
        let source = node_at(&mut net, seg.geometry.start());
        let target = node_at(&mut net, seg.geometry.end());

        // Terminal vertices take the canonical node coordinate.
        let mut geometry = seg.geometry.clone();
        rewrite_terminals(&mut geometry, net.node(source).point, net.node(target).point);

        if source == target {
            // Break the loop through an injected midpoint node.
            if geometry.planar_len_deg() == 0.0 {
                report.degenerate_segments += 1;
                continue;
            }
            let first = substring(&geometry, 0.0, 0.5, 0.0)?;
            let second = substring(&geometry, 0.5, 1.0, 0.0)?;
            let mid = node_at(&mut net, first.end());
            if mid == source {
                // Loop too small for the grid to tell its halves apart.
                report.degenerate_segments += 1;
                continue;
            }
            report.self_loops_broken += 1;

            let rows = single_row(seg, 0.0);
            let (head_rows, tail_rows) = split_rows(&rows, 0.5);
            for (half, half_rows, from, to) in
                [(first, head_rows, source, mid), (second, tail_rows, mid, target)]
            {
                let mut half = half;
                rewrite_terminals(&mut half, net.node(from).point, net.node(to).point);
                push_edge(&mut net, &mut by_ends, &mut report, seg, half, from, to, half_rows)?;
            }
            continue;
        }

        let rows = single_row(seg, 0.0);
        push_edge(&mut net, &mut by_ends, &mut report, seg, geometry, source, target, rows)?;
    }

    log::info!(
        "node: {} nodes, {} edges ({} duplicates dropped, {} self-loops broken)",
        net.node_count(),
        net.edge_count(),
        report.duplicate_edges_dropped,
        report.self_loops_broken
    );
    Ok((net, report))
}

fn rewrite_terminals(geometry: &mut Polyline, start: Coord3, end: Coord3) {
    let first_ele = geometry.coords[0].ele;
    geometry.coords[0] = Coord3::new(start.lon, start.lat, first_ele);
    let last = geometry.vertex_count() - 1;
    let last_ele = geometry.coords[last].ele;
    geometry.coords[last] = Coord3::new(end.lon, end.lat, last_ele);
}

/// Insert one edge unless it exactly duplicates an existing one.
#[allow(clippy::too_many_arguments)]
fn push_edge(
    net: &mut TrailNetwork,
    by_ends: &mut FxHashMap<(NodeId, NodeId), Vec<EdgeId>>,
    report: &mut NodingReport,
    seg: &SplitSegment,
    geometry: Polyline,
    source: NodeId,
    target: NodeId,
    mut rows: Vec<tn_core::CompositionRow>,
) -> GraphResult<()> {
    let ends = (source.min(target), source.max(target));
    if let Some(existing) = by_ends.get(&ends) {
        for &other in existing {
            let Some(other_edge) = net.edge(other) else { continue };
            if geometry_equal(&geometry, &other_edge.geometry) {
                report.duplicate_edges_dropped += 1;
                log::debug!(
                    "duplicate edge from segment `{}#{}` dropped (matches {})",
                    seg.origin_source_id,
                    seg.segment_index,
                    other
                );
                return Ok(());
            }
        }
    }

    let len = length_m(&geometry)?;
    let (gain, loss) = elevation_gain_loss(&geometry);
    for row in &mut rows {
        let span = row.end_ratio - row.start_ratio;
        row.length_m = len * span;
    }
    let id = net.add_edge(source, target, seg.attrs.clone(), geometry, len, gain, loss, rows);

    let slot = by_ends.entry(ends).or_default();
    if let Some(&prior) = slot.first() {
        report.near_duplicate_pairs.push((prior, id));
    }
    slot.push(id);
    Ok(())
}

/// Same vertex count and every vertex planar-equal, forward or reversed.
fn geometry_equal(a: &Polyline, b: &Polyline) -> bool {
    if a.vertex_count() != b.vertex_count() {
        return false;
    }
    let fwd = a
        .coords
        .iter()
        .zip(&b.coords)
        .all(|(x, y)| x.same_position(*y));
    let rev = a
        .coords
        .iter()
        .zip(b.coords.iter().rev())
        .all(|(x, y)| x.same_position(*y));
    fwd || rev
}
