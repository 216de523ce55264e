//! Degree-2 chain merging: fold splitting residue back into long edges.
//!
//! # Algorithm
//!
//! Iterative fixed point, capped at `max_degree2_iterations` passes:
//!
//! 1. Walk maximal chains outward from every non-degree-2 anchor, ascending
//!    node id, ascending edge id at each anchor.  A chain consumes an edge
//!    only while the far vertex is degree 2 and unvisited this pass.
//! 2. A chain that returns to its anchor is a closed loop: never merged
//!    (that edge would be a self-loop), reported instead.
//! 3. Leftover degree-2 components with no anchor are isolated cycles: the
//!    two lowest-id vertices are promoted to synthetic boundaries, the two
//!    arcs between them merge, and the cycle is reported.
//! 4. Merged geometry is the in-order concatenation of constituent
//!    geometries, each reoriented so its tail meets the previous head;
//!    join-vertex duplicates collapse.  A join mismatch beyond the topology
//!    cell refuses the merge and is reported as a geometric inconsistency.
//!
//! Attributes aggregate by mode (first-encountered wins ties); lengths and
//! elevation gain/loss are summed from constituents, never re-derived.

use rustc_hash::{FxHashMap, FxHashSet};

use tn_core::{Coord3, EdgeId, NetworkConfig, NodeId, Polyline, TrailAttrs};

use crate::compose::concat_rows;
use crate::error::GraphResult;
use crate::network::TrailNetwork;

/// Diagnostics from the merge fixed point.
#[derive(Debug, Default)]
pub struct MergeReport {
    pub merged_chains: usize,
    pub passes: u32,
    /// Interior/boundary nodes of reported cycles; exempt from degree-2
    /// validation.
    pub cycle_nodes: Vec<NodeId>,
    /// Synthetic boundaries promoted to break isolated cycles.
    pub promoted_nodes: Vec<NodeId>,
    /// Chains refused because constituent geometries disagreed at a join.
    pub inconsistencies: usize,
}

/// One walked chain: the edges in traversal order with their orientation,
/// and the far endpoint.
struct Chain {
    edges: Vec<(EdgeId, bool)>,
    end:   NodeId,
}

/// Run the degree-2 fixed point over the network.
pub fn merge_degree2(net: &mut TrailNetwork, cfg: &NetworkConfig) -> GraphResult<MergeReport> {
    let mut report = MergeReport::default();
    let mut promoted: FxHashSet<NodeId> = FxHashSet::default();
    let mut reported_cycles: FxHashSet<NodeId> = FxHashSet::default();

    for pass in 1..=cfg.max_degree2_iterations {
        report.passes = pass;
        let mut merges = 0usize;
        let mut promotions = 0usize;
        let mut visited: FxHashSet<EdgeId> = FxHashSet::default();

        // ── Anchored chains ───────────────────────────────────────────────
        let is_anchor = |net: &TrailNetwork, promoted: &FxHashSet<NodeId>, v: NodeId| {
            let d = net.degree(v);
            d > 0 && (d != 2 || promoted.contains(&v))
        };

        for v in net.node_ids().collect::<Vec<_>>() {
            if !is_anchor(net, &promoted, v) {
                continue;
            }
            for e in net.incident_edges(v).to_vec() {
                if visited.contains(&e) {
                    continue;
                }
                let chain = walk_chain(net, v, e, &promoted, &mut visited)?;
                if chain.end == v {
                    // Closed loop entered at one anchor: merging it would
                    // produce a self-loop edge.  Leave it, report it.
                    for &(eid, _) in &chain.edges {
                        let edge = net.require_edge(eid)?;
                        for n in [edge.source, edge.target] {
                            if net.degree(n) == 2 {
                                reported_cycles.insert(n);
                            }
                        }
                    }
                    continue;
                }
                if chain.edges.len() >= 2 && merge_chain(net, v, &chain, cfg, &mut report)? {
                    merges += 1;
                }
            }
        }

        // ── Isolated cycles ───────────────────────────────────────────────
        for v in net.node_ids().collect::<Vec<_>>() {
            if net.degree(v) != 2 || promoted.contains(&v) {
                continue;
            }
            let pending: Vec<EdgeId> = net
                .incident_edges(v)
                .iter()
                .copied()
                .filter(|e| !visited.contains(e))
                .collect();
            let Some(&first) = pending.first() else { continue };

            // Walk the whole cycle to collect its vertex set.
            let chain = walk_chain(net, v, first, &promoted, &mut visited)?;
            if chain.end != v {
                // Not a cycle after all (hit an anchor) — already handled
                // from that anchor in a later pass.
                continue;
            }
            let mut cycle_vertices: Vec<NodeId> = Vec::with_capacity(chain.edges.len() * 2);
            for &(eid, _) in &chain.edges {
                let e = net.require_edge(eid)?;
                cycle_vertices.push(e.source);
                cycle_vertices.push(e.target);
            }
            cycle_vertices.sort_unstable();
            cycle_vertices.dedup();

            // Promote the two lowest-id vertices so the cycle gets two
            // boundary nodes and two arc edges — never a self-loop.
            let b1 = cycle_vertices[0];
            let b2 = *cycle_vertices.get(1).unwrap_or(&b1);
            promoted.insert(b1);
            promoted.insert(b2);
            promotions += 1;
            report.promoted_nodes.push(b1);
            if b2 != b1 {
                report.promoted_nodes.push(b2);
            }
            reported_cycles.extend(cycle_vertices.iter().copied());
            log::warn!(
                "isolated degree-2 cycle of {} vertices: promoted {b1} and {b2} as boundaries",
                cycle_vertices.len()
            );
            // Merging of the two arcs happens on the next pass, where the
            // promoted vertices act as anchors.
        }

        report.merged_chains += merges;
        // A pass that neither merged nor promoted is the fixed point; a
        // promotion-only pass gets one more round so the new anchors can
        // merge their arcs.
        if merges == 0 && promotions == 0 {
            break;
        }
    }

    report.cycle_nodes = reported_cycles.into_iter().collect();
    report.cycle_nodes.sort_unstable();

    log::info!(
        "merge: {} chains merged in {} passes ({} cycles reported, {} inconsistencies)",
        report.merged_chains,
        report.passes,
        report.cycle_nodes.len(),
        report.inconsistencies
    );
    Ok(report)
}

// ── Chain walking ─────────────────────────────────────────────────────────────

/// Walk outward from `start` through `first_edge`, consuming edges while the
/// far vertex is an unconsumed degree-2 pass-through.
fn walk_chain(
    net: &TrailNetwork,
    start: NodeId,
    first_edge: EdgeId,
    promoted: &FxHashSet<NodeId>,
    visited: &mut FxHashSet<EdgeId>,
) -> GraphResult<Chain> {
    let mut edges = Vec::new();
    let mut cur_node = start;
    let mut cur_edge = first_edge;

    loop {
        visited.insert(cur_edge);
        let edge = net.require_edge(cur_edge)?;
        let reversed = edge.source != cur_node;
        edges.push((cur_edge, reversed));
        let next = net.other_end(edge, cur_node);

        if next == start || net.degree(next) != 2 || promoted.contains(&next) {
            return Ok(Chain { edges, end: next });
        }
        let Some(&onward) = net
            .incident_edges(next)
            .iter()
            .find(|&&e| e != cur_edge && !visited.contains(&e))
        else {
            return Ok(Chain { edges, end: next });
        };
        cur_node = next;
        cur_edge = onward;
    }
}

// ── Chain merging ─────────────────────────────────────────────────────────────

/// Replace a walked chain with a single edge.  Returns false (and reports)
/// when constituent geometries disagree at a join beyond the topology cell.
fn merge_chain(
    net: &mut TrailNetwork,
    start: NodeId,
    chain: &Chain,
    cfg: &NetworkConfig,
    report: &mut MergeReport,
) -> GraphResult<bool> {
    let cell = cfg.grid_cell_deg;

    // Assemble geometry first; refuse the merge on any join mismatch.
    let mut coords: Vec<Coord3> = Vec::new();
    let mut parts = Vec::with_capacity(chain.edges.len());
    let mut constituent_attrs = Vec::with_capacity(chain.edges.len());
    let mut length_m = 0.0;
    let mut gain = 0.0;
    let mut loss = 0.0;

    for &(eid, reversed) in &chain.edges {
        let edge = net.require_edge(eid)?;
        let geom = if reversed {
            edge.geometry.reversed()
        } else {
            edge.geometry.clone()
        };
        if let Some(&last) = coords.last() {
            if last.planar_dist_deg(geom.start()) > cell {
                report.inconsistencies += 1;
                log::warn!(
                    "chain at {start} refused: join mismatch of {:.2e} deg at {eid}",
                    last.planar_dist_deg(geom.start())
                );
                return Ok(false);
            }
            coords.extend(geom.coords.iter().skip(1).copied());
        } else {
            coords.extend(geom.coords.iter().copied());
        }
        length_m += edge.length_m;
        gain += edge.elevation_gain_m;
        loss += edge.elevation_loss_m;
        parts.push((edge.composition.clone(), edge.length_m, reversed));
        constituent_attrs.push(edge.attrs.clone());
    }

    let composition = concat_rows(&parts);
    let attrs = aggregate_attrs(constituent_attrs.iter());

    // Commit: retire constituents, insert the replacement.
    for &(eid, _) in &chain.edges {
        net.retire_edge(eid)?;
    }
    net.add_edge(
        start,
        chain.end,
        attrs,
        Polyline::new(coords),
        length_m,
        gain,
        loss,
        composition,
    );
    Ok(true)
}

/// Most-common value per attribute field, ties broken by first encounter.
fn aggregate_attrs<'a, I>(edges: I) -> TrailAttrs
where
    I: Iterator<Item = &'a TrailAttrs> + Clone,
{
    fn mode<'a>(values: impl Iterator<Item = &'a str>) -> String {
        let mut counts: FxHashMap<&str, (usize, usize)> = FxHashMap::default();
        for (i, v) in values.enumerate() {
            let entry = counts.entry(v).or_insert((0, i));
            entry.0 += 1;
        }
        counts
            .into_iter()
            .max_by(|(_, (ca, ia)), (_, (cb, ib))| ca.cmp(cb).then(ib.cmp(ia)))
            .map(|(v, _)| v.to_string())
            .unwrap_or_default()
    }

    TrailAttrs {
        name:       mode(edges.clone().map(|a| a.name.as_str())),
        surface:    mode(edges.clone().map(|a| a.surface.as_str())),
        difficulty: mode(edges.clone().map(|a| a.difficulty.as_str())),
        trail_type: mode(edges.map(|a| a.trail_type.as_str())),
    }
}
