//! Intersection detection: X/T/Y events, endpoint fusing, self-loop closure.
//!
//! # Shape of the computation
//!
//! 1. **Self-loop closure** per trail: endpoints within `τ·k` snap to their
//!    midpoint so the loop closes on one future node.
//! 2. **Endpoint fusing**: endpoint clusters within `τ` (single-link, via an
//!    R-tree point index) snap to their centroid.  This is why
//!    endpoint-to-endpoint pairs are excluded from T/Y below — they are
//!    already joined here.
//! 3. **Pair scan** over bbox-overlapping trail pairs (R-tree pruned):
//!    exact crossings, then T events (endpoint onto interior), then Y
//!    near-misses.  Optionally parallel per pair; candidate order is fixed
//!    either way.
//! 4. **Acceptance** is a single sequential fold: a candidate landing in an
//!    occupied cell of the secondary dedup grid merges into the accepted
//!    point (its cuts and snaps re-target the accepted coordinate) instead
//!    of creating a new one.
//!
//! The output is per-trail cut lists plus endpoint snaps for the splitter,
//! and the global [`IntersectionPoint`] set for diagnostics.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use tn_core::{
    Coord3, IntersectionKind, IntersectionPoint, NetworkConfig, Trail, TrailId, grid_key,
};
use tn_geom::{closest_approach, closest_point_on, crossings, distance_m};

use crate::error::DetectResult;

// ── Output types ──────────────────────────────────────────────────────────────

/// Which end of a trail an endpoint snap moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrailEnd {
    Start,
    End,
}

/// Move one trail endpoint to a canonical 2D coordinate (elevation is kept).
#[derive(Copy, Clone, Debug)]
pub struct EndpointSnap {
    pub trail: TrailId,
    pub end:   TrailEnd,
    pub to:    Coord3,
}

/// One accepted cut on a trail.
#[derive(Copy, Clone, Debug)]
pub struct CutPoint {
    /// Fractional position on the trail being cut.
    pub ratio: f64,
    /// Canonical 2D coordinate the cut vertex takes (shared across all
    /// trails meeting here).
    pub point: Coord3,
    pub kind:  IntersectionKind,
}

/// Detector output, consumed by the splitter.
#[derive(Debug, Default)]
pub struct DetectorOutput {
    /// Cut lists indexed by trail (parallel to the input slice), unsorted.
    pub cuts: Vec<Vec<CutPoint>>,
    pub snaps: Vec<EndpointSnap>,
    /// Accepted intersection points, for diagnostics and counters.
    pub points: Vec<IntersectionPoint>,
    /// Candidates dropped by the `[ε, 1-ε]` position gate.
    pub gated_candidates: usize,
}

// ── Internal candidate form ───────────────────────────────────────────────────

/// One candidate meeting point before dedup.
#[derive(Clone, Debug)]
struct Candidate {
    point:      Coord3,
    kind:       IntersectionKind,
    distance_m: f64,
    /// Trails to cut, with the fractional position of the cut.
    cuts:  Vec<(TrailId, f64)>,
    snaps: Vec<(TrailId, TrailEnd)>,
    /// Source ids of every trail involved.
    involved: Vec<String>,
}

// ── Spatial index entries ─────────────────────────────────────────────────────

struct TrailEnvelope {
    aabb: AABB<[f64; 2]>,
    idx:  usize,
}

impl RTreeObject for TrailEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

#[derive(Clone)]
struct EndpointEntry {
    point: [f64; 2],
    slot:  usize,
}

impl RTreeObject for EndpointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for EndpointEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Detect intersections across a normalized trail set.
///
/// Trails must carry ascending ids matching their slice positions (the
/// normalizer guarantees this).
pub fn detect(trails: &[Trail], cfg: &NetworkConfig) -> DetectResult<DetectorOutput> {
    let tau = cfg.tolerance_deg();
    let eps = cfg.split_ratio_epsilon;

    let mut out = DetectorOutput {
        cuts: vec![Vec::new(); trails.len()],
        ..DetectorOutput::default()
    };

    // Working endpoint positions; self-loop closure and fusing update these
    // before the pair scan reads them.  An endpoint that was already moved
    // to a shared point must not be re-snapped by a later T event.
    let mut end_pos: Vec<[Coord3; 2]> = trails
        .iter()
        .map(|t| [t.geometry.start(), t.geometry.end()])
        .collect();
    let mut fused: Vec<[bool; 2]> = vec![[false, false]; trails.len()];

    let mut candidates: Vec<Candidate> = Vec::new();

    // ── 1. Self-loop closure ──────────────────────────────────────────────
    let loop_gap = tn_core::meters_to_degrees(cfg.self_loop_gap_m());
    for (i, trail) in trails.iter().enumerate() {
        let [s, e] = end_pos[i];
        let gap = s.planar_dist_deg(e);
        if gap > tn_core::COORD_EPS_DEG && gap <= loop_gap {
            let mid = Coord3::xy((s.lon + e.lon) / 2.0, (s.lat + e.lat) / 2.0);
            candidates.push(Candidate {
                point:      mid,
                kind:       IntersectionKind::NearApproach,
                distance_m: distance_m(s, mid),
                cuts:       Vec::new(),
                snaps:      vec![(trail.id, TrailEnd::Start), (trail.id, TrailEnd::End)],
                involved:   vec![trail.source_id.clone()],
            });
            end_pos[i] = [mid, mid];
            fused[i] = [true, true];
        }
    }

    // ── 2. Endpoint fusing ────────────────────────────────────────────────
    fuse_endpoints(trails, &mut end_pos, &mut fused, tau, &mut candidates);

    // ── 3. Pair scan ──────────────────────────────────────────────────────
    let envelopes: Vec<TrailEnvelope> = trails
        .iter()
        .enumerate()
        .filter_map(|(idx, t)| {
            t.geometry.bbox().map(|b| {
                let b = b.expanded(tau);
                TrailEnvelope {
                    aabb: AABB::from_corners([b.min_lon, b.min_lat], [b.max_lon, b.max_lat]),
                    idx,
                }
            })
        })
        .collect();
    let tree = RTree::bulk_load(envelopes);

    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (i, trail) in trails.iter().enumerate() {
        let Some(b) = trail.geometry.bbox() else { continue };
        let b = b.expanded(tau);
        let query = AABB::from_corners([b.min_lon, b.min_lat], [b.max_lon, b.max_lat]);
        for hit in tree.locate_in_envelope_intersecting(&query) {
            if hit.idx > i {
                pairs.push((i, hit.idx));
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();

    // Candidate generation per pair is pure; the fold below is sequential
    // either way, so parallel and serial runs accept identically.
    #[cfg(feature = "parallel")]
    let pair_lists: Vec<DetectResult<Vec<Candidate>>> = {
        use rayon::prelude::*;
        pairs
            .par_iter()
            .map(|&(i, j)| pair_candidates(trails, &end_pos, &fused, i, j, cfg))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let pair_lists: Vec<DetectResult<Vec<Candidate>>> = pairs
        .iter()
        .map(|&(i, j)| pair_candidates(trails, &end_pos, &fused, i, j, cfg))
        .collect();

    for list in pair_lists {
        candidates.extend(list?);
    }

    // ── 4. Acceptance fold with secondary-grid dedup ──────────────────────
    let dedup_cell = cfg.dedup_cell_deg();
    let mut accepted: FxHashMap<(i64, i64), usize> = FxHashMap::default();

    for cand in candidates {
        let key = grid_key(cand.point, dedup_cell);
        let (point, merged_into) = match accepted.get(&key) {
            Some(&slot) => (out.points[slot].point, Some(slot)),
            None => (cand.point, None),
        };

        for (tid, ratio) in &cand.cuts {
            if *ratio < eps || *ratio > 1.0 - eps {
                out.gated_candidates += 1;
                continue;
            }
            out.cuts[tid.index()].push(CutPoint {
                ratio: *ratio,
                point,
                kind: cand.kind,
            });
        }
        for &(trail, end) in &cand.snaps {
            out.snaps.push(EndpointSnap { trail, end, to: point });
        }

        match merged_into {
            Some(slot) => {
                let existing = &mut out.points[slot];
                existing.connected_source_ids.extend(cand.involved);
                existing.connected_source_ids.sort();
                existing.connected_source_ids.dedup();
            }
            None => {
                let mut ids = cand.involved;
                ids.sort();
                ids.dedup();
                accepted.insert(key, out.points.len());
                out.points.push(IntersectionPoint {
                    point: cand.point,
                    connected_source_ids: ids,
                    kind: cand.kind,
                    distance_m: cand.distance_m,
                });
            }
        }
    }

    log::info!(
        "detect: {} intersection points accepted, {} candidates gated, {} endpoint snaps",
        out.points.len(),
        out.gated_candidates,
        out.snaps.len()
    );
    Ok(out)
}

// ── Endpoint fusing ───────────────────────────────────────────────────────────

/// Single-link clustering of trail endpoints within `tau`; each non-trivial
/// cluster snaps to its centroid.
fn fuse_endpoints(
    trails: &[Trail],
    end_pos: &mut [[Coord3; 2]],
    fused: &mut [[bool; 2]],
    tau: f64,
    candidates: &mut Vec<Candidate>,
) {
    let entries: Vec<EndpointEntry> = end_pos
        .iter()
        .enumerate()
        .flat_map(|(i, ends)| {
            [
                EndpointEntry { point: [ends[0].lon, ends[0].lat], slot: i * 2 },
                EndpointEntry { point: [ends[1].lon, ends[1].lat], slot: i * 2 + 1 },
            ]
        })
        .collect();
    let tree = RTree::bulk_load(entries.clone());

    let mut assigned = vec![false; entries.len()];
    for seed in 0..entries.len() {
        if assigned[seed] {
            continue;
        }
        // Breadth-first single-link expansion from the seed endpoint.
        let mut cluster = vec![seed];
        assigned[seed] = true;
        let mut frontier = vec![seed];
        while let Some(slot) = frontier.pop() {
            let p = entries[slot].point;
            for hit in tree.locate_within_distance(p, tau * tau) {
                if !assigned[hit.slot] {
                    assigned[hit.slot] = true;
                    cluster.push(hit.slot);
                    frontier.push(hit.slot);
                }
            }
        }

        let distinct_trails = {
            let mut ts: Vec<usize> = cluster.iter().map(|s| s / 2).collect();
            ts.sort_unstable();
            ts.dedup();
            ts.len()
        };
        if distinct_trails < 2 {
            continue;
        }

        cluster.sort_unstable();
        let centroid = {
            let (mut lon, mut lat) = (0.0, 0.0);
            for &s in &cluster {
                lon += entries[s].point[0];
                lat += entries[s].point[1];
            }
            let n = cluster.len() as f64;
            Coord3::xy(lon / n, lat / n)
        };

        // Exactly coincident endpoints need no snap and no record: node
        // coincidence at the topology grid handles them.
        let spread = cluster
            .iter()
            .map(|&s| Coord3::xy(entries[s].point[0], entries[s].point[1]).planar_dist_deg(centroid))
            .fold(0.0f64, f64::max);
        if spread < tn_core::COORD_EPS_DEG {
            continue;
        }

        let mut snaps = Vec::with_capacity(cluster.len());
        let mut involved = Vec::with_capacity(cluster.len());
        let mut max_dist_m = 0.0f64;
        for &s in &cluster {
            let trail_idx = s / 2;
            let end = if s % 2 == 0 { TrailEnd::Start } else { TrailEnd::End };
            let cur = Coord3::xy(entries[s].point[0], entries[s].point[1]);
            snaps.push((trails[trail_idx].id, end));
            involved.push(trails[trail_idx].source_id.clone());
            max_dist_m = max_dist_m.max(distance_m(cur, centroid));
            end_pos[trail_idx][s % 2] = centroid;
            fused[trail_idx][s % 2] = true;
        }

        candidates.push(Candidate {
            point: centroid,
            kind: IntersectionKind::NearApproach,
            distance_m: max_dist_m,
            cuts: Vec::new(),
            snaps,
            involved,
        });
    }
}

// ── Pair candidates ───────────────────────────────────────────────────────────

/// Generate the candidates one trail pair contributes: exact crossings, T
/// events, then a Y near-miss when nothing else connected them.
fn pair_candidates(
    trails: &[Trail],
    end_pos: &[[Coord3; 2]],
    fused: &[[bool; 2]],
    i: usize,
    j: usize,
    cfg: &NetworkConfig,
) -> DetectResult<Vec<Candidate>> {
    let tau = cfg.tolerance_deg();
    let a = &trails[i];
    let b = &trails[j];
    let mut out = Vec::new();

    // ── Exact crossings ───────────────────────────────────────────────────
    let mut crossed = false;
    for hit in crossings(&a.geometry, &b.geometry)? {
        if !hit.proper {
            // Vertex-coincidence meetings become shared nodes on their own.
            continue;
        }
        crossed = true;
        out.push(Candidate {
            point:      Coord3::xy(hit.point.lon, hit.point.lat),
            kind:       IntersectionKind::ExactCrossing,
            distance_m: 0.0,
            cuts:       vec![(a.id, hit.ratio_a), (b.id, hit.ratio_b)],
            snaps:      Vec::new(),
            involved:   vec![a.source_id.clone(), b.source_id.clone()],
        });
    }

    // ── T events: endpoint onto the other trail's interior ────────────────
    let mut t_found = false;
    let ends = [
        (i, j, TrailEnd::Start),
        (i, j, TrailEnd::End),
        (j, i, TrailEnd::Start),
        (j, i, TrailEnd::End),
    ];
    for (from, onto, end) in ends {
        let side = if end == TrailEnd::Start { 0 } else { 1 };
        // An endpoint that already joined a fused cluster has its node;
        // re-snapping it onto an interior would tear the cluster apart.
        if fused[from][side] {
            continue;
        }
        let ep = end_pos[from][side];

        // Endpoint-to-endpoint pairs were fused already; skip them here.
        let near_other_end = end_pos[onto]
            .iter()
            .any(|&oe| ep.planar_dist_deg(oe) <= tau);
        if near_other_end {
            continue;
        }

        let proj = closest_point_on(&trails[onto].geometry, ep)?;
        if proj.distance_deg > tau {
            continue;
        }
        t_found = true;
        out.push(Candidate {
            point:      Coord3::xy(proj.point.lon, proj.point.lat),
            kind:       IntersectionKind::EndpointOnLine,
            distance_m: distance_m(ep, proj.point),
            cuts:       vec![(trails[onto].id, proj.ratio)],
            snaps:      vec![(trails[from].id, end)],
            involved:   vec![trails[from].source_id.clone(), trails[onto].source_id.clone()],
        });
    }

    // ── Y near-miss: only when nothing else joined the pair ───────────────
    if !crossed && !t_found {
        let ca = closest_approach(&a.geometry, &b.geometry)?;
        if ca.distance_deg > 0.0 && ca.distance_deg <= tau {
            let endpointish = |p: Coord3, ends: &[Coord3; 2]| {
                ends.iter().any(|&e| p.planar_dist_deg(e) <= tau)
            };
            // Both sides at endpoints → fused territory, not a Y.
            if !(endpointish(ca.point_a, &end_pos[i]) && endpointish(ca.point_b, &end_pos[j])) {
                let mid = Coord3::xy(
                    (ca.point_a.lon + ca.point_b.lon) / 2.0,
                    (ca.point_a.lat + ca.point_b.lat) / 2.0,
                );
                out.push(Candidate {
                    point:      mid,
                    kind:       IntersectionKind::NearApproach,
                    distance_m: distance_m(ca.point_a, mid),
                    cuts:       vec![(a.id, ca.ratio_a), (b.id, ca.ratio_b)],
                    snaps:      Vec::new(),
                    involved:   vec![a.source_id.clone(), b.source_id.clone()],
                });
            }
        }
    }

    Ok(out)
}
