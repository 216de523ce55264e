//! The splitter: apply endpoint snaps, cut trails at accepted positions,
//! and emit provenance-carrying fragments.
//!
//! Cut positions arrive as fractions of the original trail; segments shorter
//! than the minimum length floor are never produced — a cut that would
//! create one is refused (and counted), fusing the micro-span into its
//! neighbor.  Endpoint snaps are vertex-set operations: only the terminal
//! vertex moves, every other vertex of the polyline stays put.

use rustc_hash::FxHashMap;

use tn_core::{NetworkConfig, Polyline, SegmentId, SplitSegment, Trail, TrailId, grid_key};
use tn_geom::{length_m, substring};

use crate::detect::{CutPoint, DetectorOutput, TrailEnd};
use crate::error::DetectResult;
use crate::normalize::collapse_duplicates;

/// Result of the split stage.
#[derive(Debug, Default)]
pub struct SplitOutcome {
    pub segments: Vec<SplitSegment>,
    /// Cuts refused because they would have produced a sub-floor sliver.
    pub refused_cuts: usize,
    /// Trails that passed through uncut.
    pub unsplit_trails: usize,
}

/// Split every trail at its accepted cut positions.
pub fn split(
    trails: &[Trail],
    detection: &DetectorOutput,
    cfg: &NetworkConfig,
) -> DetectResult<SplitOutcome> {
    // Last snap wins per endpoint: acceptance order is deterministic, and a
    // later merge re-targets earlier snaps to the accepted point.
    let mut snap_to: FxHashMap<(TrailId, TrailEnd), tn_core::Coord3> = FxHashMap::default();
    for s in &detection.snaps {
        snap_to.insert((s.trail, s.end), s.to);
    }

    let mut out = SplitOutcome::default();

    for trail in trails {
        // ── Apply endpoint snaps (2D only, elevation kept) ────────────────
        let mut geometry = trail.geometry.clone();
        if let Some(&to) = snap_to.get(&(trail.id, TrailEnd::Start)) {
            let ele = geometry.coords[0].ele;
            geometry.coords[0] = tn_core::Coord3::new(to.lon, to.lat, ele);
        }
        if let Some(&to) = snap_to.get(&(trail.id, TrailEnd::End)) {
            let last = geometry.vertex_count() - 1;
            let ele = geometry.coords[last].ele;
            geometry.coords[last] = tn_core::Coord3::new(to.lon, to.lat, ele);
        }
        geometry = collapse_duplicates(&geometry, cfg.grid_cell_deg);
        let trail_len_m = length_m(&geometry)?;

        // ── Order and filter cuts ─────────────────────────────────────────
        let mut cuts: Vec<CutPoint> = detection.cuts[trail.id.index()].clone();
        cuts.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));

        let dedup_cell = cfg.dedup_cell_deg();
        let mut kept: Vec<CutPoint> = Vec::with_capacity(cuts.len());
        let mut prev_ratio = 0.0f64;
        for cut in cuts {
            // Same accepted point twice on one trail (e.g. a crossing and a
            // T landing together) collapses to one cut.
            if let Some(last) = kept.last()
                && grid_key(last.point, dedup_cell) == grid_key(cut.point, dedup_cell)
            {
                continue;
            }
            let from_prev_m = (cut.ratio - prev_ratio) * trail_len_m;
            let to_end_m = (1.0 - cut.ratio) * trail_len_m;
            if from_prev_m < cfg.min_segment_length_m || to_end_m < cfg.min_segment_length_m {
                out.refused_cuts += 1;
                log::debug!(
                    "trail `{}`: cut at ratio {:.4} refused (sliver floor)",
                    trail.source_id,
                    cut.ratio
                );
                continue;
            }
            prev_ratio = cut.ratio;
            kept.push(cut);
        }

        // ── Emit fragments ────────────────────────────────────────────────
        if kept.is_empty() {
            out.unsplit_trails += 1;
            let id = out.segments.len();
            out.segments
                .push(make_segment(trail, id, 1, geometry.clone(), 0.0, 1.0, trail_len_m));
            continue;
        }

        let mut bounds = vec![0.0f64];
        bounds.extend(kept.iter().map(|c| c.ratio));
        bounds.push(1.0);

        for k in 0..bounds.len() - 1 {
            let mut piece = substring(&geometry, bounds[k], bounds[k + 1], 0.0)?;

            // Cut vertices take the canonical shared coordinate so every
            // trail meeting there lands on the same future node.
            if k > 0 {
                let p = kept[k - 1].point;
                let ele = piece.coords[0].ele;
                piece.coords[0] = tn_core::Coord3::new(p.lon, p.lat, ele);
            }
            if k < kept.len() {
                let p = kept[k].point;
                let last = piece.vertex_count() - 1;
                let ele = piece.coords[last].ele;
                piece.coords[last] = tn_core::Coord3::new(p.lon, p.lat, ele);
            }
            let piece = collapse_duplicates(&piece, cfg.grid_cell_deg);
            let len = length_m(&piece)?;
            let id = out.segments.len();
            out.segments.push(make_segment(
                trail,
                id,
                (k + 1) as u32,
                piece,
                bounds[k],
                bounds[k + 1],
                len,
            ));
        }
    }

    log::info!(
        "split: {} segments from {} trails ({} uncut, {} cuts refused)",
        out.segments.len(),
        trails.len(),
        out.unsplit_trails,
        out.refused_cuts
    );
    Ok(out)
}

fn make_segment(
    trail: &Trail,
    id: usize,
    segment_index: u32,
    geometry: Polyline,
    start_ratio: f64,
    end_ratio: f64,
    length_m: f64,
) -> SplitSegment {
    SplitSegment {
        id: SegmentId(id as u32),
        origin: trail.id,
        origin_source_id: trail.source_id.clone(),
        part: trail.part,
        segment_index,
        source: trail.source.clone(),
        attrs: trail.attrs.clone(),
        geometry,
        start_ratio,
        end_ratio,
        length_m,
    }
}
