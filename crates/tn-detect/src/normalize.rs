//! Trail normalization: make the raw trail set safe for planar topology.
//!
//! Steps, in order (idempotent as a whole — a second run is a no-op):
//!
//! 1. Flatten multi-part rows into one trail per contiguous part; drop
//!    non-linear geometry with a counted reason.
//! 2. Collapse consecutive duplicate / near-zero vertices within the grid
//!    cell tolerance.
//! 3. Force 2D topology: planar ordinates must be finite; elevation is made
//!    finite (0.0 for missing/NaN) and otherwise carried untouched.
//! 4. Simplify trails above the vertex threshold at the grid cell tolerance
//!    (short spurs are left alone).
//! 5. Drop trails below the minimum segment length, with counted reason.
//! 6. Recompute geodesic length; bbox and endpoints derive from geometry.

use std::fmt;

use tn_core::{Coord3, NetworkConfig, Polyline, RawGeometry, RawTrail, Trail, TrailId};
use tn_geom::{force_2d_keepz, length_m, simplify_keepz};

// ── Reject taxonomy ───────────────────────────────────────────────────────────

/// Why a raw row (or flattened part) was dropped.  InputError class:
/// reported per-row, the pipeline continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Geometry type is not linear (carries the type name).
    NonLinear(String),
    /// Fewer than two distinct vertices after duplicate collapse.
    Degenerate,
    /// A planar ordinate is NaN or infinite.
    NonFinite,
    /// 2D geodesic length under `min_segment_length_m`.
    TooShort,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NonLinear(t) => write!(f, "non-linear geometry `{t}`"),
            DropReason::Degenerate   => f.write_str("degenerate geometry"),
            DropReason::NonFinite    => f.write_str("non-finite coordinate"),
            DropReason::TooShort     => f.write_str("below minimum length"),
        }
    }
}

/// One rejected row, keyed by its origin identifier.
#[derive(Clone, Debug)]
pub struct Reject {
    pub source_id: String,
    pub reason:    DropReason,
}

/// Result of a normalization pass.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub trails:  Vec<Trail>,
    pub rejects: Vec<Reject>,
    /// Count of extra trails produced by flattening multi-part rows.
    pub flattened_parts: usize,
}

// ── Pass ──────────────────────────────────────────────────────────────────────

/// Normalize a batch of raw rows into working trails with ascending
/// [`TrailId`]s.
pub fn normalize(rows: &[RawTrail], cfg: &NetworkConfig) -> NormalizeOutcome {
    let mut out = NormalizeOutcome::default();

    for row in rows {
        let parts: Vec<(u32, &Polyline)> = match &row.geometry {
            RawGeometry::LineString(p) => vec![(0, p)],
            RawGeometry::MultiLineString(ps) => {
                if ps.len() > 1 {
                    out.flattened_parts += ps.len() - 1;
                }
                ps.iter()
                    .enumerate()
                    .map(|(i, p)| (i as u32, p))
                    .collect()
            }
            RawGeometry::Other(type_name) => {
                out.rejects.push(Reject {
                    source_id: row.source_id.clone(),
                    reason:    DropReason::NonLinear(type_name.clone()),
                });
                continue;
            }
        };

        for (part, geometry) in parts {
            match normalize_part(geometry, cfg) {
                Ok((geometry, len_m)) => {
                    let id = TrailId(out.trails.len() as u32);
                    out.trails.push(Trail {
                        id,
                        source_id: row.source_id.clone(),
                        source:    row.source.clone(),
                        part,
                        attrs:     row.attrs.clone(),
                        geometry,
                        length_m:  len_m,
                    });
                }
                Err(reason) => {
                    log::debug!("trail `{}` part {part} dropped: {reason}", row.source_id);
                    out.rejects.push(Reject {
                        source_id: row.source_id.clone(),
                        reason,
                    });
                }
            }
        }
    }

    log::info!(
        "normalize: {} trails kept, {} rejected, {} parts flattened",
        out.trails.len(),
        out.rejects.len(),
        out.flattened_parts
    );
    out
}

/// Normalize one contiguous part; `Err` carries the drop reason.
fn normalize_part(poly: &Polyline, cfg: &NetworkConfig) -> Result<(Polyline, f64), DropReason> {
    if poly.coords.iter().any(|c| !c.is_finite_2d()) {
        return Err(DropReason::NonFinite);
    }

    let mut geometry = collapse_duplicates(poly, cfg.grid_cell_deg);
    if geometry.vertex_count() < 2 {
        return Err(DropReason::Degenerate);
    }

    geometry = force_2d_keepz(&geometry);

    if geometry.vertex_count() > cfg.simplify_vertex_threshold {
        geometry = simplify_keepz(&geometry, cfg.grid_cell_deg);
    }

    let len_m = length_m(&geometry).map_err(|_| DropReason::Degenerate)?;
    if len_m < cfg.min_segment_length_m {
        return Err(DropReason::TooShort);
    }
    Ok((geometry, len_m))
}

/// Collapse near-duplicate vertices closer than `cell_deg` (planar).  Both
/// endpoints always survive; an interior vertex is kept only when it sits at
/// least a cell away from the previously kept vertex *and* from the final
/// endpoint.  Unlike a grid snap this never moves a surviving vertex, and a
/// second pass keeps exactly the same set.
pub(crate) fn collapse_duplicates(poly: &Polyline, cell_deg: f64) -> Polyline {
    if poly.vertex_count() < 2 {
        return poly.clone();
    }
    let end = poly.end();
    let mut coords: Vec<Coord3> = Vec::with_capacity(poly.vertex_count());
    coords.push(poly.start());
    for &c in &poly.coords[1..poly.vertex_count() - 1] {
        let prev = coords[coords.len() - 1];
        if prev.planar_dist_deg(c) >= cell_deg && c.planar_dist_deg(end) >= cell_deg {
            coords.push(c);
        }
    }
    coords.push(end);
    Polyline::new(coords)
}
