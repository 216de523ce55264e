//! Vertex-retaining Douglas–Peucker simplification.
//!
//! `geo`'s simplifier is strictly 2D; trail vertices carry elevation that
//! must survive, so this implementation works on retained vertex *indices*
//! (the same formulation `geo::SimplifyIdx` exposes) and keeps the original
//! `Coord3`s.  Endpoints are always retained, so topology endpoints never
//! move.

use tn_core::{Coord3, Polyline};

/// Perpendicular planar distance from `p` to the infinite line through
/// `a`–`b`, in degrees.  Degenerate `a == b` falls back to point distance.
fn perpendicular_dist_deg(p: Coord3, a: Coord3, b: Coord3) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return p.planar_dist_deg(a);
    }
    ((p.lon - a.lon) * dy - (p.lat - a.lat) * dx).abs() / len
}

/// Simplify at `epsilon_deg`, preserving elevation and both endpoints.
///
/// Idempotent: every retained vertex deviates by more than `epsilon_deg`
/// from the chord of its neighbors, so a second pass retains the same set.
pub fn simplify_keepz(poly: &Polyline, epsilon_deg: f64) -> Polyline {
    let n = poly.vertex_count();
    if n <= 2 || epsilon_deg <= 0.0 {
        return poly.clone();
    }

    let coords = &poly.coords;
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // Explicit stack instead of recursion: long trails can have tens of
    // thousands of vertices.
    let mut stack = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let mut max_d = 0.0;
        let mut max_i = lo;
        for i in (lo + 1)..hi {
            let d = perpendicular_dist_deg(coords[i], coords[lo], coords[hi]);
            if d > max_d {
                max_d = d;
                max_i = i;
            }
        }
        if max_d > epsilon_deg {
            keep[max_i] = true;
            stack.push((lo, max_i));
            stack.push((max_i, hi));
        }
    }

    Polyline::new(
        coords
            .iter()
            .zip(&keep)
            .filter_map(|(&c, &k)| k.then_some(c))
            .collect(),
    )
}
