//! Polyline operations: projection, interpolation, substring, split, snap,
//! and pairwise proximity.
//!
//! # Ratio semantics
//!
//! A fractional position `ratio ∈ [0, 1]` on a polyline is a fraction of its
//! cumulative *planar* 2D length.  Planar fractions keep split arithmetic
//! exact and commutative; meter quantities are always geodesic
//! ([`crate::geodesic`]).  Elevation is interpolated linearly within a
//! segment and otherwise carried untouched.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};

use tn_core::{Coord3, Polyline, snap_coord};

use crate::error::{GeomError, GeomResult};
use crate::geodesic;

// ── Small planar helpers ──────────────────────────────────────────────────────

#[inline]
fn lerp(a: Coord3, b: Coord3, t: f64) -> Coord3 {
    Coord3 {
        lon: a.lon + (b.lon - a.lon) * t,
        lat: a.lat + (b.lat - a.lat) * t,
        ele: a.ele + (b.ele - a.ele) * t,
    }
}

/// Closest point on segment `ab` to `p`: returns (point, parameter t, planar
/// distance in degrees).
fn project_on_segment(p: Coord3, a: Coord3, b: Coord3) -> (Coord3, f64, f64) {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (a, 0.0, p.planar_dist_deg(a));
    }
    let t = (((p.lon - a.lon) * dx + (p.lat - a.lat) * dy) / len2).clamp(0.0, 1.0);
    let q = lerp(a, b, t);
    (q, t, p.planar_dist_deg(q))
}

#[inline]
fn to_line(a: Coord3, b: Coord3) -> Line<f64> {
    Line::new(
        Coord { x: a.lon, y: a.lat },
        Coord { x: b.lon, y: b.lat },
    )
}

fn require_measurable(poly: &Polyline) -> GeomResult<f64> {
    if poly.vertex_count() < 2 {
        return Err(GeomError::TooFewPoints(poly.vertex_count()));
    }
    let total = poly.planar_len_deg();
    if total == 0.0 {
        return Err(GeomError::ZeroLength);
    }
    Ok(total)
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Result of projecting a point onto a polyline.
#[derive(Copy, Clone, Debug)]
pub struct Projection {
    /// Nearest point on the polyline, elevation interpolated.
    pub point: Coord3,
    /// Fractional position of that point along the polyline.
    pub ratio: f64,
    /// Planar distance from the query point, in degrees.
    pub distance_deg: f64,
}

/// Project `p` onto `poly` and return the nearest point, its fractional
/// position, and the planar distance.
///
/// # Errors
///
/// [`GeomError::TooFewPoints`] / [`GeomError::ZeroLength`] on degenerate
/// input.
pub fn closest_point_on(poly: &Polyline, p: Coord3) -> GeomResult<Projection> {
    let total = require_measurable(poly)?;

    let mut best = Projection {
        point: poly.start(),
        ratio: 0.0,
        distance_deg: f64::INFINITY,
    };
    let mut cum = 0.0;
    for (a, b) in poly.segments() {
        let seg_len = a.planar_dist_deg(b);
        let (q, t, d) = project_on_segment(p, a, b);
        if d < best.distance_deg {
            best = Projection {
                point: q,
                ratio: (cum + t * seg_len) / total,
                distance_deg: d,
            };
        }
        cum += seg_len;
    }
    Ok(best)
}

/// Planar point-to-polyline distance in degrees.
pub fn distance_point_deg(poly: &Polyline, p: Coord3) -> GeomResult<f64> {
    Ok(closest_point_on(poly, p)?.distance_deg)
}

/// Geodesic distance in meters from `p` to its projection on `poly`.
pub fn snap_distance_m(poly: &Polyline, p: Coord3) -> GeomResult<f64> {
    let proj = closest_point_on(poly, p)?;
    Ok(geodesic::distance_m(p, proj.point))
}

// ── Interpolation and substring ───────────────────────────────────────────────

/// The point at fractional position `ratio` (clamped to `[0, 1]`).
pub fn point_at(poly: &Polyline, ratio: f64) -> GeomResult<Coord3> {
    let total = require_measurable(poly)?;
    let target = ratio.clamp(0.0, 1.0) * total;

    let mut cum = 0.0;
    for (a, b) in poly.segments() {
        let seg_len = a.planar_dist_deg(b);
        if seg_len > 0.0 && cum + seg_len >= target {
            let t = ((target - cum) / seg_len).clamp(0.0, 1.0);
            return Ok(lerp(a, b, t));
        }
        cum += seg_len;
    }
    Ok(poly.end())
}

/// The contiguous sub-polyline covering `[r1, r2]`.
///
/// Interior vertices are preserved; the cut ends are interpolated.
///
/// # Errors
///
/// - [`GeomError::BadRange`] unless `0 ≤ r1 < r2 ≤ 1`.
/// - [`GeomError::BelowMinimumLength`] when the result's geodesic length is
///   under `min_len_m` (pass 0.0 to disable the floor).
pub fn substring(poly: &Polyline, r1: f64, r2: f64, min_len_m: f64) -> GeomResult<Polyline> {
    if !(0.0..=1.0).contains(&r1) || !(0.0..=1.0).contains(&r2) || r1 >= r2 {
        return Err(GeomError::BadRange { r1, r2 });
    }
    let total = require_measurable(poly)?;
    let (d1, d2) = (r1 * total, r2 * total);

    let mut coords: Vec<Coord3> = Vec::new();
    let mut push = |c: Coord3| {
        if coords.last().is_none_or(|&last| !last.same_position(c)) {
            coords.push(c);
        }
    };

    let mut cum = 0.0;
    for (a, b) in poly.segments() {
        let seg_len = a.planar_dist_deg(b);
        let (seg_start, seg_end) = (cum, cum + seg_len);

        if seg_len > 0.0 && seg_end >= d1 && seg_start <= d2 {
            let t1 = ((d1 - seg_start) / seg_len).clamp(0.0, 1.0);
            let t2 = ((d2 - seg_start) / seg_len).clamp(0.0, 1.0);
            push(lerp(a, b, t1));
            if t2 > t1 {
                push(lerp(a, b, t2));
            }
        }
        cum = seg_end;
    }

    // A cut falling exactly on a shared vertex leaves a single coordinate.
    if coords.len() < 2 {
        return Err(GeomError::ZeroLength);
    }
    let out = Polyline::new(coords);
    if min_len_m > 0.0 {
        let got_m = geodesic::length_m(&out)?;
        if got_m < min_len_m {
            return Err(GeomError::BelowMinimumLength { got_m, min_m: min_len_m });
        }
    }
    Ok(out)
}

/// Split a polyline at the given fractional positions, in natural order.
///
/// Positions outside `[eps, 1-eps]` are ignored, as are positions closer
/// than `eps` to one another.  The concatenation of the result covers the
/// whole polyline: planar lengths sum to the original.
pub fn split_at(poly: &Polyline, ratios: &[f64], eps: f64) -> GeomResult<Vec<Polyline>> {
    let mut rs: Vec<f64> = ratios
        .iter()
        .copied()
        .filter(|r| *r >= eps && *r <= 1.0 - eps)
        .collect();
    rs.sort_by(|a, b| a.total_cmp(b));
    rs.dedup_by(|a, b| (*a - *b).abs() < eps);

    if rs.is_empty() {
        return Ok(vec![poly.clone()]);
    }

    let mut parts = Vec::with_capacity(rs.len() + 1);
    let mut prev = 0.0;
    for r in rs {
        parts.push(substring(poly, prev, r, 0.0)?);
        prev = r;
    }
    parts.push(substring(poly, prev, 1.0, 0.0)?);
    Ok(parts)
}

// ── 2D forcing ────────────────────────────────────────────────────────────────

/// Force 2D topology while keeping elevation for provenance: planar
/// ordinates are untouched, and any non-finite elevation becomes 0.0 so
/// downstream gain/loss sums are well-defined.
pub fn force_2d_keepz(poly: &Polyline) -> Polyline {
    let coords = poly
        .coords
        .iter()
        .map(|c| Coord3 {
            ele: if c.ele.is_finite() { c.ele } else { 0.0 },
            ..*c
        })
        .collect();
    Polyline::new(coords)
}

// ── Grid snap ─────────────────────────────────────────────────────────────────

/// Quantize every vertex to a regular grid of `cell` degrees, preserving
/// vertex order and collapsing consecutive duplicates.  The first elevation
/// of a collapsed run survives.
pub fn snap_to_grid(poly: &Polyline, cell: f64) -> Polyline {
    let mut coords: Vec<Coord3> = Vec::with_capacity(poly.vertex_count());
    for &c in &poly.coords {
        let s = snap_coord(c, cell);
        if coords.last().is_none_or(|&last| !last.same_position(s)) {
            coords.push(s);
        }
    }
    Polyline::new(coords)
}

// ── Pairwise proximity ────────────────────────────────────────────────────────

/// Closest approach between two polylines.
#[derive(Copy, Clone, Debug)]
pub struct ClosestApproach {
    pub point_a: Coord3,
    pub ratio_a: f64,
    pub point_b: Coord3,
    pub ratio_b: f64,
    /// Planar gap in degrees; 0 when the polylines touch or cross.
    pub distance_deg: f64,
}

/// Find the closest pair of points between `a` and `b`.
///
/// Quadratic in segment counts; callers prune pairs by bounding box first.
pub fn closest_approach(a: &Polyline, b: &Polyline) -> GeomResult<ClosestApproach> {
    let total_a = require_measurable(a)?;
    let total_b = require_measurable(b)?;

    let mut best = ClosestApproach {
        point_a: a.start(),
        ratio_a: 0.0,
        point_b: b.start(),
        ratio_b: 0.0,
        distance_deg: f64::INFINITY,
    };

    let mut cum_a = 0.0;
    for (a0, a1) in a.segments() {
        let len_a = a0.planar_dist_deg(a1);
        let mut cum_b = 0.0;
        for (b0, b1) in b.segments() {
            let len_b = b0.planar_dist_deg(b1);

            // Crossing segments have distance zero at the crossing point.
            if let Some(LineIntersection::SinglePoint { intersection, .. }) =
                line_intersection(to_line(a0, a1), to_line(b0, b1))
            {
                let p = Coord3::xy(intersection.x, intersection.y);
                let (qa, ta, _) = project_on_segment(p, a0, a1);
                let (qb, tb, _) = project_on_segment(p, b0, b1);
                return Ok(ClosestApproach {
                    point_a: qa,
                    ratio_a: (cum_a + ta * len_a) / total_a,
                    point_b: qb,
                    ratio_b: (cum_b + tb * len_b) / total_b,
                    distance_deg: 0.0,
                });
            }

            // Non-crossing: the minimum is attained at an endpoint of one
            // segment projected onto the other.
            let candidates = [
                (project_on_segment(b0, a0, a1), true, 0.0),
                (project_on_segment(b1, a0, a1), true, 1.0),
                (project_on_segment(a0, b0, b1), false, 0.0),
                (project_on_segment(a1, b0, b1), false, 1.0),
            ];
            for ((q, t, d), on_a, other_t) in candidates {
                if d < best.distance_deg {
                    best = if on_a {
                        let pb = lerp(b0, b1, other_t);
                        ClosestApproach {
                            point_a: q,
                            ratio_a: (cum_a + t * len_a) / total_a,
                            point_b: pb,
                            ratio_b: (cum_b + other_t * len_b) / total_b,
                            distance_deg: d,
                        }
                    } else {
                        let pa = lerp(a0, a1, other_t);
                        ClosestApproach {
                            point_a: pa,
                            ratio_a: (cum_a + other_t * len_a) / total_a,
                            point_b: q,
                            ratio_b: (cum_b + t * len_b) / total_b,
                            distance_deg: d,
                        }
                    };
                }
            }
            cum_b += len_b;
        }
        cum_a += len_a;
    }
    Ok(best)
}

// ── Crossings ─────────────────────────────────────────────────────────────────

/// One point where two polylines cross.
#[derive(Copy, Clone, Debug)]
pub struct Crossing {
    pub point:   Coord3,
    pub ratio_a: f64,
    pub ratio_b: f64,
    /// True for a proper interior crossing; false when the meeting point is a
    /// vertex of either polyline (handled by node coincidence, not splitting).
    pub proper:  bool,
}

/// All point-intersections between `a` and `b`, in `a`-traversal order.
///
/// Collinear overlap spans contribute nothing: the intersection keeps point
/// components only.
pub fn crossings(a: &Polyline, b: &Polyline) -> GeomResult<Vec<Crossing>> {
    let total_a = require_measurable(a)?;
    let total_b = require_measurable(b)?;

    let mut out = Vec::new();
    let mut cum_a = 0.0;
    for (a0, a1) in a.segments() {
        let len_a = a0.planar_dist_deg(a1);
        let mut cum_b = 0.0;
        for (b0, b1) in b.segments() {
            let len_b = b0.planar_dist_deg(b1);
            match line_intersection(to_line(a0, a1), to_line(b0, b1)) {
                Some(LineIntersection::SinglePoint {
                    intersection,
                    is_proper,
                }) => {
                    let p2 = Coord3::xy(intersection.x, intersection.y);
                    let (pa, ta, _) = project_on_segment(p2, a0, a1);
                    let (_, tb, _) = project_on_segment(p2, b0, b1);
                    out.push(Crossing {
                        point: pa,
                        ratio_a: (cum_a + ta * len_a) / total_a,
                        ratio_b: (cum_b + tb * len_b) / total_b,
                        proper: is_proper,
                    });
                }
                Some(LineIntersection::Collinear { .. }) | None => {}
            }
            cum_b += len_b;
        }
        cum_a += len_a;
    }
    out.sort_by(|x, y| x.ratio_a.total_cmp(&y.ratio_a));
    Ok(out)
}
