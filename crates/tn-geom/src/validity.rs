//! Polyline well-formedness and simplicity checks.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Coord, Line};

use tn_core::Polyline;

use crate::error::{GeomError, GeomResult};

/// Check structural validity: at least two vertices, all planar ordinates
/// finite, at least two distinct positions.
///
/// # Errors
///
/// The first failure found, as a [`GeomError`].
pub fn check_valid(poly: &Polyline) -> GeomResult<()> {
    if poly.vertex_count() < 2 {
        return Err(GeomError::TooFewPoints(poly.vertex_count()));
    }
    for (i, c) in poly.coords.iter().enumerate() {
        if !c.is_finite_2d() {
            return Err(GeomError::NonFinite(i));
        }
    }
    if poly.planar_len_deg() == 0.0 {
        return Err(GeomError::ZeroLength);
    }
    Ok(())
}

/// Convenience boolean form of [`check_valid`].
pub fn is_valid(poly: &Polyline) -> bool {
    check_valid(poly).is_ok()
}

/// True when the polyline has no self-intersection.
///
/// Adjacent segments may touch only at their shared vertex; non-adjacent
/// segments may not meet at all — except the first and last segments of a
/// closed ring, which share the closure vertex.
pub fn is_simple(poly: &Polyline) -> bool {
    let n = poly.vertex_count();
    if n < 3 {
        return true;
    }
    let closed = poly.is_closed_2d();
    let segs: Vec<Line<f64>> = poly
        .segments()
        .map(|(a, b)| {
            Line::new(
                Coord { x: a.lon, y: a.lat },
                Coord { x: b.lon, y: b.lat },
            )
        })
        .collect();

    for i in 0..segs.len() {
        for j in (i + 1)..segs.len() {
            let adjacent = j == i + 1;
            let ring_closure = closed && i == 0 && j == segs.len() - 1;
            match line_intersection(segs[i], segs[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return false,
                Some(LineIntersection::SinglePoint { is_proper, .. }) => {
                    if is_proper {
                        return false;
                    }
                    // Improper touch: fine for neighbors at the shared
                    // vertex and for the ring closure, a defect otherwise.
                    if !adjacent && !ring_closure {
                        return false;
                    }
                }
            }
        }
    }
    true
}
