//! Geodesic measure on the WGS-84 ellipsoid.
//!
//! Every user-facing length or distance in meters comes from here, via the
//! geographiclib inverse problem.  Planar degree distances are for topology
//! decisions only and live in `tn-core::geo`.

use std::sync::OnceLock;

use geographiclib_rs::{Geodesic, InverseGeodesic};

use tn_core::{Coord3, Polyline};

use crate::error::{GeomError, GeomResult};

/// The shared WGS-84 geodesic.  `Geodesic::wgs84()` computes series
/// coefficients at construction, so it is built once and cached.
fn wgs84() -> &'static Geodesic {
    static G: OnceLock<Geodesic> = OnceLock::new();
    G.get_or_init(Geodesic::wgs84)
}

/// Geodesic distance between two coordinates in meters.  Elevation is
/// ignored: lengths are 2D by contract.
pub fn distance_m(a: Coord3, b: Coord3) -> f64 {
    let s12: f64 = wgs84().inverse(a.lat, a.lon, b.lat, b.lon);
    s12
}

/// Geodesic length of a polyline in meters.
///
/// # Errors
///
/// [`GeomError::TooFewPoints`] when the polyline has fewer than two vertices.
pub fn length_m(poly: &Polyline) -> GeomResult<f64> {
    if poly.vertex_count() < 2 {
        return Err(GeomError::TooFewPoints(poly.vertex_count()));
    }
    Ok(poly.segments().map(|(a, b)| distance_m(a, b)).sum())
}

/// Elevation gain and loss over a polyline, from per-vertex deltas.
/// Non-finite elevations contribute nothing (raw input may carry NaN before
/// normalization).
pub fn elevation_gain_loss(poly: &Polyline) -> (f64, f64) {
    let mut gain = 0.0;
    let mut loss = 0.0;
    for (a, b) in poly.segments() {
        let d = b.ele - a.ele;
        if !d.is_finite() {
            continue;
        }
        if d > 0.0 {
            gain += d;
        } else {
            loss += -d;
        }
    }
    (gain, loss)
}
