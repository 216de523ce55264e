//! Geographic coordinate primitives and planar helpers.
//!
//! # Coordinate model
//!
//! All coordinates are WGS-84 longitude/latitude in decimal degrees with an
//! elevation carried as a passive third ordinate.  `Coord3` uses `f64`: the
//! topology snap cell (1e-6 deg ≈ 0.1 m) sits below single-precision
//! resolution at earth scale, so f32 would fold distinct vertices together.
//!
//! Topological decisions (equality, grid identity, closeness) happen in the
//! planar lon/lat space; all *lengths* in meters are geodesic and live in
//! `tn-geom`.

use std::fmt;

/// Two coordinates closer than this on both axes are the same position.
/// 1e-7 degrees is roughly a centimetre at the equator.
pub const COORD_EPS_DEG: f64 = 1e-7;

/// Length of one degree of arc at the equator, in meters.  Used to express
/// meter tolerances as angular quantities for planar comparisons.
pub const METERS_PER_DEGREE: f64 = 111_319.9;

/// Convert a planar tolerance in meters to decimal degrees.
#[inline]
pub fn meters_to_degrees(m: f64) -> f64 {
    m / METERS_PER_DEGREE
}

/// Convert a planar degree quantity to approximate meters.
#[inline]
pub fn degrees_to_meters(d: f64) -> f64 {
    d * METERS_PER_DEGREE
}

// ── Coord3 ────────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate: longitude, latitude, elevation (meters).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord3 {
    pub lon: f64,
    pub lat: f64,
    pub ele: f64,
}

impl Coord3 {
    #[inline]
    pub fn new(lon: f64, lat: f64, ele: f64) -> Self {
        Self { lon, lat, ele }
    }

    /// A coordinate with zero elevation — for 2D-only points such as
    /// intersection candidates.
    #[inline]
    pub fn xy(lon: f64, lat: f64) -> Self {
        Self { lon, lat, ele: 0.0 }
    }

    /// True when both planar ordinates are within [`COORD_EPS_DEG`].
    /// Elevation is ignored: it is not a topological dimension.
    #[inline]
    pub fn same_position(self, other: Coord3) -> bool {
        (self.lon - other.lon).abs() < COORD_EPS_DEG
            && (self.lat - other.lat).abs() < COORD_EPS_DEG
    }

    /// Planar Euclidean distance in degrees.  Only meaningful for tolerance
    /// comparisons; never report this to users as a length.
    #[inline]
    pub fn planar_dist_deg(self, other: Coord3) -> f64 {
        (self.lon - other.lon).hypot(self.lat - other.lat)
    }

    /// Both planar ordinates are finite (elevation may still be NaN on raw
    /// input; the normalizer repairs it).
    #[inline]
    pub fn is_finite_2d(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl fmt::Display for Coord3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lon, self.lat)
    }
}

// ── Grid quantization ─────────────────────────────────────────────────────────

/// Quantize a coordinate to a regular grid of `cell` degrees.  Two coordinates
/// share a key iff they snap to the same cell center.
#[inline]
pub fn grid_key(c: Coord3, cell: f64) -> (i64, i64) {
    ((c.lon / cell).round() as i64, (c.lat / cell).round() as i64)
}

/// The canonical coordinate of a grid cell: the quantized position with the
/// input's elevation carried through.
#[inline]
pub fn snap_coord(c: Coord3, cell: f64) -> Coord3 {
    Coord3 {
        lon: (c.lon / cell).round() * cell,
        lat: (c.lat / cell).round() * cell,
        ele: c.ele,
    }
}

// ── BBox ──────────────────────────────────────────────────────────────────────

/// Planar axis-aligned bounding box in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    /// Tight box around a non-empty coordinate sequence.  `None` when the
    /// iterator is empty.
    pub fn from_coords<I: IntoIterator<Item = Coord3>>(coords: I) -> Option<BBox> {
        let mut it = coords.into_iter();
        let first = it.next()?;
        let mut b = BBox {
            min_lon: first.lon,
            min_lat: first.lat,
            max_lon: first.lon,
            max_lat: first.lat,
        };
        for c in it {
            b.min_lon = b.min_lon.min(c.lon);
            b.min_lat = b.min_lat.min(c.lat);
            b.max_lon = b.max_lon.max(c.lon);
            b.max_lat = b.max_lat.max(c.lat);
        }
        Some(b)
    }

    /// Grow the box by `margin` degrees on every side.
    #[inline]
    pub fn expanded(self, margin: f64) -> BBox {
        BBox {
            min_lon: self.min_lon - margin,
            min_lat: self.min_lat - margin,
            max_lon: self.max_lon + margin,
            max_lat: self.max_lat + margin,
        }
    }

    /// Closed-interval overlap test.
    #[inline]
    pub fn intersects(self, other: BBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }

    #[inline]
    pub fn contains(self, c: Coord3) -> bool {
        c.lon >= self.min_lon
            && c.lon <= self.max_lon
            && c.lat >= self.min_lat
            && c.lat <= self.max_lat
    }
}
