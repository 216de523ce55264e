//! Trail rows: raw input, normalized working trails, and split fragments.
//!
//! The staging pipeline never mutates the input store — `RawTrail` rows are
//! copied in, normalized into `Trail`s, and cut into `SplitSegment`s whose
//! provenance always points back at `(origin_source_id, segment_index)`.

use std::fmt;

use crate::geo::Coord3;
use crate::ids::{SegmentId, TrailId};
use crate::polyline::Polyline;

// ── Attributes ────────────────────────────────────────────────────────────────

/// Descriptive attributes carried from the origin dataset.  Free text /
/// dataset enumerations; the pipeline only ever copies and aggregates them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrailAttrs {
    pub name:       String,
    pub surface:    String,
    pub difficulty: String,
    pub trail_type: String,
}

// ── Input rows ────────────────────────────────────────────────────────────────

/// Geometry of a raw source row.  Multi-part rows are flattened by the
/// normalizer; anything non-linear is dropped with a counted reason.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawGeometry {
    LineString(Polyline),
    MultiLineString(Vec<Polyline>),
    /// Any other geometry type, carrying its type name for the reject report.
    Other(String),
}

/// One trail row as pulled from the source store.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTrail {
    /// Opaque stable identifier from the origin dataset.
    pub source_id: String,
    /// Origin dataset tag (the caller selects one per run).
    pub source:    String,
    pub attrs:     TrailAttrs,
    pub geometry:  RawGeometry,
}

// ── Working trails ────────────────────────────────────────────────────────────

/// A normalized working trail: a single LineString with recomputed length.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trail {
    pub id:        TrailId,
    pub source_id: String,
    pub source:    String,
    /// Part index when this trail came out of a flattened multi-part row;
    /// 0 for single-part input.
    pub part:      u32,
    pub attrs:     TrailAttrs,
    pub geometry:  Polyline,
    /// Geodesic 2D length in meters, recomputed by the normalizer.
    pub length_m:  f64,
}

// ── Split fragments ───────────────────────────────────────────────────────────

/// A post-split trail fragment owning a contiguous subrange of its origin.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitSegment {
    pub id:               SegmentId,
    pub origin:           TrailId,
    pub origin_source_id: String,
    pub part:             u32,
    /// 1-based position among the origin trail's fragments.
    pub segment_index:    u32,
    pub source:           String,
    pub attrs:            TrailAttrs,
    pub geometry:         Polyline,
    /// Fractional range of the origin trail covered by this fragment.
    pub start_ratio:      f64,
    pub end_ratio:        f64,
    /// Geodesic 2D length in meters.
    pub length_m:         f64,
}

// ── Intersection candidates ───────────────────────────────────────────────────

/// How two (or more) trails were found to meet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntersectionKind {
    /// The trails properly cross; the candidate is the crossing point.
    ExactCrossing,
    /// One trail's endpoint projects onto another trail's interior within
    /// tolerance (a T event).
    EndpointOnLine,
    /// Near-miss joins: Y midpoints, endpoint fusings, and self-loop closures.
    NearApproach,
}

impl fmt::Display for IntersectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntersectionKind::ExactCrossing  => "exact-crossing",
            IntersectionKind::EndpointOnLine => "endpoint-on-line",
            IntersectionKind::NearApproach   => "near-approach",
        };
        f.write_str(s)
    }
}

/// An accepted 2D location where trails meet or nearly meet.  Diagnostic
/// output of the detector; the splitter consumes the per-trail cut lists.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionPoint {
    pub point: Coord3,
    /// Source IDs of the trails touching this point, sorted and deduplicated.
    /// At least two for inter-trail events; one for self-loop closures.
    pub connected_source_ids: Vec<String>,
    pub kind: IntersectionKind,
    /// Snap distance from the contributing endpoint in meters; 0 for exact
    /// crossings.
    pub distance_m: f64,
}
