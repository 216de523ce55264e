//! The `Polyline` container: an ordered sequence of 3D coordinates.
//!
//! `Polyline` is deliberately a dumb container.  Everything that measures,
//! cuts, projects, or validates lives in the `tn-geom` kernel so that no
//! coordinate loops leak into application code.

use crate::geo::{BBox, Coord3};

/// An ordered coordinate sequence.  A valid trail geometry has at least two
/// distinct vertices; emptiness and degeneracy are checked by the kernel, not
/// by this type.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    pub coords: Vec<Coord3>,
}

impl Polyline {
    #[inline]
    pub fn new(coords: Vec<Coord3>) -> Self {
        Self { coords }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// First vertex.  Callers must have established non-emptiness (the
    /// normalizer rejects empty geometries before anything else runs).
    #[inline]
    pub fn start(&self) -> Coord3 {
        self.coords[0]
    }

    /// Last vertex.  Same precondition as [`start`](Self::start).
    #[inline]
    pub fn end(&self) -> Coord3 {
        self.coords[self.coords.len() - 1]
    }

    /// Tight planar bounding box, `None` for an empty sequence.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_coords(self.coords.iter().copied())
    }

    /// Planar length in degrees — the topology-side measure used for
    /// fractional positions.  Meter lengths are geodesic and live in
    /// `tn-geom`.
    pub fn planar_len_deg(&self) -> f64 {
        self.segments().map(|(a, b)| a.planar_dist_deg(b)).sum()
    }

    /// Iterator over consecutive vertex pairs.
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = (Coord3, Coord3)> + '_ {
        self.coords.windows(2).map(|w| (w[0], w[1]))
    }

    /// A copy with the vertex order reversed.
    pub fn reversed(&self) -> Polyline {
        let mut coords = self.coords.clone();
        coords.reverse();
        Polyline { coords }
    }

    /// Start and end occupy the same planar position.
    #[inline]
    pub fn is_closed_2d(&self) -> bool {
        self.coords.len() >= 2 && self.start().same_position(self.end())
    }
}

impl From<Vec<Coord3>> for Polyline {
    fn from(coords: Vec<Coord3>) -> Self {
        Polyline { coords }
    }
}
