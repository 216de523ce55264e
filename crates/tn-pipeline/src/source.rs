//! The `TrailSource` pull interface and the in-memory implementation.
//!
//! The spatial store (or any regional dataset adapter) sits behind this
//! trait; the core never sees its transport.  Sources are read-only — the
//! pipeline copies rows into its workspace and never writes back.

use tn_core::{BBox, RawGeometry, RawTrail};

/// Pull interface supplying trail rows for a bounding box and source tag.
pub trait TrailSource {
    /// How many rows `stream` would yield for this query.
    fn count(&self, bbox: BBox, source: &str) -> u64;

    /// Stream matching rows.  Order must be stable for a given query so
    /// pipeline runs are reproducible.
    fn stream(&self, bbox: BBox, source: &str) -> Box<dyn Iterator<Item = RawTrail> + '_>;
}

/// A source backed by a row vector; used by tests and by callers that stage
/// trails in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: Vec<RawTrail>,
}

impl MemorySource {
    pub fn new(rows: Vec<RawTrail>) -> Self {
        Self { rows }
    }

    fn matches(row: &RawTrail, bbox: BBox, source: &str) -> bool {
        if row.source != source {
            return false;
        }
        // Rows whose bbox cannot be derived (non-linear geometry) pass the
        // filter so the normalizer can reject them with a counted reason.
        match &row.geometry {
            RawGeometry::LineString(p) => p.bbox().is_none_or(|b| b.intersects(bbox)),
            RawGeometry::MultiLineString(ps) => ps
                .iter()
                .filter_map(|p| p.bbox())
                .any(|b| b.intersects(bbox)),
            RawGeometry::Other(_) => true,
        }
    }
}

impl TrailSource for MemorySource {
    fn count(&self, bbox: BBox, source: &str) -> u64 {
        self.rows
            .iter()
            .filter(|r| Self::matches(r, bbox, source))
            .count() as u64
    }

    fn stream(&self, bbox: BBox, source: &str) -> Box<dyn Iterator<Item = RawTrail> + '_> {
        let source = source.to_string();
        Box::new(
            self.rows
                .iter()
                .filter(move |r| Self::matches(r, bbox, &source))
                .cloned(),
        )
    }
}
