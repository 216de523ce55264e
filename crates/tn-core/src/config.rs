//! Pipeline configuration.
//!
//! All tolerances are plain fields with documented defaults; `validate()`
//! runs once at pipeline start and any out-of-range value is fatal (the
//! ToleranceError class — nothing downstream is allowed to see a bad
//! tolerance).

use crate::error::{CoreError, CoreResult};
use crate::geo::meters_to_degrees;

/// Configuration record for one network-building run.
///
/// Typically constructed with [`NetworkConfig::default`] plus field updates,
/// or loaded from TOML/JSON by the application (enable the `serde` feature).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    /// Detection tolerance τ in meters: the maximum planar distance at which
    /// distinct geometries are considered to meet.  Default: 3.0.
    pub intersection_tolerance_m: f64,

    /// Segments shorter than this are never produced; a cut that would create
    /// one is refused.  Default: 1.0.
    pub min_segment_length_m: f64,

    /// Topology snap cell in degrees.  Endpoints within the same cell become
    /// the same node.  Default: 1e-6 (≈ 0.1 m).
    pub grid_cell_deg: f64,

    /// Secondary dedup grid for intersection candidates, as a fraction of τ.
    /// Default: 0.01.
    pub dedup_tolerance_frac: f64,

    /// Candidate cut positions must lie in `[ε, 1-ε]` of the visited trail.
    /// Default: 0.001.
    pub split_ratio_epsilon: f64,

    /// Cap on degree-2 merge passes.  Default: 10.
    pub max_degree2_iterations: u32,

    /// Trails with more vertices than this are simplified during
    /// normalization; shorter spurs are left untouched.  Default: 10.
    pub simplify_vertex_threshold: usize,

    /// Multiplier k on τ for self-loop closure detection (a trail whose
    /// endpoints lie within τ·k of each other).  Default: 10.0.
    pub self_loop_factor: f64,

    /// Strict mode: any validator violation aborts.  Lenient mode logs and
    /// still emits the network plus a violations manifest.  Default: true.
    pub strict_validation: bool,

    /// Wall-clock budget per pipeline stage, in seconds.  Default: 300.
    pub stage_timeout_s: u64,

    /// Which origin dataset to select from the source store.
    pub source_tag: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            intersection_tolerance_m:  3.0,
            min_segment_length_m:      1.0,
            grid_cell_deg:             1e-6,
            dedup_tolerance_frac:      0.01,
            split_ratio_epsilon:       0.001,
            max_degree2_iterations:    10,
            simplify_vertex_threshold: 10,
            self_loop_factor:          10.0,
            strict_validation:         true,
            stage_timeout_s:           300,
            source_tag:                String::new(),
        }
    }
}

impl NetworkConfig {
    /// Default configuration for a given source dataset tag.
    pub fn for_source(tag: impl Into<String>) -> Self {
        Self {
            source_tag: tag.into(),
            ..Self::default()
        }
    }

    /// Check every option against its supported range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Tolerance`] naming the first offending option.
    /// Fatal at startup: the pipeline refuses to run on a bad config.
    pub fn validate(&self) -> CoreResult<()> {
        fn bad(option: &'static str, reason: impl Into<String>) -> CoreError {
            CoreError::Tolerance {
                option,
                reason: reason.into(),
            }
        }

        if !(self.intersection_tolerance_m > 0.0) {
            return Err(bad(
                "intersection_tolerance_m",
                format!("must be > 0, got {}", self.intersection_tolerance_m),
            ));
        }
        if !(self.min_segment_length_m > 0.0) {
            return Err(bad(
                "min_segment_length_m",
                format!("must be > 0, got {}", self.min_segment_length_m),
            ));
        }
        if !(self.grid_cell_deg > 0.0) {
            return Err(bad(
                "grid_cell_deg",
                format!("must be > 0, got {}", self.grid_cell_deg),
            ));
        }
        if !(self.dedup_tolerance_frac > 0.0 && self.dedup_tolerance_frac < 1.0) {
            return Err(bad(
                "dedup_tolerance_frac",
                format!("must be in (0, 1), got {}", self.dedup_tolerance_frac),
            ));
        }
        if !(self.split_ratio_epsilon > 0.0 && self.split_ratio_epsilon < 0.5) {
            return Err(bad(
                "split_ratio_epsilon",
                format!("must be in (0, 0.5), got {}", self.split_ratio_epsilon),
            ));
        }
        if self.max_degree2_iterations == 0 {
            return Err(bad("max_degree2_iterations", "must be at least 1"));
        }
        if self.simplify_vertex_threshold < 3 {
            return Err(bad(
                "simplify_vertex_threshold",
                "must be at least 3 (simplification needs interior vertices)",
            ));
        }
        if !(self.self_loop_factor >= 1.0) {
            return Err(bad(
                "self_loop_factor",
                format!("must be >= 1, got {}", self.self_loop_factor),
            ));
        }
        if self.stage_timeout_s == 0 {
            return Err(bad("stage_timeout_s", "must be > 0"));
        }
        Ok(())
    }

    // ── Derived angular quantities ────────────────────────────────────────

    /// τ expressed in degrees.
    #[inline]
    pub fn tolerance_deg(&self) -> f64 {
        meters_to_degrees(self.intersection_tolerance_m)
    }

    /// The secondary candidate-dedup cell in degrees.
    #[inline]
    pub fn dedup_cell_deg(&self) -> f64 {
        self.tolerance_deg() * self.dedup_tolerance_frac
    }

    /// Endpoint gap below which a trail counts as a self-loop closure.
    #[inline]
    pub fn self_loop_gap_m(&self) -> f64 {
        self.intersection_tolerance_m * self.self_loop_factor
    }
}
