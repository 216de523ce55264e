//! `tn-pipeline` — the Layer 1 → Layer 2 network-building pipeline.
//!
//! Pulls a regional trail set through normalization, intersection
//! detection, splitting, planar noding, degree-2 merging, and validation,
//! then emits the routable network with full per-edge provenance.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`source`] | `TrailSource` pull trait, `MemorySource`                  |
//! | [`run`]    | `run`/`run_cancellable`, `emit`, `build_network`          |
//! | [`guard`]  | `CancelToken`, stage wall-clock budgets                   |
//! | [`report`] | `StageCounters`, `RunReport`, `NetworkResult`             |
//! | [`error`]  | `PipelineError` unifying all subsystem errors             |
//!
//! # Typical use
//!
//! ```rust,ignore
//! use tn_core::{BBox, NetworkConfig};
//! use tn_output::CsvSink;
//! use tn_pipeline::{build_network, MemorySource};
//!
//! let cfg = NetworkConfig::for_source("osm");
//! let mut sink = CsvSink::create(out_dir)?;
//! let result = build_network(&source, region_bbox, &cfg, &mut sink)?;
//! println!("{} edges", result.edges.len());
//! ```

pub mod error;
pub mod guard;
pub mod report;
pub mod run;
pub mod source;


pub use error::{PipelineError, PipelineResult};
pub use guard::CancelToken;
pub use report::{NetworkResult, RunReport, StageCounters};
pub use run::{build_network, emit, run, run_cancellable};
pub use source::{MemorySource, TrailSource};
