//! `tn-graph` — planar noding, degree-2 merging, composition, validation.
//!
//! The back half of the network-building pipeline: split fragments become a
//! planar node/edge graph, splitting residue is folded away, and the result
//! is checked against its invariants before emission.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`network`] | Mutable `TrailNetwork` arena (nodes, edges, incidence)    |
//! | [`node`]    | The noder: grid-cell node identity, self-loop breaking    |
//! | [`merge`]   | Degree-2 chain fixed point, cycle promotion               |
//! | [`compose`] | Composition row construction, reorientation, rescale      |
//! | [`validate`]| `Violation` manifest, strict/lenient validator            |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                            |

pub mod compose;
pub mod error;
pub mod merge;
pub mod network;
pub mod node;
pub mod validate;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use merge::{MergeReport, merge_degree2};
pub use network::TrailNetwork;
pub use node::{NodingReport, node_network};
pub use validate::{ValidationOutcome, Violation, validate};
