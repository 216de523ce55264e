//! `tn-core` — foundational types for the trailnet network builder.
//!
//! This crate is a dependency of every other `tn-*` crate.  It intentionally
//! has no `tn-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `TrailId`, `SegmentId`, `NodeId`, `EdgeId`                |
//! | [`geo`]      | `Coord3`, `BBox`, grid quantization, meter↔degree         |
//! | [`polyline`] | The `Polyline` coordinate container                       |
//! | [`trail`]    | `RawTrail`, `Trail`, `SplitSegment`, `IntersectionPoint`  |
//! | [`network`]  | Emitted `Node`/`Edge`/`CompositionRow` rows               |
//! | [`config`]   | `NetworkConfig` with startup validation                   |
//! | [`error`]    | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod network;
pub mod polyline;
pub mod trail;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::NetworkConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{
    BBox, COORD_EPS_DEG, Coord3, METERS_PER_DEGREE, degrees_to_meters, grid_key,
    meters_to_degrees, snap_coord,
};
pub use ids::{EdgeId, NodeId, SegmentId, TrailId};
pub use network::{CompositionRow, Edge, Node};
pub use polyline::Polyline;
pub use trail::{
    IntersectionKind, IntersectionPoint, RawGeometry, RawTrail, SplitSegment, Trail, TrailAttrs,
};
