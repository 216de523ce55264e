//! `tn-geom` — the geometry kernel.
//!
//! All geometric computation for the network builder lives here; application
//! code never loops over coordinates.  Topological comparisons use planar
//! lon/lat degrees; every meter quantity is geodesic on the WGS-84 ellipsoid.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`geodesic`] | `distance_m`, `length_m`, elevation gain/loss              |
//! | [`ops`]      | projection, `point_at`, `substring`, `split_at`, grid snap, closest approach, crossings |
//! | [`simplify`] | elevation-preserving Douglas–Peucker                       |
//! | [`validity`] | `check_valid`, `is_valid`, `is_simple`                     |
//! | [`error`]    | `GeomError`, `GeomResult<T>`                               |

pub mod error;
pub mod geodesic;
pub mod ops;
pub mod simplify;
pub mod validity;

#[cfg(test)]
mod tests;

pub use error::{GeomError, GeomResult};
pub use geodesic::{distance_m, elevation_gain_loss, length_m};
pub use ops::{
    ClosestApproach, Crossing, Projection, closest_approach, closest_point_on, crossings,
    distance_point_deg, force_2d_keepz, point_at, snap_distance_m, snap_to_grid, split_at,
    substring,
};
pub use simplify::simplify_keepz;
pub use validity::{check_valid, is_simple, is_valid};
