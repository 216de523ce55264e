//! `tn-detect` — trail normalization, intersection detection, splitting.
//!
//! This is the front half of the network-building pipeline: it turns a raw
//! regional trail dump into a set of split fragments whose endpoints meet at
//! shared canonical coordinates, ready for planar noding.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`normalize`] | Flattening, repair, simplification, drop accounting     |
//! | [`detect`]    | X/T/Y/self-loop detection, endpoint fusing, dedup       |
//! | [`split`]     | Cut application, sliver floor, provenance               |
//! | [`error`]     | `DetectError`, `DetectResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Per-pair candidate generation via rayon (same output).    |
//! | `serde`    | Propagates serde derives to core types.                   |

pub mod detect;
pub mod error;
pub mod normalize;
pub mod split;


pub use detect::{CutPoint, DetectorOutput, EndpointSnap, TrailEnd, detect};
pub use error::{DetectError, DetectResult};
pub use normalize::{DropReason, NormalizeOutcome, Reject, normalize};
pub use split::{SplitOutcome, split};
