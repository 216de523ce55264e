//! The ordered pipeline stage ladder.

use std::fmt;

/// Pipeline stages in execution order.  A workspace records the last stage
/// that completed successfully; on failure it stays there for inspection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Created,
    Populated,
    Normalized,
    Detected,
    Split,
    Noded,
    Merged,
    Validated,
}

impl Stage {
    /// The stage that must run next, `None` after the last one.
    pub fn successor(self) -> Option<Stage> {
        use Stage::*;
        match self {
            Created    => Some(Populated),
            Populated  => Some(Normalized),
            Normalized => Some(Detected),
            Detected   => Some(Split),
            Split      => Some(Noded),
            Noded      => Some(Merged),
            Merged     => Some(Validated),
            Validated  => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Created    => "created",
            Stage::Populated  => "populated",
            Stage::Normalized => "normalized",
            Stage::Detected   => "detected",
            Stage::Split      => "split",
            Stage::Noded      => "noded",
            Stage::Merged     => "merged",
            Stage::Validated  => "validated",
        };
        f.write_str(s)
    }
}
