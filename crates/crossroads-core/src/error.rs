//! Configuration errors

use crate::lanes::LaneIndex;
use thiserror::Error;

/// Rejected lane geometry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("lane {lane} has an inverted rectangle ({x1},{y1})-({x2},{y2})")]
    InvertedRegion {
        lane: LaneIndex,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    #[error("lanes {first} and {second} overlap")]
    OverlappingRegions { first: LaneIndex, second: LaneIndex },
}

/// Rejected timing policy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    #[error("mid band ({mid}%) must not exceed high band ({high}%)")]
    BandsOutOfOrder { mid: f64, high: f64 },
    #[error("{phase} duration must be non-zero")]
    ZeroDuration { phase: &'static str },
    #[error("{phase} duration must be a whole number of seconds")]
    FractionalSeconds { phase: &'static str },
}
