//! Lane rectangles and the pixel points tested against them

use super::LANE_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a lane, always in `0..LANE_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct LaneIndex(usize);

impl LaneIndex {
    /// Every lane, in the fixed round-robin order.
    pub const ALL: [LaneIndex; LANE_COUNT] = [LaneIndex(0), LaneIndex(1), LaneIndex(2)];

    pub fn new(index: usize) -> Option<Self> {
        (index < LANE_COUNT).then_some(Self(index))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// The lane after this one, wrapping from the last lane to the first.
    pub fn next(self) -> Self {
        Self((self.0 + 1) % LANE_COUNT)
    }

    /// One-based number used on labels ("Lane 1").
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

impl TryFrom<usize> for LaneIndex {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("lane index {value} out of range 0..{LANE_COUNT}"))
    }
}

impl From<LaneIndex> for usize {
    fn from(lane: LaneIndex) -> usize {
        lane.0
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer pixel coordinate in source-frame resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed, axis-aligned rectangle `(x1, y1)-(x2, y2)` owned by one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneRegion {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LaneRegion {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Boundary-inclusive on all four sides.
    pub fn contains(&self, point: PixelPoint) -> bool {
        self.x1 <= point.x && point.x <= self.x2 && self.y1 <= point.y && point.y <= self.y2
    }

    pub fn is_inverted(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    /// True when the two closed rectangles share at least one pixel.
    pub fn overlaps(&self, other: &LaneRegion) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}
