//! Per-frame vehicle counts

use crate::lanes::{LaneIndex, LANE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of vehicles seen in each lane of a single frame.
///
/// Built fresh for every frame. Nothing is carried between frames, so a
/// parked car is counted again in every frame it appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountVector([u32; LANE_COUNT]);

impl CountVector {
    pub fn new(counts: [u32; LANE_COUNT]) -> Self {
        Self(counts)
    }

    /// Reduce one frame's classifications to a count per lane.
    ///
    /// `None` entries are unassigned blobs and are skipped.
    pub fn from_assignments<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = Option<LaneIndex>>,
    {
        let mut counts = Self::default();
        for lane in assignments.into_iter().flatten() {
            counts.increment(lane);
        }
        counts
    }

    pub fn increment(&mut self, lane: LaneIndex) {
        self.0[lane.get()] += 1;
    }

    pub fn as_array(&self) -> [u32; LANE_COUNT] {
        self.0
    }

    pub fn max(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Each lane's count as a percentage of the busiest lane.
    ///
    /// All zeros when no lane has any vehicle.
    pub fn percentages(&self) -> [f64; LANE_COUNT] {
        let max = self.max();
        if max == 0 {
            return [0.0; LANE_COUNT];
        }
        self.0.map(|c| f64::from(c) / f64::from(max) * 100.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LaneIndex, u32)> + '_ {
        LaneIndex::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl From<[u32; LANE_COUNT]> for CountVector {
    fn from(counts: [u32; LANE_COUNT]) -> Self {
        Self::new(counts)
    }
}

impl fmt::Display for CountVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0[0], self.0[1], self.0[2])
    }
}
