//! The fixed three-lane layout and the centroid classification rule

use super::region::{LaneIndex, LaneRegion, PixelPoint};
use super::LANE_COUNT;
use crate::error::LayoutError;
use serde::{Deserialize, Serialize};

/// Lane rectangles for the toy intersection as seen by a 640x480 camera.
///
/// Lane 1 and lane 3 were swapped once after a report that the counts were
/// being attributed to the wrong physical lanes. The order below is the
/// corrected mapping and is part of the wiring contract.
pub const DEFAULT_REGIONS: [LaneRegion; LANE_COUNT] = [
    LaneRegion::new(430, 0, 650, 300), // lane 1, previously lane 3
    LaneRegion::new(210, 0, 410, 300), // lane 2
    LaneRegion::new(0, 0, 200, 300),   // lane 3, previously lane 1
];

/// Three validated, non-overlapping lane regions in index order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[LaneRegion; LANE_COUNT]", into = "[LaneRegion; LANE_COUNT]")]
pub struct LaneLayout {
    regions: [LaneRegion; LANE_COUNT],
}

impl LaneLayout {
    /// Validate and freeze a layout.
    pub fn new(regions: [LaneRegion; LANE_COUNT]) -> Result<Self, LayoutError> {
        for lane in LaneIndex::ALL {
            let r = regions[lane.get()];
            if r.is_inverted() {
                return Err(LayoutError::InvertedRegion {
                    lane,
                    x1: r.x1,
                    y1: r.y1,
                    x2: r.x2,
                    y2: r.y2,
                });
            }
        }

        for first in LaneIndex::ALL {
            for second in LaneIndex::ALL.into_iter().filter(|s| *s > first) {
                if regions[first.get()].overlaps(&regions[second.get()]) {
                    return Err(LayoutError::OverlappingRegions { first, second });
                }
            }
        }

        Ok(Self { regions })
    }

    /// Regions paired with their lane, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (LaneIndex, &LaneRegion)> {
        LaneIndex::ALL.into_iter().zip(self.regions.iter())
    }

    /// Assign a centroid to the first region (in index order) containing it.
    ///
    /// `None` means the blob is unassigned: it is still reported to the
    /// overlay but never counted.
    pub fn classify(&self, centroid: PixelPoint) -> Option<LaneIndex> {
        self.iter()
            .find(|(_, region)| region.contains(centroid))
            .map(|(lane, _)| lane)
    }
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS,
        }
    }
}

impl TryFrom<[LaneRegion; LANE_COUNT]> for LaneLayout {
    type Error = LayoutError;

    fn try_from(regions: [LaneRegion; LANE_COUNT]) -> Result<Self, Self::Error> {
        Self::new(regions)
    }
}

impl From<LaneLayout> for [LaneRegion; LANE_COUNT] {
    fn from(layout: LaneLayout) -> Self {
        layout.regions
    }
}
