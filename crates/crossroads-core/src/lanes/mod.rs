//! Static lane geometry and centroid classification

pub mod layout;
pub mod region;

pub use layout::LaneLayout;
pub use region::{LaneIndex, LaneRegion, PixelPoint};

/// The intersection always has exactly three lanes.
pub const LANE_COUNT: usize = 3;
