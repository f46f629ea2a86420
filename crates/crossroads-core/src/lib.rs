//! Crossroads core
//!
//! Lane geometry, per-frame vehicle counting and the adaptive signal
//! scheduler. Nothing in here touches a camera, a window or a pin: those
//! arrive as the narrow capabilities in [`signal::SignalOutput`] and
//! [`signal::Clock`].

pub mod counts;
pub mod error;
pub mod lanes;
pub mod signal;

pub use counts::CountVector;
pub use error::{LayoutError, TimingError};
pub use lanes::{LaneIndex, LaneLayout, LaneRegion, PixelPoint, LANE_COUNT};
pub use signal::{
    Aspect, Clock, CyclePlan, PhaseCommand, SchedulerState, SignalColor, SignalOutput,
    SignalScheduler, SignalState, ThreadClock, TimingPolicy,
};

pub type Result<T> = anyhow::Result<T>;
