//! Signal aspects, timing policy and the round-robin scheduler

pub mod scheduler;
pub mod state;
pub mod timing;

pub use scheduler::{Clock, PhaseCommand, SchedulerState, SignalOutput, SignalScheduler, ThreadClock};
pub use state::{Aspect, SignalColor, SignalState};
pub use timing::{CyclePlan, TimingPolicy};
