//! Round-robin phase sequencing

use super::state::{Aspect, SignalColor, SignalState};
use super::timing::{duration_secs, CyclePlan, TimingPolicy};
use crate::counts::CountVector;
use crate::lanes::LaneIndex;
use crate::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Where the scheduler is in its green/yellow rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchedulerState {
    LaneGreen(LaneIndex),
    LaneYellow(LaneIndex),
}

impl SchedulerState {
    /// Every cycle opens with lane 0 green.
    pub fn first() -> Self {
        SchedulerState::LaneGreen(LaneIndex::ALL[0])
    }

    /// Successor in the endless rotation 0G, 0Y, 1G, 1Y, 2G, 2Y, 0G, ...
    pub fn next(self) -> Self {
        match self {
            SchedulerState::LaneGreen(lane) => SchedulerState::LaneYellow(lane),
            SchedulerState::LaneYellow(lane) => SchedulerState::LaneGreen(lane.next()),
        }
    }

    /// Successor within the current cycle, `None` after the last yellow.
    pub fn next_in_cycle(self) -> Option<Self> {
        let next = self.next();
        (next != Self::first()).then_some(next)
    }

    pub fn lane(self) -> LaneIndex {
        match self {
            SchedulerState::LaneGreen(lane) | SchedulerState::LaneYellow(lane) => lane,
        }
    }

    pub fn aspect(self) -> Aspect {
        match self {
            SchedulerState::LaneGreen(_) => Aspect::Green,
            SchedulerState::LaneYellow(_) => Aspect::Yellow,
        }
    }

    pub fn signal(self) -> SignalState {
        SignalState::new(self.lane(), self.aspect())
    }
}

/// One phase to emit: show `state`, then hold it for `duration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseCommand {
    pub state: SchedulerState,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl PhaseCommand {
    pub fn new(state: SchedulerState, duration: Duration) -> Self {
        Self { state, duration }
    }

    pub fn lane(&self) -> LaneIndex {
        self.state.lane()
    }

    pub fn color(&self) -> SignalColor {
        self.state.aspect().color()
    }
}

/// Write side of the signal heads.
///
/// Implementations only need `set_lane_color`. Nothing is ever read back,
/// so the last write for a lane is what it shows.
pub trait SignalOutput {
    fn set_lane_color(&mut self, lane: LaneIndex, color: SignalColor) -> Result<()>;

    /// Show a whole-intersection state, reds first so that two lanes are
    /// never non-red at once, even between individual writes.
    fn apply(&mut self, state: &SignalState) -> Result<()> {
        let active = state.active().map(|(lane, _)| lane);
        for lane in LaneIndex::ALL.into_iter().filter(|l| Some(*l) != active) {
            self.set_lane_color(lane, SignalColor::Red)?;
        }
        if let Some((lane, aspect)) = state.active() {
            self.set_lane_color(lane, aspect.color())?;
        }
        Ok(())
    }
}

/// Blocking wait used to hold a phase
pub trait Clock {
    fn hold(&mut self, duration: Duration);
}

/// Holds phases with `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Drives the three-lane rotation one cycle at a time
#[derive(Debug, Clone)]
pub struct SignalScheduler {
    policy: TimingPolicy,
    state: Option<SchedulerState>,
    cycles: u64,
}

impl SignalScheduler {
    pub fn new(policy: TimingPolicy) -> Self {
        Self {
            policy,
            state: None,
            cycles: 0,
        }
    }

    pub fn policy(&self) -> &TimingPolicy {
        &self.policy
    }

    /// Phase currently shown, `None` before the first cycle.
    pub fn state(&self) -> Option<SchedulerState> {
        self.state
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    pub fn plan(&self, counts: CountVector) -> CyclePlan {
        CyclePlan::new(counts, &self.policy)
    }

    /// Run one full cycle (green then yellow for every lane) from a single
    /// count sample. Blocks for the sum of all holds.
    pub fn run_cycle<O, C>(
        &mut self,
        counts: CountVector,
        output: &mut O,
        clock: &mut C,
    ) -> Result<CyclePlan>
    where
        O: SignalOutput + ?Sized,
        C: Clock + ?Sized,
    {
        let plan = self.plan(counts);
        info!(
            counts = %plan.counts(),
            highest_lane = plan.highest_lane().number(),
            highest_percent = plan.highest_percent(),
            priority_green_s = plan.priority_green().as_secs(),
            "Starting signal cycle {}",
            self.cycles + 1
        );

        for phase in plan.phases() {
            debug!(
                "Lane {} {} for {}s",
                phase.lane().number(),
                phase.color(),
                phase.duration.as_secs()
            );
            output.apply(&phase.state.signal())?;
            self.state = Some(phase.state);
            clock.hold(phase.duration);
        }

        self.cycles += 1;
        Ok(plan)
    }
}
