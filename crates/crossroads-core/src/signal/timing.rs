//! Green/yellow durations derived from one count sample

use super::scheduler::{PhaseCommand, SchedulerState};
use crate::counts::CountVector;
use crate::error::TimingError;
use crate::lanes::{LaneIndex, LANE_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Durations are written to config files as whole seconds.
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Timing constants for one intersection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Percentage at or above which the busiest lane gets `high_green`.
    pub high_band_percent: f64,
    /// Percentage at or above which the busiest lane gets `mid_green`.
    pub mid_band_percent: f64,
    #[serde(with = "duration_secs")]
    pub high_green: Duration,
    #[serde(with = "duration_secs")]
    pub mid_green: Duration,
    /// Green for every other lane, and for the busiest lane below the mid band.
    #[serde(with = "duration_secs")]
    pub base_green: Duration,
    #[serde(with = "duration_secs")]
    pub yellow: Duration,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            high_band_percent: 50.0,
            mid_band_percent: 25.0,
            high_green: Duration::from_secs(12),
            mid_green: Duration::from_secs(8),
            base_green: Duration::from_secs(4),
            yellow: Duration::from_secs(2),
        }
    }
}

impl TimingPolicy {
    pub fn validate(&self) -> Result<(), TimingError> {
        if self.mid_band_percent > self.high_band_percent {
            return Err(TimingError::BandsOutOfOrder {
                mid: self.mid_band_percent,
                high: self.high_band_percent,
            });
        }
        let phases = [
            ("high green", self.high_green),
            ("mid green", self.mid_green),
            ("base green", self.base_green),
            ("yellow", self.yellow),
        ];
        for (phase, duration) in phases {
            if duration.is_zero() {
                return Err(TimingError::ZeroDuration { phase });
            }
            // Config files carry whole seconds only.
            if duration.subsec_nanos() != 0 {
                return Err(TimingError::FractionalSeconds { phase });
            }
        }
        Ok(())
    }

    /// Green duration for the busiest lane given its percentage.
    pub fn priority_green(&self, highest_percent: f64) -> Duration {
        if highest_percent >= self.high_band_percent {
            self.high_green
        } else if highest_percent >= self.mid_band_percent {
            self.mid_green
        } else {
            self.base_green
        }
    }
}

/// Everything one cycle needs, fixed when the cycle starts.
///
/// The same sample governs all six phases; counts are not refreshed until
/// the next cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CyclePlan {
    counts: CountVector,
    percentages: [f64; LANE_COUNT],
    highest_lane: LaneIndex,
    highest_percent: f64,
    #[serde(with = "duration_secs")]
    priority_green: Duration,
    #[serde(with = "duration_secs")]
    base_green: Duration,
    #[serde(with = "duration_secs")]
    yellow: Duration,
}

impl CyclePlan {
    pub fn new(counts: CountVector, policy: &TimingPolicy) -> Self {
        let percentages = counts.percentages();

        // Strictly-greater comparison keeps the lowest index on ties.
        let mut highest_lane = LaneIndex::ALL[0];
        for lane in LaneIndex::ALL {
            if percentages[lane.get()] > percentages[highest_lane.get()] {
                highest_lane = lane;
            }
        }
        let highest_percent = percentages[highest_lane.get()];

        Self {
            counts,
            percentages,
            highest_lane,
            highest_percent,
            priority_green: policy.priority_green(highest_percent),
            base_green: policy.base_green,
            yellow: policy.yellow,
        }
    }

    pub fn counts(&self) -> CountVector {
        self.counts
    }

    pub fn percentages(&self) -> [f64; LANE_COUNT] {
        self.percentages
    }

    pub fn highest_lane(&self) -> LaneIndex {
        self.highest_lane
    }

    pub fn highest_percent(&self) -> f64 {
        self.highest_percent
    }

    /// Green held by the busiest lane.
    pub fn priority_green(&self) -> Duration {
        self.priority_green
    }

    pub fn green_duration(&self, lane: LaneIndex) -> Duration {
        if lane == self.highest_lane {
            self.priority_green
        } else {
            self.base_green
        }
    }

    pub fn duration_of(&self, state: SchedulerState) -> Duration {
        match state {
            SchedulerState::LaneGreen(lane) => self.green_duration(lane),
            SchedulerState::LaneYellow(_) => self.yellow,
        }
    }

    /// The six phases of the cycle, green then yellow for lanes 0, 1, 2.
    pub fn phases(&self) -> Vec<PhaseCommand> {
        std::iter::successors(Some(SchedulerState::first()), |s| s.next_in_cycle())
            .map(|state| PhaseCommand::new(state, self.duration_of(state)))
            .collect()
    }

    pub fn total_duration(&self) -> Duration {
        self.phases().iter().map(|p| p.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(counts: [u32; 3]) -> CyclePlan {
        CyclePlan::new(CountVector::new(counts), &TimingPolicy::default())
    }

    #[test]
    fn test_busiest_lane_gets_long_green() {
        let plan = plan([10, 2, 1]);
        assert_eq!(plan.percentages(), [100.0, 20.0, 10.0]);
        assert_eq!(plan.highest_lane(), LaneIndex::ALL[0]);
        assert_eq!(plan.priority_green(), Duration::from_secs(12));
    }

    #[test]
    fn test_zero_counts_default_to_lane_zero_base_green() {
        let plan = plan([0, 0, 0]);
        assert_eq!(plan.percentages(), [0.0, 0.0, 0.0]);
        assert_eq!(plan.highest_lane(), LaneIndex::ALL[0]);
        assert_eq!(plan.priority_green(), Duration::from_secs(4));
        assert_eq!(plan.total_duration(), Duration::from_secs(18));
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        assert_eq!(plan([5, 5, 1]).highest_lane(), LaneIndex::ALL[0]);
        assert_eq!(plan([1, 8, 8]).highest_lane(), LaneIndex::ALL[1]);
        assert_eq!(plan([1, 8, 8]).percentages(), [12.5, 100.0, 100.0]);
    }

    #[test]
    fn test_priority_green_bands() {
        let policy = TimingPolicy::default();
        assert_eq!(policy.priority_green(100.0), Duration::from_secs(12));
        assert_eq!(policy.priority_green(50.0), Duration::from_secs(12));
        assert_eq!(policy.priority_green(49.9), Duration::from_secs(8));
        assert_eq!(policy.priority_green(25.0), Duration::from_secs(8));
        assert_eq!(policy.priority_green(24.9), Duration::from_secs(4));
        assert_eq!(policy.priority_green(0.0), Duration::from_secs(4));
    }

    #[test]
    fn test_phase_order_and_durations() {
        let plan = plan([0, 3, 1]);
        let got: Vec<(SchedulerState, u64)> = plan
            .phases()
            .into_iter()
            .map(|p| (p.state, p.duration.as_secs()))
            .collect();

        let [l0, l1, l2] = LaneIndex::ALL;
        assert_eq!(
            got,
            vec![
                (SchedulerState::LaneGreen(l0), 4),
                (SchedulerState::LaneYellow(l0), 2),
                (SchedulerState::LaneGreen(l1), 12),
                (SchedulerState::LaneYellow(l1), 2),
                (SchedulerState::LaneGreen(l2), 4),
                (SchedulerState::LaneYellow(l2), 2),
            ]
        );
    }

    #[test]
    fn test_policy_validation() {
        assert_eq!(TimingPolicy::default().validate(), Ok(()));

        let bands = TimingPolicy {
            mid_band_percent: 60.0,
            ..Default::default()
        };
        assert!(matches!(bands.validate(), Err(TimingError::BandsOutOfOrder { .. })));

        let zero = TimingPolicy {
            yellow: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(TimingError::ZeroDuration { phase: "yellow" }));
    }

    #[test]
    fn test_fractional_seconds_rejected() {
        let half = TimingPolicy {
            base_green: Duration::from_millis(500),
            ..Default::default()
        };
        assert_eq!(
            half.validate(),
            Err(TimingError::FractionalSeconds { phase: "base green" })
        );

        let padded = TimingPolicy {
            high_green: Duration::from_millis(12_250),
            ..Default::default()
        };
        assert_eq!(
            padded.validate(),
            Err(TimingError::FractionalSeconds { phase: "high green" })
        );
    }

    #[test]
    fn test_valid_policy_survives_reload() {
        let policy = TimingPolicy {
            high_green: Duration::from_secs(15),
            yellow: Duration::from_secs(3),
            ..Default::default()
        };
        assert_eq!(policy.validate(), Ok(()));

        let json = serde_json::to_string(&policy).unwrap();
        let back: TimingPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
        assert_eq!(back.validate(), Ok(()));
    }

    #[test]
    fn test_policy_reads_seconds() {
        let policy: TimingPolicy = serde_json::from_str(r#"{"high_green": 20, "yellow": 3}"#).unwrap();
        assert_eq!(policy.high_green, Duration::from_secs(20));
        assert_eq!(policy.yellow, Duration::from_secs(3));
        assert_eq!(policy.base_green, Duration::from_secs(4));
    }
}
