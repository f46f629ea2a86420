//! What every lane is showing at one instant

use crate::lanes::{LaneIndex, LANE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color a single lane head can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalColor {
    Red,
    Yellow,
    Green,
}

impl SignalColor {
    pub const ALL: [SignalColor; 3] = [SignalColor::Red, SignalColor::Yellow, SignalColor::Green];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalColor::Red => "red",
            SignalColor::Yellow => "yellow",
            SignalColor::Green => "green",
        }
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The non-red color held by the one active lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Green,
    Yellow,
}

impl Aspect {
    pub fn color(self) -> SignalColor {
        match self {
            Aspect::Green => SignalColor::Green,
            Aspect::Yellow => SignalColor::Yellow,
        }
    }
}

/// Color assignment for the whole intersection.
///
/// At most one lane is ever non-red: the state either names a single
/// active lane with its aspect, or is all red. There is no way to build a
/// value with two lanes moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalState {
    active: Option<(LaneIndex, Aspect)>,
}

impl SignalState {
    pub fn all_red() -> Self {
        Self { active: None }
    }

    pub fn new(lane: LaneIndex, aspect: Aspect) -> Self {
        Self {
            active: Some((lane, aspect)),
        }
    }

    pub fn active(&self) -> Option<(LaneIndex, Aspect)> {
        self.active
    }

    pub fn color_of(&self, lane: LaneIndex) -> SignalColor {
        match self.active {
            Some((active, aspect)) if active == lane => aspect.color(),
            _ => SignalColor::Red,
        }
    }

    pub fn colors(&self) -> [SignalColor; LANE_COUNT] {
        LaneIndex::ALL.map(|lane| self.color_of(lane))
    }
}
