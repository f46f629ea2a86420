//! Signal heads driven through per-color output pins

use anyhow::{bail, Result};
use crossroads_core::{LaneIndex, SignalColor, SignalOutput, LANE_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// BCM pin numbers of one lane's signal head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanePins {
    pub red: u8,
    pub yellow: u8,
    pub green: u8,
}

impl LanePins {
    pub fn pin(&self, color: SignalColor) -> u8 {
        match color {
            SignalColor::Red => self.red,
            SignalColor::Yellow => self.yellow,
            SignalColor::Green => self.green,
        }
    }
}

/// Pin wiring for all three heads, in lane order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap([LanePins; LANE_COUNT]);

impl Default for PinMap {
    fn default() -> Self {
        Self([
            LanePins { red: 17, yellow: 27, green: 22 },
            LanePins { red: 23, yellow: 24, green: 25 },
            LanePins { red: 5, yellow: 6, green: 13 },
        ])
    }
}

impl PinMap {
    pub fn new(lanes: [LanePins; LANE_COUNT]) -> Self {
        Self(lanes)
    }

    pub fn lane(&self, lane: LaneIndex) -> &LanePins {
        &self.0[lane.get()]
    }

    pub fn pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .iter()
            .flat_map(|l| SignalColor::ALL.into_iter().map(move |c| l.pin(c)))
    }

    /// Every pin drives exactly one lamp.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for pin in self.pins() {
            if !seen.insert(pin) {
                bail!("pin {} is wired to more than one lamp", pin);
            }
        }
        Ok(())
    }
}

/// Raw digital output
pub trait PinWriter {
    fn write(&mut self, pin: u8, high: bool) -> Result<()>;
}

/// Pin writer for benches without GPIO: levels only go to the log.
#[derive(Debug, Default)]
pub struct LoggedPins;

impl PinWriter for LoggedPins {
    fn write(&mut self, pin: u8, high: bool) -> Result<()> {
        debug!(pin, level = if high { "HIGH" } else { "LOW" }, "GPIO write");
        Ok(())
    }
}

/// Signal heads on output pins.
///
/// All pins are driven low on construction and again on drop, so the
/// lamps go dark on every exit path.
pub struct PinSignalOutput<W: PinWriter> {
    pins: PinMap,
    writer: W,
}

impl<W: PinWriter> PinSignalOutput<W> {
    pub fn new(pins: PinMap, writer: W) -> Result<Self> {
        pins.validate()?;
        let mut output = Self { pins, writer };
        output.all_low()?;
        info!("Signal pins initialised");
        Ok(output)
    }

    fn all_low(&mut self) -> Result<()> {
        let pins: Vec<u8> = self.pins.pins().collect();
        for pin in pins {
            self.writer.write(pin, false)?;
        }
        Ok(())
    }
}

impl<W: PinWriter> SignalOutput for PinSignalOutput<W> {
    fn set_lane_color(&mut self, lane: LaneIndex, color: SignalColor) -> Result<()> {
        let head = *self.pins.lane(lane);
        for c in SignalColor::ALL {
            self.writer.write(head.pin(c), c == color)?;
        }
        Ok(())
    }
}

impl<W: PinWriter> Drop for PinSignalOutput<W> {
    fn drop(&mut self) {
        match self.all_low() {
            Ok(()) => info!("Signal pins released"),
            Err(e) => warn!("Failed to release signal pins: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossroads_core::{Aspect, SignalState};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Shared so the levels can be inspected after the output is dropped.
    #[derive(Clone, Default)]
    struct Board(Rc<RefCell<HashMap<u8, bool>>>);

    impl Board {
        fn high(&self) -> Vec<u8> {
            let mut pins: Vec<u8> = self.0.borrow().iter().filter(|(_, h)| **h).map(|(p, _)| *p).collect();
            pins.sort();
            pins
        }
    }

    impl PinWriter for Board {
        fn write(&mut self, pin: u8, high: bool) -> Result<()> {
            self.0.borrow_mut().insert(pin, high);
            Ok(())
        }
    }

    #[test]
    fn test_default_wiring() {
        let pins = PinMap::default();
        assert_eq!(pins.lane(LaneIndex::ALL[0]).pin(SignalColor::Green), 22);
        assert_eq!(pins.lane(LaneIndex::ALL[2]).pin(SignalColor::Red), 5);
        assert!(pins.validate().is_ok());
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut lanes = PinMap::default().0;
        lanes[1].green = 22;
        assert!(PinMap::new(lanes).validate().is_err());
    }

    #[test]
    fn test_state_lights_one_lamp_per_head() -> Result<()> {
        let board = Board::default();
        let mut output = PinSignalOutput::new(PinMap::default(), board.clone())?;
        assert!(board.high().is_empty());

        output.apply(&SignalState::new(LaneIndex::ALL[1], Aspect::Green))?;
        assert_eq!(board.high(), vec![5, 17, 25]);

        output.apply(&SignalState::new(LaneIndex::ALL[1], Aspect::Yellow))?;
        assert_eq!(board.high(), vec![5, 17, 24]);
        Ok(())
    }

    #[test]
    fn test_drop_turns_everything_off() -> Result<()> {
        let board = Board::default();
        {
            let mut output = PinSignalOutput::new(PinMap::default(), board.clone())?;
            output.apply(&SignalState::new(LaneIndex::ALL[0], Aspect::Green))?;
            assert!(!board.high().is_empty());
        }
        assert!(board.high().is_empty());
        assert_eq!(board.0.borrow().len(), 9);
        Ok(())
    }
}
