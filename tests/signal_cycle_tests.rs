// tests/signal_cycle_tests.rs
use crossroads_core::{
    Clock, CountVector, LaneIndex, LaneLayout, PixelPoint, Result, SignalColor, SignalOutput,
    SignalScheduler, TimingPolicy,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use SignalColor::{Green, Red, Yellow};

/// What the heads show right now, and a log of (heads, hold) per phase.
#[derive(Default)]
struct Bench {
    heads: [Option<SignalColor>; 3],
    phases: Vec<([Option<SignalColor>; 3], u64)>,
}

struct Heads(Rc<RefCell<Bench>>);
struct Timer(Rc<RefCell<Bench>>);

impl SignalOutput for Heads {
    fn set_lane_color(&mut self, lane: LaneIndex, color: SignalColor) -> Result<()> {
        self.0.borrow_mut().heads[lane.get()] = Some(color);
        Ok(())
    }
}

impl Clock for Timer {
    fn hold(&mut self, duration: Duration) {
        let mut bench = self.0.borrow_mut();
        let heads = bench.heads;
        bench.phases.push((heads, duration.as_secs()));
    }
}

fn run(counts: [u32; 3]) -> (Vec<([Option<SignalColor>; 3], u64)>, LaneIndex) {
    let bench = Rc::new(RefCell::new(Bench::default()));
    let mut scheduler = SignalScheduler::new(TimingPolicy::default());

    let plan = scheduler
        .run_cycle(
            CountVector::new(counts),
            &mut Heads(bench.clone()),
            &mut Timer(bench.clone()),
        )
        .unwrap();

    let phases = bench.borrow().phases.clone();
    (phases, plan.highest_lane())
}

fn holds(phases: &[([Option<SignalColor>; 3], u64)]) -> Vec<u64> {
    phases.iter().map(|(_, secs)| *secs).collect()
}

fn lane(i: usize) -> LaneIndex {
    LaneIndex::new(i).unwrap()
}

#[test]
fn test_full_cycle_for_busy_first_lane() {
    let (phases, highest) = run([10, 2, 1]);

    assert_eq!(highest, lane(0));
    assert_eq!(
        phases,
        vec![
            ([Some(Green), Some(Red), Some(Red)], 12),
            ([Some(Yellow), Some(Red), Some(Red)], 2),
            ([Some(Red), Some(Green), Some(Red)], 4),
            ([Some(Red), Some(Yellow), Some(Red)], 2),
            ([Some(Red), Some(Red), Some(Green)], 4),
            ([Some(Red), Some(Red), Some(Yellow)], 2),
        ]
    );
}

#[test]
fn test_empty_intersection_uses_base_timing() {
    let (phases, highest) = run([0, 0, 0]);

    assert_eq!(highest, lane(0));
    assert_eq!(holds(&phases), vec![4, 2, 4, 2, 4, 2]);
}

#[test]
fn test_ties_resolve_to_lowest_lane() {
    assert_eq!(run([5, 5, 1]).1, lane(0));

    let (phases, highest) = run([1, 8, 8]);
    assert_eq!(highest, lane(1));
    assert_eq!(holds(&phases), vec![4, 2, 12, 2, 4, 2]);
}

#[test]
fn test_one_lane_moving_in_every_phase() {
    for counts in [[0, 0, 7], [3, 3, 3], [1, 0, 0]] {
        let (phases, _) = run(counts);
        for (heads, _) in phases {
            let moving = heads.iter().filter(|c| **c != Some(Red)).count();
            assert_eq!(moving, 1, "{:?} while running {:?}", heads, counts);
        }
    }
}

#[test]
fn test_frame_counts_feed_the_cycle() {
    let layout = LaneLayout::default();
    let centroids = [
        PixelPoint::new(300, 10),
        PixelPoint::new(210, 300),
        PixelPoint::new(410, 0),
        PixelPoint::new(100, 100),
        PixelPoint::new(420, 100), // between lanes
    ];

    let counts = CountVector::from_assignments(centroids.iter().map(|c| layout.classify(*c)));
    assert_eq!(counts.as_array(), [0, 3, 1]);

    let (phases, highest) = run(counts.as_array());
    assert_eq!(highest, lane(1));
    assert_eq!(holds(&phases), vec![4, 2, 12, 2, 4, 2]);
}
