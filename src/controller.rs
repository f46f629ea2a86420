//! The outer capture/count/signal loop

use crate::camera::FrameSource;
use crate::display::Display;
use anyhow::{Context, Result};
use crossroads_core::{
    Clock, CountVector, CyclePlan, LaneLayout, PhaseCommand, SignalOutput, SignalScheduler,
};
use crossroads_cv::utils::ImageUtils;
use crossroads_cv::{FrameDetection, OverlayRenderer, ShapeDetector};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Serialisable record of one completed cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub blobs: usize,
    pub unassigned: usize,
    pub plan: CyclePlan,
    pub phases: Vec<PhaseCommand>,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: u64,
    pub last_counts: Option<CountVector>,
    pub cancelled: bool,
}

/// Owns the pipeline and the injected collaborators.
///
/// Each iteration samples one frame, shows it, polls for cancellation,
/// then blocks for a whole signal cycle driven by that single sample.
pub struct TrafficController<S, O, C, D> {
    source: S,
    output: O,
    clock: C,
    display: D,
    detector: ShapeDetector,
    renderer: OverlayRenderer,
    layout: LaneLayout,
    scheduler: SignalScheduler,
    max_cycles: Option<u64>,
    snapshot_path: Option<PathBuf>,
}

impl<S, O, C, D> TrafficController<S, O, C, D>
where
    S: FrameSource,
    O: SignalOutput,
    C: Clock,
    D: Display,
{
    pub fn new(
        source: S,
        output: O,
        clock: C,
        display: D,
        detector: ShapeDetector,
        layout: LaneLayout,
        scheduler: SignalScheduler,
    ) -> Self {
        let renderer = OverlayRenderer::new(detector.config().overlay.clone());
        Self {
            source,
            output,
            clock,
            display,
            detector,
            renderer,
            layout,
            scheduler,
            max_cycles: None,
            snapshot_path: None,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_snapshot_path(mut self, path: Option<PathBuf>) -> Self {
        self.snapshot_path = path;
        self
    }

    #[cfg(test)]
    pub fn output(&self) -> &O {
        &self.output
    }

    #[cfg(test)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Capture, detect and show one frame. Returns `None` when the
    /// operator cancelled.
    pub fn sample(&mut self) -> Result<Option<FrameDetection>> {
        let frame = self.source.capture_frame().context("Frame capture failed")?;
        let detection = self.detector.process_frame(&frame, &self.layout)?;

        let annotated = self.renderer.render(&frame, &self.layout, &detection)?;
        self.display.show(&annotated)?;
        if let Some(path) = &self.snapshot_path {
            ImageUtils::save_image(&annotated, path)?;
        }

        if self.display.cancel_requested()? {
            return Ok(None);
        }
        Ok(Some(detection))
    }

    /// Run until cancelled or the cycle limit is reached.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary {
            cycles: 0,
            last_counts: None,
            cancelled: false,
        };

        while self.max_cycles.map_or(true, |max| summary.cycles < max) {
            let Some(detection) = self.sample()? else {
                info!("Cancelled by operator");
                summary.cancelled = true;
                break;
            };

            let plan = self
                .scheduler
                .run_cycle(detection.counts, &mut self.output, &mut self.clock)?;

            summary.cycles += 1;
            summary.last_counts = Some(detection.counts);

            let report = CycleReport {
                cycle: summary.cycles,
                blobs: detection.blobs.len(),
                unassigned: detection.stats.unassigned,
                phases: plan.phases(),
                plan,
            };
            debug!("Cycle report: {}", serde_json::to_string(&report)?);
        }

        info!("Stopped after {} cycle(s)", summary.cycles);
        Ok(summary)
    }
}
