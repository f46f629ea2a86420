mod camera;
mod config;
mod controller;
mod display;
mod signals;

use anyhow::Result;
use camera::open_source;
use clap::Parser;
use config::{ControllerConfig, FrameSourceConfig, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use controller::TrafficController;
use crossroads_core::{SignalScheduler, ThreadClock};
use crossroads_cv::ShapeDetector;
use display::{CancelFlag, Display, HeadlessDisplay, WindowDisplay};
use signals::{LoggedPins, PinSignalOutput};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Adaptive signal controller for a three-lane toy intersection
#[derive(Debug, Parser)]
#[command(name = "crossroads", version)]
struct Cli {
    /// JSON configuration file; defaults apply to anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a still image instead of reading the camera.
    #[arg(long, conflicts_with = "camera")]
    image: Option<PathBuf>,

    /// Camera device index.
    #[arg(long)]
    camera: Option<i32>,

    /// Run without a window. Stop with Ctrl-C or --cycles.
    #[arg(long)]
    headless: bool,

    /// Stop after this many signal cycles.
    #[arg(long)]
    cycles: Option<u64>,

    /// Write the annotated frame of every iteration to this file.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<ControllerConfig> {
        let mut config = match &self.config {
            Some(path) => ControllerConfig::load(path)?,
            None => ControllerConfig::default(),
        };

        if let Some(path) = &self.image {
            config.source = FrameSourceConfig::StillImage { path: path.clone() };
        }
        if let Some(index) = self.camera {
            let (width, height) = match &config.source {
                FrameSourceConfig::Camera { width, height, .. } => (*width, *height),
                FrameSourceConfig::StillImage { .. } => (DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT),
            };
            config.source = FrameSourceConfig::Camera { index, width, height };
        }
        if self.cycles.is_some() {
            config.max_cycles = self.cycles;
        }
        if self.snapshot.is_some() {
            config.snapshot_path = self.snapshot.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crossroads=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("Crossroads signal controller starting");

    // The controller owns camera, pins and window. Dropping it on any exit
    // path releases the camera, drives every pin low and closes the window.
    // Ctrl-C is honoured at the top of the next iteration so that the
    // destructors still run.
    let cancel = CancelFlag::new();
    cancel.install_ctrlc_handler()?;

    let source = open_source(&config.source)?;
    let display: Box<dyn Display> = if cli.headless {
        Box::new(HeadlessDisplay::new(cancel.clone()))
    } else {
        Box::new(WindowDisplay::open(&config.window_title, cancel.clone())?)
    };
    let output = PinSignalOutput::new(config.pins.clone(), LoggedPins)?;

    let mut controller = TrafficController::new(
        source,
        output,
        ThreadClock,
        display,
        ShapeDetector::new(config.detection.clone()),
        config.lanes.clone(),
        SignalScheduler::new(config.timing.clone()),
    )
    .with_max_cycles(config.max_cycles)
    .with_snapshot_path(config.snapshot_path.clone());

    let summary = controller.run()?;
    info!(
        cycles = summary.cycles,
        cancelled = summary.cancelled,
        "Last counts: {}",
        summary
            .last_counts
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(())
}
