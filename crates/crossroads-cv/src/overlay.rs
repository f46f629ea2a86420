//! Annotated view of a processed frame

use crate::blob::Blob;
use crate::detection::FrameDetection;
use crate::Result;
use anyhow::Context;
use crossroads_core::{LaneIndex, LaneLayout, LaneRegion, LANE_COUNT};
use opencv::{
    core::{self, Mat, Point, Rect, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use serde::{Deserialize, Serialize};

/// Region fill/border colors per lane (BGR): blue, red, cyan
const LANE_COLORS: [(u8, u8, u8); LANE_COUNT] = [(255, 0, 0), (0, 0, 255), (255, 255, 0)];
/// Vehicle box colors per lane (BGR): green, orange, pink
const VEHICLE_COLORS: [(u8, u8, u8); LANE_COUNT] = [(0, 255, 0), (0, 165, 255), (255, 0, 255)];
const UNASSIGNED_COLOR: (u8, u8, u8) = (255, 255, 255);

/// Visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub draw_regions: bool,
    pub draw_blobs: bool,
    pub draw_counts: bool,
    /// Opacity of the lane fill, 0.0 to 1.0
    pub region_alpha: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            draw_regions: true,
            draw_blobs: true,
            draw_counts: true,
            region_alpha: 0.2,
        }
    }
}

fn scalar((b, g, r): (u8, u8, u8)) -> Scalar {
    Scalar::new(b as f64, g as f64, r as f64, 255.0)
}

/// Pixel rectangle covering the closed region, x2/y2 included.
fn region_rect(region: &LaneRegion) -> Rect {
    Rect::new(region.x1, region.y1, region.width() + 1, region.height() + 1)
}

/// Draws lanes, blobs and counts onto a copy of the frame
pub struct OverlayRenderer {
    config: OverlayConfig,
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, frame: &Mat, layout: &LaneLayout, detection: &FrameDetection) -> Result<Mat> {
        let mut output = frame.clone();

        if self.config.draw_regions {
            self.draw_regions(&mut output, layout)
                .context("Failed to draw lane regions")?;
        }
        if self.config.draw_blobs {
            self.draw_blobs(&mut output, detection)
                .context("Failed to draw blobs")?;
        }
        if self.config.draw_counts {
            self.draw_counts(&mut output, detection)
                .context("Failed to draw counts")?;
        }

        Ok(output)
    }

    fn draw_regions(&self, output: &mut Mat, layout: &LaneLayout) -> Result<()> {
        let mut filled = output.clone();
        for (lane, region) in layout.iter() {
            imgproc::rectangle(
                &mut filled,
                region_rect(region),
                scalar(LANE_COLORS[lane.get()]),
                imgproc::FILLED,
                LINE_8,
                0,
            )?;
        }

        let alpha = self.config.region_alpha.clamp(0.0, 1.0);
        let mut blended = Mat::default();
        core::add_weighted(&filled, alpha, &*output, 1.0 - alpha, 0.0, &mut blended, -1)?;
        *output = blended;

        for (lane, region) in layout.iter() {
            let color = scalar(LANE_COLORS[lane.get()]);
            imgproc::rectangle(output, region_rect(region), color, 2, LINE_8, 0)?;
            imgproc::put_text(
                output,
                &format!("Lane {}", lane.number()),
                Point::new(region.x1, region.y1 - 10),
                FONT_HERSHEY_SIMPLEX,
                0.5,
                color,
                2,
                LINE_8,
                false,
            )?;
        }
        Ok(())
    }

    fn draw_blobs(&self, output: &mut Mat, detection: &FrameDetection) -> Result<()> {
        let mut seen = [0u32; LANE_COUNT];

        for blob in detection.blobs.iter() {
            match blob.lane {
                Some(lane) => {
                    seen[lane.get()] += 1;
                    self.draw_vehicle(output, blob, lane, seen[lane.get()])?;
                }
                None => {
                    imgproc::rectangle(output, blob.to_rect(), scalar(UNASSIGNED_COLOR), 1, LINE_8, 0)?;
                }
            }
        }
        Ok(())
    }

    fn draw_vehicle(&self, output: &mut Mat, blob: &Blob, lane: LaneIndex, ordinal: u32) -> Result<()> {
        let color = scalar(VEHICLE_COLORS[lane.get()]);
        imgproc::rectangle(output, blob.to_rect(), color, 2, LINE_8, 0)?;
        imgproc::put_text(
            output,
            &format!("Car {}", ordinal),
            Point::new(blob.x, blob.y - 5),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            1,
            LINE_8,
            false,
        )?;
        Ok(())
    }

    fn draw_counts(&self, output: &mut Mat, detection: &FrameDetection) -> Result<()> {
        for (lane, count) in detection.counts.iter() {
            imgproc::put_text(
                output,
                &format!("Lane {}: {} cars", lane.number(), count),
                Point::new(10, 30 + lane.get() as i32 * 30),
                FONT_HERSHEY_SIMPLEX,
                0.8,
                scalar(LANE_COLORS[lane.get()]),
                2,
                LINE_8,
                false,
            )?;
        }
        Ok(())
    }
}
