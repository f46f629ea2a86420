//! Brightness-threshold blob detector

use super::config::DetectionConfig;
use crate::blob::{Blob, BlobCollection};
use crate::Result;
use anyhow::Context;
use crossroads_core::{CountVector, LaneLayout};
use opencv::{
    core::{self, Mat, Point, Size, Vector},
    imgproc,
    prelude::*,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Everything learned from one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameDetection {
    /// Accepted blobs, each tagged with its lane (or none)
    pub blobs: BlobCollection,
    pub counts: CountVector,
    pub stats: DetectionStats,
}

/// Detection statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionStats {
    pub contours: usize,
    pub rejected_area: usize,
    pub rejected_shape: usize,
    pub accepted: usize,
    pub unassigned: usize,
    pub processing_time_ms: u64,
}

/// Finds dark, roughly polygonal blobs on a bright floor.
///
/// Assumes vehicles are darker than the floor they sit on. It is not a
/// classifier; anything dark and big enough counts.
pub struct ShapeDetector {
    config: DetectionConfig,
}

impl ShapeDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect, classify and count in one pass over a BGR frame.
    pub fn process_frame(&self, frame: &Mat, layout: &LaneLayout) -> Result<FrameDetection> {
        let start_time = std::time::Instant::now();

        let (blobs, mut stats) = self.detect_with_stats(frame)?;
        let blobs = blobs.classify(layout);
        let counts = blobs.counts();

        stats.unassigned = blobs.unassigned().count();
        stats.processing_time_ms = start_time.elapsed().as_millis() as u64;

        if blobs.is_empty() {
            warn!("No vehicle candidates in frame");
        }
        debug!(
            contours = stats.contours,
            accepted = stats.accepted,
            unassigned = stats.unassigned,
            "Frame counts {}",
            counts
        );

        Ok(FrameDetection {
            blobs,
            counts,
            stats,
        })
    }

    /// Candidate blobs in a BGR frame, not yet assigned to lanes.
    pub fn detect(&self, frame: &Mat) -> Result<BlobCollection> {
        self.detect_with_stats(frame).map(|(blobs, _)| blobs)
    }

    fn detect_with_stats(&self, frame: &Mat) -> Result<(BlobCollection, DetectionStats)> {
        let mask = self.binarize(frame)?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            &mask,
            &mut contours,
            imgproc::RETR_TREE,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .context("Contour extraction failed")?;

        let mut stats = DetectionStats {
            contours: contours.len(),
            ..Default::default()
        };
        let mut blobs = BlobCollection::new();
        let filter = &self.config.shape_filter;

        for contour in contours.iter() {
            let area = imgproc::contour_area(&contour, false)?;
            if !filter.accepts_area(area) {
                stats.rejected_area += 1;
                continue;
            }

            let perimeter = imgproc::arc_length(&contour, true)?;
            let mut approx = Vector::<Point>::new();
            imgproc::approx_poly_dp(&contour, &mut approx, filter.epsilon(perimeter), true)?;
            if !filter.accepts_vertices(approx.len()) {
                debug!(area, vertices = approx.len(), "Rejected round contour");
                stats.rejected_shape += 1;
                continue;
            }

            let rect = imgproc::bounding_rect(&contour)?;
            blobs.push(Blob::from_rect(rect, area, approx.len()));
        }

        stats.accepted = blobs.len();
        Ok((blobs, stats))
    }

    /// Gray, blur and inverse-threshold so that dark pixels become 255.
    pub fn binarize(&self, frame: &Mat) -> Result<Mat> {
        let gray = if frame.channels() == 1 {
            frame.clone()
        } else {
            let mut gray = Mat::default();
            imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
                .context("Grayscale conversion failed")?;
            gray
        };

        let k = self.config.effective_blur_kernel();
        let mut blurred = Mat::default();
        imgproc::gaussian_blur(&gray, &mut blurred, Size::new(k, k), 0.0, 0.0, core::BORDER_DEFAULT)
            .context("Gaussian blur failed")?;

        let mut mask = Mat::default();
        imgproc::threshold(
            &blurred,
            &mut mask,
            self.config.binary_threshold,
            255.0,
            imgproc::THRESH_BINARY_INV,
        )
        .context("Thresholding failed")?;

        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossroads_core::LaneIndex;
    use opencv::core::{Rect, Scalar, CV_8UC3};

    fn floor() -> Result<Mat> {
        Ok(Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(230.0))?)
    }

    fn park_car(frame: &mut Mat, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
        imgproc::rectangle(frame, Rect::new(x, y, w, h), Scalar::all(20.0), imgproc::FILLED, imgproc::LINE_8, 0)?;
        Ok(())
    }

    fn detector() -> ShapeDetector {
        ShapeDetector::new(DetectionConfig::default())
    }

    #[test]
    fn test_empty_floor_counts_nothing() -> Result<()> {
        let detection = detector().process_frame(&floor()?, &LaneLayout::default())?;

        assert!(detection.blobs.is_empty());
        assert_eq!(detection.counts.as_array(), [0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_cars_counted_per_lane() -> Result<()> {
        let mut frame = floor()?;
        park_car(&mut frame, 480, 40, 60, 40)?; // lane 1
        park_car(&mut frame, 520, 180, 60, 40)?; // lane 1
        park_car(&mut frame, 260, 100, 60, 40)?; // lane 2
        park_car(&mut frame, 60, 200, 60, 40)?; // lane 3

        let detection = detector().process_frame(&frame, &LaneLayout::default())?;

        assert_eq!(detection.counts.as_array(), [2, 1, 1]);
        for blob in detection.blobs.iter() {
            assert!(blob.area >= 500.0);
            assert!(blob.vertices >= 4);
        }
        Ok(())
    }

    #[test]
    fn test_small_specks_are_ignored() -> Result<()> {
        let mut frame = floor()?;
        park_car(&mut frame, 300, 100, 15, 15)?;

        let detection = detector().process_frame(&frame, &LaneLayout::default())?;

        assert!(detection.blobs.is_empty());
        assert_eq!(detection.stats.rejected_area, 1);
        Ok(())
    }

    #[test]
    fn test_triangles_are_rejected() -> Result<()> {
        let mut frame = floor()?;
        let triangle = Vector::<Point>::from_iter([
            Point::new(100, 40),
            Point::new(180, 220),
            Point::new(20, 220),
        ]);
        imgproc::fill_convex_poly(&mut frame, &triangle, Scalar::all(20.0), imgproc::LINE_8, 0)?;

        let detection = detector().process_frame(&frame, &LaneLayout::default())?;

        assert_eq!(detection.counts.as_array(), [0, 0, 0]);
        assert_eq!(detection.stats.rejected_shape, 1);
        Ok(())
    }

    #[test]
    fn test_blobs_outside_lanes_are_kept_but_not_counted() -> Result<()> {
        let mut frame = floor()?;
        park_car(&mut frame, 280, 380, 60, 40)?; // below the lane strips

        let detection = detector().process_frame(&frame, &LaneLayout::default())?;

        assert_eq!(detection.blobs.len(), 1);
        assert_eq!(detection.blobs.unassigned().count(), 1);
        assert_eq!(detection.counts.as_array(), [0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_centroid_near_box_center() -> Result<()> {
        let mut frame = floor()?;
        park_car(&mut frame, 280, 100, 60, 40)?;

        let blobs = detector().detect(&frame)?;
        assert_eq!(blobs.len(), 1);

        let centroid = blobs.as_slice()[0].centroid();
        assert!((centroid.x - 310).abs() <= 1);
        assert!((centroid.y - 120).abs() <= 1);
        assert_eq!(LaneLayout::default().classify(centroid), LaneIndex::new(1));
        Ok(())
    }

    #[test]
    fn test_binarize_marks_dark_pixels() -> Result<()> {
        let mut frame = floor()?;
        park_car(&mut frame, 100, 100, 50, 50)?;

        let mask = detector().binarize(&frame)?;

        assert_eq!(*mask.at_2d::<u8>(125, 125)?, 255);
        assert_eq!(*mask.at_2d::<u8>(10, 10)?, 0);
        Ok(())
    }
}
