//! Frame sources. Every source hands out BGR frames.

use crate::config::FrameSourceConfig;
use anyhow::{bail, Context, Result};
use crossroads_cv::utils::ImageUtils;
use opencv::{core::Mat, prelude::*, videoio};
use std::path::Path;
use tracing::info;

/// Produces one frame per outer iteration
pub trait FrameSource {
    fn capture_frame(&mut self) -> Result<Mat>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture_frame(&mut self) -> Result<Mat> {
        (**self).capture_frame()
    }
}

/// Live camera through OpenCV's video capture.
///
/// The capture device is released when this is dropped.
pub struct CameraSource {
    capture: videoio::VideoCapture,
}

impl CameraSource {
    pub fn open(index: i32, width: u32, height: u32) -> Result<Self> {
        let mut capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open camera {}", index))?;
        if !capture.is_opened()? {
            bail!("Camera {} is not available", index);
        }
        capture.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
        // OpenCV capture backends deliver BGR already.
        capture.set(videoio::CAP_PROP_CONVERT_RGB, 1.0)?;

        info!("Camera {} opened at {}x{}", index, width, height);
        Ok(Self { capture })
    }
}

impl FrameSource for CameraSource {
    fn capture_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            bail!("Camera returned no frame");
        }
        Ok(frame)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if self.capture.release().is_ok() {
            info!("Camera released");
        }
    }
}

/// Replays one still image on every capture
pub struct StillImageSource {
    frame: Mat,
}

impl StillImageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let frame = ImageUtils::load_bgr(&path)?;
        info!("Replaying still image {:?}", path.as_ref());
        Ok(Self { frame })
    }

    #[cfg(test)]
    pub fn from_frame(frame: Mat) -> Self {
        Self { frame }
    }
}

impl FrameSource for StillImageSource {
    fn capture_frame(&mut self) -> Result<Mat> {
        Ok(self.frame.clone())
    }
}

/// Open whichever source the configuration names
pub fn open_source(config: &FrameSourceConfig) -> Result<Box<dyn FrameSource>> {
    Ok(match config {
        FrameSourceConfig::Camera { index, width, height } => {
            Box::new(CameraSource::open(*index, *width, *height)?)
        }
        FrameSourceConfig::StillImage { path } => Box::new(StillImageSource::open(path)?),
    })
}
