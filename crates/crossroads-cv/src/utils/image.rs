//! Frame conversions at the camera boundary
//!
//! The `image` crate hands over RGB; everything downstream of this module
//! works on BGR, as OpenCV expects. opencv-match performs the channel swap
//! when it builds the Mat.

use crate::Result;
use anyhow::{bail, Context};
use opencv::{
    core::{Mat, Vector},
    imgcodecs,
};
use opencv_match::prelude::*;
use std::path::Path;

/// Image utility functions leveraging opencv-match conversions
pub struct ImageUtils;

impl ImageUtils {
    /// Load an image file as a BGR frame
    pub fn load_bgr<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgb8();

        Self::rgb_image_to_bgr(&img)
    }

    /// Convert image::RgbImage to a BGR Mat using opencv-match
    pub fn rgb_image_to_bgr(rgb_image: &image::RgbImage) -> Result<Mat> {
        rgb_image
            .try_into_cv()
            .context("Failed to convert RGB image to OpenCV Mat")
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();

        let written = imgcodecs::imwrite(&path_str, mat, &Vector::new())
            .with_context(|| format!("Failed to save image: {}", path_str))?;
        if !written {
            bail!("OpenCV refused to write image: {}", path_str);
        }

        Ok(())
    }
}
