//! Detection configuration

use crate::overlay::OverlayConfig;
use serde::{Deserialize, Serialize};

/// Main detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Gray level at or below which a pixel counts as vehicle (inverse binarization).
    pub binary_threshold: f64,
    /// Side of the square Gaussian kernel; must be odd.
    pub blur_kernel: i32,
    pub shape_filter: ShapeFilter,
    pub overlay: OverlayConfig,
}

/// Which contours survive as vehicle candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeFilter {
    /// Minimum enclosed area in source pixels
    pub min_area: f64,
    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub epsilon_fraction: f64,
    /// Fewer approximated vertices than this is treated as round noise
    pub min_vertices: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            binary_threshold: 100.0,
            blur_kernel: 5,
            shape_filter: ShapeFilter::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self {
            min_area: 500.0,
            epsilon_fraction: 0.02,
            min_vertices: 4,
        }
    }
}

impl ShapeFilter {
    pub fn accepts_area(&self, area: f64) -> bool {
        area >= self.min_area
    }

    pub fn accepts_vertices(&self, vertices: usize) -> bool {
        vertices >= self.min_vertices
    }

    pub fn accepts(&self, area: f64, vertices: usize) -> bool {
        self.accepts_area(area) && self.accepts_vertices(vertices)
    }

    pub fn epsilon(&self, perimeter: f64) -> f64 {
        self.epsilon_fraction * perimeter
    }
}

impl DetectionConfig {
    /// Kernel forced to an odd size of at least 1, as Gaussian blur requires.
    pub fn effective_blur_kernel(&self) -> i32 {
        let k = self.blur_kernel.max(1);
        if k % 2 == 0 { k + 1 } else { k }
    }
}
