//! Shape detection module

pub mod config;
pub mod detector;

pub use config::{DetectionConfig, ShapeFilter};
pub use detector::{DetectionStats, FrameDetection, ShapeDetector};
