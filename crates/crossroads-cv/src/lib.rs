//! Crossroads Computer Vision Library
//!
//! Turns a BGR camera frame into lane-classified vehicle blobs using OpenCV.

pub mod blob;
pub mod detection;
pub mod overlay;
pub mod utils;

// Re-export commonly used types
pub use blob::{Blob, BlobCollection};
pub use detection::{DetectionConfig, FrameDetection, ShapeDetector, ShapeFilter};
pub use overlay::{OverlayConfig, OverlayRenderer};

// Error handling
pub type Result<T> = anyhow::Result<T>;
