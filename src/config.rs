//! Controller configuration loaded from JSON

use crate::signals::PinMap;
use anyhow::{Context, Result};
use crossroads_core::{LaneLayout, TimingPolicy};
use crossroads_cv::DetectionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where frames come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSourceConfig {
    Camera { index: i32, width: u32, height: u32 },
    StillImage { path: PathBuf },
}

/// Resolution the default lane regions are drawn for
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

impl Default for FrameSourceConfig {
    fn default() -> Self {
        FrameSourceConfig::Camera {
            index: 0,
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

/// Everything the controller needs, with defaults for every field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub source: FrameSourceConfig,
    pub lanes: LaneLayout,
    pub detection: DetectionConfig,
    pub timing: TimingPolicy,
    pub pins: PinMap,
    pub window_title: String,
    /// Stop after this many cycles; run until cancelled when absent.
    pub max_cycles: Option<u64>,
    /// Write the latest annotated frame here every iteration.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            source: FrameSourceConfig::default(),
            lanes: LaneLayout::default(),
            detection: DetectionConfig::default(),
            timing: TimingPolicy::default(),
            pins: PinMap::default(),
            window_title: "Traffic Detection".to_string(),
            max_cycles: None,
            snapshot_path: None,
        }
    }
}

impl ControllerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: ControllerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that serde cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        self.timing.validate().context("Invalid timing policy")?;
        self.pins.validate().context("Invalid pin map")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_object_is_default() {
        let config: ControllerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_still_image_source() {
        let config: ControllerConfig = serde_json::from_str(
            r#"{"source": {"still_image": {"path": "bench.png"}}, "timing": {"yellow": 1}}"#,
        )
        .unwrap();

        assert_eq!(
            config.source,
            FrameSourceConfig::StillImage {
                path: "bench.png".into()
            }
        );
        assert_eq!(config.timing.yellow, Duration::from_secs(1));
        assert_eq!(config.timing.high_green, Duration::from_secs(12));
    }

    #[test]
    fn test_overlapping_lanes_rejected() {
        let json = r#"{"lanes": [
            {"x1":0,"y1":0,"x2":300,"y2":300},
            {"x1":200,"y1":0,"x2":400,"y2":300},
            {"x1":500,"y1":0,"x2":600,"y2":300}
        ]}"#;
        assert!(serde_json::from_str::<ControllerConfig>(json).is_err());
    }

    #[test]
    fn test_load_validates_timing() {
        let dir = std::env::temp_dir().join(format!("crossroads-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad_timing.json");
        fs::write(&path, r#"{"timing": {"base_green": 0}}"#).unwrap();

        let err = ControllerConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("base green"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
