//! YAML run configuration.
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes:
//!
//! ```yaml
//! viewport: { width: 320, height: 240 }
//! sweep: { max_frames: 4, max_y_pos: 3 }
//! output: { dir: out/run-1, tick_delay_ms: 0 }
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::{OrbitCamera, PerspectiveCamera, Viewport};
use crate::render::RenderSettings;
use crate::sequencer::SweepConfig;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Viewport must be non-empty, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("sweep.max_frames must be at least 1")]
    NoFrames,

    #[error("sweep.{field} must be non-negative, got {value}")]
    NegativeExtent { field: &'static str, value: i32 },

    #[error("camera.fov_y_deg must lie in (0, 180), got {0}")]
    InvalidFov(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_y_deg: f64,
    pub orbit: OrbitCamera,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            orbit: OrbitCamera::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    /// Write `frame-{n}.png` per capture.
    pub save_images: bool,
    /// Pause between sweep ticks.
    pub tick_delay_ms: u64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            save_images: true,
            tick_delay_ms: 100,
        }
    }
}

impl OutputSettings {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub viewport: Viewport,
    pub camera: CameraSettings,
    pub sweep: SweepConfig,
    pub render: RenderSettings,
    pub output: OutputSettings,
}

impl SynthConfig {
    /// Read and validate a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config: SynthConfig = serde_yaml::from_reader(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )
        .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::EmptyViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if self.sweep.max_frames == 0 {
            return Err(ConfigError::NoFrames);
        }
        for (field, value) in [
            ("max_y_pos", self.sweep.max_y_pos),
            ("max_z_pos", self.sweep.max_z_pos),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeExtent { field, value });
            }
        }
        let fov = self.camera.fov_y_deg;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::InvalidFov(fov));
        }
        Ok(())
    }

    /// Camera placed by the configured orbit.
    pub fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::orbiting(self.camera.fov_y_deg, self.viewport, &self.camera.orbit)
    }
}
