//! Rendering seam.
//!
//! The sweep only needs "turn the posed rig into a raster". [`FrameRenderer`]
//! is that seam; [`SoftwareRenderer`] is a small depth-buffered rasterizer
//! with flat Lambert shading, enough to produce training images without a
//! GPU.

mod software;

pub use software::SoftwareRenderer;

use std::path::PathBuf;

use anyhow::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::geometry::{PerspectiveCamera, Viewport};
use crate::rig::JointHierarchy;

/// Produces one raster of the current pose.
pub trait FrameRenderer {
    fn render(
        &mut self,
        hand: &JointHierarchy,
        camera: &PerspectiveCamera,
        viewport: Viewport,
    ) -> Result<RgbaImage>;
}

/// Lighting and background of the software renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// RGBA used wherever nothing is drawn and no background is loaded.
    pub clear_color: [u8; 4],
    /// Optional image stretched behind the hand.
    pub background: Option<PathBuf>,
    pub ambient: f64,
    pub diffuse: f64,
    /// Directional light, pointing from this position towards the origin.
    pub light_position: [f64; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: [0x2a, 0x2a, 0x2a, 0xff],
            background: None,
            ambient: 0.35,
            diffuse: 0.8,
            light_position: [6.0, 5.0, 15.0],
        }
    }
}
