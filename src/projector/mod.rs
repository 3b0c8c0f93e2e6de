//! Screen-space bounding box of the posed hand.
//!
//! Every vertex of every mesh under the hand root is taken to world space,
//! through the camera's view-projection to NDC and then to pixels. The box is
//! the min/max over all projected vertices; a degenerate extent means the hand
//! is not visible and yields `None`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{PerspectiveCamera, Viewport};
use crate::rig::{JointHierarchy, NodeId};

/// Axis-aligned box in pixels, origin top-left.
///
/// Serialized as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Box spanning the given extent, or `None` when the width or height is
    /// non-finite, zero or negative.
    pub fn from_extent(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Option<Self> {
        let width = max_x - min_x;
        let height = max_y - min_y;
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(width) && valid(height)) {
            return None;
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width,
            height,
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test with a tolerance in pixels.
    pub fn contains(&self, px: f64, py: f64, tolerance: f64) -> bool {
        px >= self.x - tolerance
            && px <= self.x + self.width + tolerance
            && py >= self.y - tolerance
            && py <= self.y + self.height + tolerance
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            width: v[2],
            height: v[3],
        }
    }
}

/// Running min/max over projected pixels.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, px: f64, py: f64) {
        self.min_x = self.min_x.min(px);
        self.min_y = self.min_y.min(py);
        self.max_x = self.max_x.max(px);
        self.max_y = self.max_y.max(py);
    }
}

/// Bounding box of the whole hand.
pub fn project(
    hand: &JointHierarchy,
    camera: &PerspectiveCamera,
    viewport: Viewport,
) -> Option<BoundingBox> {
    project_under(hand, hand.root(), camera, viewport)
}

/// Bounding box of every mesh under `root`.
///
/// Vertices at or behind the camera plane are skipped; if none remain the
/// extent stays infinite and the result is `None`.
pub fn project_under(
    hand: &JointHierarchy,
    root: NodeId,
    camera: &PerspectiveCamera,
    viewport: Viewport,
) -> Option<BoundingBox> {
    let mut extent = Extent::empty();
    let mut skipped = 0usize;

    for posed in hand.posed_meshes_under(root) {
        for world in posed.world_vertices() {
            match camera.project(&world) {
                Some(ndc) => {
                    let (px, py) = viewport.ndc_to_pixel(&ndc);
                    extent.include(px, py);
                }
                None => skipped += 1,
            }
        }
    }

    let bbox = BoundingBox::from_extent(extent.min_x, extent.min_y, extent.max_x, extent.max_y);
    if bbox.is_none() {
        trace!("No bounding box ({} vertices behind the camera)", skipped);
    }
    bbox
}
