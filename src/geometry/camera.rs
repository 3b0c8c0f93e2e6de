//! Perspective camera, orbit placement and NDC → pixel mapping.
//!
//! Conventions follow OpenGL: the camera looks down its local -Z, clip space
//! is produced by a right-handed perspective matrix and NDC spans [-1, 1] on
//! every axis. Pixel space has its origin at the top-left corner, so NDC +Y
//! maps to pixel -Y.

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Minimum clip-space w for a point to count as in front of the camera.
const MIN_CLIP_W: f64 = 1e-9;

/// Orbit distance limits, in scene units.
pub const MIN_ORBIT_DISTANCE: f64 = 3.0;
pub const MAX_ORBIT_DISTANCE: f64 = 15.0;

/// Raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Map an NDC point to pixel coordinates (origin top-left, y down).
    pub fn ndc_to_pixel(&self, ndc: &Point3<f64>) -> (f64, f64) {
        let px = (ndc.x * 0.5 + 0.5) * self.width as f64;
        let py = (ndc.y * -0.5 + 0.5) * self.height as f64;
        (px, py)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Camera placement on a sphere around the origin.
///
/// `angle_x` is elevation, `angle_y` is azimuth, both in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    pub distance: f64,
    pub angle_x: f64,
    pub angle_y: f64,
}

impl OrbitCamera {
    /// Eye position after clamping distance and elevation to their limits.
    pub fn eye(&self) -> Point3<f64> {
        let distance = self.distance.clamp(MIN_ORBIT_DISTANCE, MAX_ORBIT_DISTANCE);
        let ax = self
            .angle_x
            .clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2);
        let ay = self.angle_y;
        Point3::new(
            distance * ay.sin() * ax.cos(),
            distance * ax.sin(),
            distance * ay.cos() * ax.cos(),
        )
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            distance: 8.0,
            angle_x: 0.0,
            angle_y: 0.0,
        }
    }
}

/// Pinhole perspective camera with a look-at pose.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    view_projection: Matrix4<f64>,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut cam = Self {
            fov_y_deg,
            aspect,
            near,
            far,
            eye: Point3::new(0.0, 0.0, 1.0),
            target: Point3::origin(),
            view_projection: Matrix4::identity(),
        };
        cam.update_matrices();
        cam
    }

    /// Camera placed by an orbit around the origin, looking at the origin.
    pub fn orbiting(fov_y_deg: f64, viewport: Viewport, orbit: &OrbitCamera) -> Self {
        let mut cam = Self::new(fov_y_deg, viewport.aspect(), 0.1, 1000.0);
        cam.look_at(orbit.eye(), Point3::origin());
        cam
    }

    pub fn look_at(&mut self, eye: Point3<f64>, target: Point3<f64>) {
        self.eye = eye;
        self.target = target;
        self.update_matrices();
    }

    fn update_matrices(&mut self) {
        let view = Isometry3::look_at_rh(&self.eye, &self.target, &up_for(&self.eye, &self.target));
        let projection = Perspective3::new(self.aspect, self.fov_y_deg.to_radians(), self.near, self.far);
        self.view_projection = projection.to_homogeneous() * view.to_homogeneous();
    }

    /// World point to homogeneous clip coordinates.
    pub fn project_clip(&self, p: &Point3<f64>) -> Vector4<f64> {
        self.view_projection * p.to_homogeneous()
    }

    /// World point to NDC. `None` when the point is at or behind the camera
    /// plane, where the perspective divide is meaningless.
    pub fn project(&self, p: &Point3<f64>) -> Option<Point3<f64>> {
        let clip = self.project_clip(p);
        if clip.w <= MIN_CLIP_W {
            return None;
        }
        Some(Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w))
    }
}

/// World +Y, unless the view direction is parallel to it.
fn up_for(eye: &Point3<f64>, target: &Point3<f64>) -> Vector3<f64> {
    let dir = target - eye;
    if dir.cross(&Vector3::y()).norm_squared() < 1e-12 {
        Vector3::z()
    } else {
        Vector3::y()
    }
}
