use anyhow::{Result, bail};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use crate::geometry::{PerspectiveCamera, Viewport};
use crate::rig::{JointHierarchy, MeshPrimitive};

use super::{FrameRenderer, RenderSettings};

/// Projected triangle corner: pixel position plus NDC depth.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f64,
    y: f64,
    z: f64,
}

/// Depth-buffered triangle rasterizer.
pub struct SoftwareRenderer {
    settings: RenderSettings,
    background: Option<RgbaImage>,
    /// Background resized to the last viewport, reused across frames.
    scaled_background: Option<RgbaImage>,
}

impl SoftwareRenderer {
    /// Create a renderer. A background that fails to load is logged and
    /// skipped; rendering falls back to the clear colour.
    pub fn new(settings: RenderSettings) -> Self {
        let background = settings.background.as_ref().and_then(|path| {
            match image::open(path) {
                Ok(img) => {
                    debug!("Loaded background {}", path.display());
                    Some(img.to_rgba8())
                }
                Err(e) => {
                    warn!(
                        "Could not load background {}: {}. Continuing without it.",
                        path.display(),
                        e
                    );
                    None
                }
            }
        });
        Self {
            settings,
            background,
            scaled_background: None,
        }
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    fn clear(&mut self, viewport: Viewport) -> RgbaImage {
        let Some(bg) = &self.background else {
            return RgbaImage::from_pixel(
                viewport.width,
                viewport.height,
                Rgba(self.settings.clear_color),
            );
        };
        let stale = self
            .scaled_background
            .as_ref()
            .is_none_or(|s| s.dimensions() != (viewport.width, viewport.height));
        if stale {
            self.scaled_background = Some(imageops::resize(
                bg,
                viewport.width,
                viewport.height,
                FilterType::Triangle,
            ));
        }
        self.scaled_background
            .clone()
            .unwrap_or_else(|| RgbaImage::new(viewport.width, viewport.height))
    }

    /// Lambert shade for a world-space face.
    fn shade(&self, color: [u8; 3], normal: &Vector3<f64>) -> Rgba<u8> {
        let light = Vector3::from(self.settings.light_position);
        let lambert = if light.norm_squared() > 0.0 {
            normal.dot(&light.normalize()).max(0.0)
        } else {
            0.0
        };
        let intensity = (self.settings.ambient + self.settings.diffuse * lambert).clamp(0.0, 1.0);
        let c = color.map(|v| (v as f64 * intensity).round().clamp(0.0, 255.0) as u8);
        Rgba([c[0], c[1], c[2], 0xff])
    }

    fn draw_mesh(
        &self,
        canvas: &mut RgbaImage,
        depth: &mut [f64],
        mesh: &MeshPrimitive,
        world: &[Point3<f64>],
        camera: &PerspectiveCamera,
        viewport: Viewport,
    ) {
        let screen: Vec<Option<ScreenVertex>> = world
            .iter()
            .map(|p| {
                camera.project(p).map(|ndc| {
                    let (x, y) = viewport.ndc_to_pixel(&ndc);
                    ScreenVertex { x, y, z: ndc.z }
                })
            })
            .collect();

        for tri in &mesh.triangles {
            let (Some(a), Some(b), Some(c)) = (
                screen[tri[0] as usize],
                screen[tri[1] as usize],
                screen[tri[2] as usize],
            ) else {
                continue;
            };

            let mut normal = MeshPrimitive::face_normal(world, tri);
            if normal.norm_squared() == 0.0 {
                continue;
            }
            normal.normalize_mut();
            // Two-sided: face the normal towards the viewer.
            let centroid = Point3::from(
                (world[tri[0] as usize].coords
                    + world[tri[1] as usize].coords
                    + world[tri[2] as usize].coords)
                    / 3.0,
            );
            if normal.dot(&(camera.eye - centroid)) < 0.0 {
                normal = -normal;
            }
            let pixel = self.shade(mesh.color, &normal);
            fill_triangle(canvas, depth, viewport, [a, b, c], pixel);
        }
    }
}

impl FrameRenderer for SoftwareRenderer {
    fn render(
        &mut self,
        hand: &JointHierarchy,
        camera: &PerspectiveCamera,
        viewport: Viewport,
    ) -> Result<RgbaImage> {
        if viewport.width == 0 || viewport.height == 0 {
            bail!("Cannot render into a {}x{} viewport", viewport.width, viewport.height);
        }
        let mut canvas = self.clear(viewport);
        let mut depth = vec![f64::INFINITY; (viewport.width * viewport.height) as usize];

        for posed in hand.posed_meshes() {
            let world: Vec<Point3<f64>> = posed.world_vertices().collect();
            self.draw_mesh(&mut canvas, &mut depth, posed.mesh, &world, camera, viewport);
        }
        Ok(canvas)
    }
}

/// Signed doubled area of (a, b, p).
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Fill pixels whose centres fall inside the triangle, nearest depth wins.
fn fill_triangle(
    canvas: &mut RgbaImage,
    depth: &mut [f64],
    viewport: Viewport,
    [a, b, c]: [ScreenVertex; 3],
    pixel: Rgba<u8>,
) {
    let area = edge(&a, &b, c.x, c.y);
    if area == 0.0 || !area.is_finite() {
        return;
    }

    let w = viewport.width as f64;
    let h = viewport.height as f64;
    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0);
    let max_x = a.x.max(b.x).max(c.x).ceil().min(w - 1.0);
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0);
    let max_y = a.y.max(b.y).max(c.y).ceil().min(h - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
            let w0 = edge(&b, &c, px, py) / area;
            let w1 = edge(&c, &a, px, py) / area;
            let w2 = edge(&a, &b, px, py) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let z = w0 * a.z + w1 * b.z + w2 * c.z;
            if !(-1.0..=1.0).contains(&z) {
                continue;
            }
            let idx = (y * viewport.width + x) as usize;
            if z < depth[idx] {
                depth[idx] = z;
                canvas.put_pixel(x, y, pixel);
            }
        }
    }
}
