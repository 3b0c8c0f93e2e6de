//! Renderable primitives.

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};

/// Number of sides used for every capsule-like segment.
pub const RADIAL_SEGMENTS: u32 = 8;

/// Indexed triangle mesh in node-local coordinates.
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    /// Base colour, RGB.
    pub color: [u8; 3],
}

impl MeshPrimitive {
    /// Closed cylinder centred on the origin with its axis along local +Y.
    ///
    /// The side is one band of `radial_segments` quads (seam vertex duplicated)
    /// and each cap is a triangle fan around its own centre vertex.
    pub fn cylinder(radius: f64, height: f64, radial_segments: u32, color: [u8; 3]) -> Self {
        let n = radial_segments.max(3);
        let half = height / 2.0;
        let mut vertices = Vec::with_capacity(((n + 1) * 2 + 2 * (2 * n + 1)) as usize);
        let mut triangles = Vec::with_capacity((n * 4) as usize);

        let ring = |i: u32, y: f64| {
            let theta = i as f64 / n as f64 * TAU;
            Point3::new(radius * theta.sin(), y, radius * theta.cos())
        };

        // Side band: top ring then bottom ring.
        for y in [half, -half] {
            for i in 0..=n {
                vertices.push(ring(i, y));
            }
        }
        for i in 0..n {
            let a = i;
            let b = i + n + 1;
            let c = i + n + 2;
            let d = i + 1;
            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }

        for (y, top) in [(half, true), (-half, false)] {
            let centre_start = vertices.len() as u32;
            for _ in 0..n {
                vertices.push(Point3::new(0.0, y, 0.0));
            }
            let ring_start = vertices.len() as u32;
            for i in 0..=n {
                vertices.push(ring(i, y));
            }
            for i in 0..n {
                let centre = centre_start + i;
                let (r0, r1) = (ring_start + i, ring_start + i + 1);
                if top {
                    triangles.push([r0, r1, centre]);
                } else {
                    triangles.push([r1, r0, centre]);
                }
            }
        }

        Self {
            vertices,
            triangles,
            color,
        }
    }

    /// Unnormalized face normal of triangle `t` given already-transformed vertices.
    pub fn face_normal(positions: &[Point3<f64>], t: &[u32; 3]) -> Vector3<f64> {
        let a = positions[t[0] as usize];
        let b = positions[t[1] as usize];
        let c = positions[t[2] as usize];
        (b - a).cross(&(c - a))
    }
}
