//! Sim3: rotation + translation + uniform scale, used as the local and world
//! transform of every scene node.
//!
//! Transforms points as: p' = s * R * p + t
//!
//! This is the same composition a scene-graph node applies with a
//! translate-rotate-scale local matrix, so chaining `compose` from the root
//! down yields each node's world transform.

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Similarity transformation: rotation + translation + uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sim3 {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
    pub scale: f64,
}

impl Sim3 {
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
            scale: 1.0,
        }
    }

    /// Pure translation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Rotation given as Euler angles in degrees, applied in X-then-Y-then-Z
    /// intrinsic order (matrix R = Rx * Ry * Rz).
    pub fn from_euler_deg(angles_deg: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation: euler_xyz_deg(angles_deg),
            translation,
            scale: 1.0,
        }
    }

    /// Homogeneous `[s*R | t]` matrix.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let sr = self.rotation.to_rotation_matrix().into_inner() * self.scale;
        let mut mat = Matrix4::identity();
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(&sr);
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        mat
    }

    /// `self ∘ child`: a child's local transform lifted into this frame.
    pub fn compose(&self, child: &Sim3) -> Self {
        Self {
            rotation: self.rotation * child.rotation,
            translation: self.scale * (self.rotation * child.translation) + self.translation,
            scale: self.scale * child.scale,
        }
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.scale * (self.rotation * p.coords) + self.translation)
    }
}

impl Default for Sim3 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Euler XYZ (degrees) to quaternion, R = Rx(ax) * Ry(ay) * Rz(az).
///
/// `UnitQuaternion::from_euler_angles` uses the opposite (Z-Y-X) order, so the
/// three axis rotations are composed explicitly.
pub fn euler_xyz_deg(angles_deg: Vector3<f64>) -> UnitQuaternion<f64> {
    let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles_deg.x.to_radians());
    let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles_deg.y.to_radians());
    let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles_deg.z.to_radians());
    rx * ry * rz
}
