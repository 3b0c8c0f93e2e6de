//! Fixed hand topology and its construction.

use nalgebra::Vector3;
use tracing::debug;

use crate::geometry::Sim3;

use super::RigError;
use super::hierarchy::JointHierarchy;
use super::joint::{FingerPart, JointKey, NodeId};
use super::mesh::{MeshPrimitive, RADIAL_SEGMENTS};

/// Palm skin colour (`#FFE4C4`).
pub const PALM_COLOR: [u8; 3] = [0xFF, 0xE4, 0xC4];
/// Finger skin colour (`#FFDBB3`).
pub const FINGER_COLOR: [u8; 3] = [0xFF, 0xDB, 0xB3];

/// Where a digit attaches to the palm.
#[derive(Debug, Clone, Copy)]
pub struct FingerSpec {
    pub part: FingerPart,
    pub base_position: Vector3<f64>,
    /// Rotation of the whole chain about the palm's Z axis.
    pub base_rotation_z_deg: f64,
}

/// Palm capsule placement relative to the hand root.
#[derive(Debug, Clone, Copy)]
pub struct PalmSpec {
    pub radius: f64,
    pub height: f64,
    pub position: Vector3<f64>,
    pub rotation_deg: Vector3<f64>,
}

/// Immutable topology constants of the hand.
#[derive(Debug, Clone)]
pub struct HandTopology {
    pub palm: PalmSpec,
    pub fingers: Vec<FingerSpec>,
}

impl Default for HandTopology {
    fn default() -> Self {
        let finger = |part, x, y, z, rot| FingerSpec {
            part,
            base_position: Vector3::new(x, y, z),
            base_rotation_z_deg: rot,
        };
        Self {
            palm: PalmSpec {
                radius: 0.8,
                height: 0.6,
                position: Vector3::new(0.0, -0.5, 0.6),
                rotation_deg: Vector3::new(90.0, 0.0, 0.0),
            },
            fingers: vec![
                finger(FingerPart::Thumb, -0.6, -0.2, 0.4, 45.0),
                finger(FingerPart::Index, -0.4, 0.1, 0.6, 0.0),
                finger(FingerPart::Middle, 0.0, 0.2, 0.7, 0.0),
                finger(FingerPart::Ring, 0.4, 0.1, 0.6, 0.0),
                finger(FingerPart::Pinky, 0.7, -0.3, 0.4, 0.0),
            ],
        }
    }
}

/// Build the default hand.
pub fn build_hand() -> Result<JointHierarchy, RigError> {
    build_hand_with(&HandTopology::default())
}

/// Build a hand from explicit topology constants.
///
/// The root group is the `palm_0` joint. Each digit gets a base group at its
/// attachment point; every segment is a joint group holding a capsule centred
/// at half the segment length and a group at the segment's end that parents
/// the next joint.
pub fn build_hand_with(topology: &HandTopology) -> Result<JointHierarchy, RigError> {
    let mut rig = JointHierarchy::new();
    let root = rig.root();
    rig.register_joint(JointKey::palm(), root)?;

    let palm = &topology.palm;
    rig.add_mesh(
        root,
        Sim3::from_euler_deg(palm.rotation_deg, palm.position),
        MeshPrimitive::cylinder(palm.radius, palm.height, RADIAL_SEGMENTS, PALM_COLOR),
    )?;

    for spec in &topology.fingers {
        add_finger(&mut rig, root, spec)?;
    }

    debug!(
        "Built hand rig: {} nodes, {} joints",
        rig.len(),
        rig.joint_keys().len()
    );
    Ok(rig)
}

fn add_finger(rig: &mut JointHierarchy, root: NodeId, spec: &FingerSpec) -> Result<(), RigError> {
    let length = spec.part.segment_length();
    let radius = spec.part.segment_radius();

    let base = rig.add_group(
        root,
        Sim3::from_euler_deg(
            Vector3::new(0.0, 0.0, spec.base_rotation_z_deg),
            spec.base_position,
        ),
    )?;

    let mut current = base;
    for key in spec.part.joint_keys() {
        let joint = rig.add_group(current, Sim3::identity())?;
        rig.add_mesh(
            joint,
            Sim3::from_translation(Vector3::new(0.0, length / 2.0, 0.0)),
            MeshPrimitive::cylinder(radius, length, RADIAL_SEGMENTS, FINGER_COLOR),
        )?;
        rig.register_joint(key, joint)?;

        current = rig.add_group(joint, Sim3::from_translation(Vector3::new(0.0, length, 0.0)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_hand_registers_every_joint_once() {
        let rig = build_hand().unwrap();
        let keys: Vec<String> = rig.joint_keys().iter().map(|k| k.to_string()).collect();

        assert_eq!(keys.len(), 15);
        assert_eq!(keys[0], "palm_0");
        assert!(keys.contains(&"thumb_1".to_string()));
        assert!(!keys.contains(&"thumb_2".to_string()));
        assert!(keys.contains(&"pinky_2".to_string()));
    }

    #[test]
    fn test_palm_is_root() {
        let rig = build_hand().unwrap();
        assert_eq!(rig.joint_node(&JointKey::palm()), Some(rig.root()));
    }

    #[test]
    fn test_distal_joints_descend_from_proximal() {
        let rig = build_hand().unwrap();
        for part in FingerPart::FINGERS {
            let keys: Vec<JointKey> = part.joint_keys().collect();
            for pair in keys.windows(2) {
                let proximal = rig.joint_node(&pair[0]).unwrap();
                let distal = rig.joint_node(&pair[1]).unwrap();
                assert!(rig.is_descendant(distal, proximal), "{} under {}", pair[1], pair[0]);
            }
        }
    }

    #[test]
    fn test_one_mesh_per_segment_plus_palm() {
        let rig = build_hand().unwrap();
        assert_eq!(rig.posed_meshes().len(), 1 + 14);
    }

    #[test]
    fn test_rest_pose_middle_fingertip_height() {
        let rig = build_hand().unwrap();
        let tip_mesh = rig
            .posed_meshes()
            .into_iter()
            .filter(|m| m.mesh.color == FINGER_COLOR)
            .map(|m| m.world.transform_point(&Point3::origin()))
            .fold(f64::MIN, |acc, p| acc.max(p.y));

        // Middle base at y = 0.2, last capsule centred 2.5 segments up.
        assert_relative_eq!(tip_mesh, 0.2 + 2.5 * 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_palm_capsule_lies_flat() {
        let rig = build_hand().unwrap();
        let palm = rig
            .posed_meshes()
            .into_iter()
            .find(|m| m.mesh.color == PALM_COLOR)
            .unwrap();
        let zs: Vec<f64> = palm.world_vertices().map(|v| v.z).collect();
        let min_z = zs.iter().copied().fold(f64::MAX, f64::min);
        let max_z = zs.iter().copied().fold(f64::MIN, f64::max);

        // Axis rotated onto Z: thickness 0.6 around z = 0.6.
        assert_relative_eq!(min_z, 0.3, epsilon = 1e-12);
        assert_relative_eq!(max_z, 0.9, epsilon = 1e-12);
    }
}
