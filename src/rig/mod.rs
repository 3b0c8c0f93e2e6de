//! Kinematic hand rig.
//!
//! - [`joint`] - joint keys (`"{part}_{index}"`) and arena ids
//! - [`mesh`] - renderable primitives
//! - [`hierarchy`] - the joint tree, pose setting and forward kinematics
//! - [`hand`] - the fixed hand topology

pub mod hand;
pub mod hierarchy;
pub mod joint;
pub mod mesh;

pub use hand::{HandTopology, build_hand, build_hand_with};
pub use hierarchy::{JointHierarchy, NodeKind, PosedMesh};
pub use joint::{FingerPart, JointKey, MeshId, NodeId};
pub use mesh::MeshPrimitive;

/// Errors raised by rig construction and strict pose setting.
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("unknown joint: {0}")]
    UnknownJoint(String),

    #[error("invalid joint key: {0}")]
    InvalidJointKey(String),

    #[error("duplicate joint: {0}")]
    DuplicateJoint(String),

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
}
