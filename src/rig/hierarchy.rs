//! Arena-backed joint tree with forward kinematics.
//!
//! Nodes live in a flat `Vec` and refer to their parent by [`NodeId`]. A node
//! can only be attached to a node that already exists, so parents always
//! precede children and world transforms are computed in one forward pass.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::geometry::Sim3;

use super::joint::{JointKey, MeshId, NodeId};
use super::mesh::MeshPrimitive;
use super::RigError;

/// What a node contributes to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Transform-only node.
    Group,
    /// Node that draws a primitive with its world transform.
    Mesh(MeshId),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    local: Sim3,
    kind: NodeKind,
}

/// A mesh together with the world transform it is drawn with.
#[derive(Debug, Clone, Copy)]
pub struct PosedMesh<'a> {
    pub node: NodeId,
    pub mesh: &'a MeshPrimitive,
    pub world: Sim3,
}

impl PosedMesh<'_> {
    /// Vertices of the primitive in world coordinates.
    pub fn world_vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.mesh.vertices.iter().map(|v| self.world.transform_point(v))
    }
}

/// The rig: a tree of nodes, some of which are named joints.
#[derive(Debug, Clone)]
pub struct JointHierarchy {
    nodes: Vec<Node>,
    meshes: Vec<MeshPrimitive>,
    joints: HashMap<JointKey, NodeId>,
    /// Registration order of `joints`.
    joint_order: Vec<JointKey>,
}

impl JointHierarchy {
    /// Hierarchy containing only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                local: Sim3::identity(),
                kind: NodeKind::Group,
            }],
            meshes: Vec::new(),
            joints: HashMap::new(),
            joint_order: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach an empty group under `parent`.
    pub fn add_group(&mut self, parent: NodeId, local: Sim3) -> Result<NodeId, RigError> {
        self.push_node(parent, local, NodeKind::Group)
    }

    /// Attach a mesh node under `parent`.
    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        local: Sim3,
        mesh: MeshPrimitive,
    ) -> Result<NodeId, RigError> {
        let mesh_id = MeshId(self.meshes.len());
        let node = self.push_node(parent, local, NodeKind::Mesh(mesh_id))?;
        self.meshes.push(mesh);
        Ok(node)
    }

    fn push_node(&mut self, parent: NodeId, local: Sim3, kind: NodeKind) -> Result<NodeId, RigError> {
        if parent.0 >= self.nodes.len() {
            return Err(RigError::UnknownNode(parent));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            local,
            kind,
        });
        Ok(id)
    }

    /// Name an existing node as a joint. Keys must be unique.
    pub fn register_joint(&mut self, key: JointKey, node: NodeId) -> Result<(), RigError> {
        if node.0 >= self.nodes.len() {
            return Err(RigError::UnknownNode(node));
        }
        if self.joints.contains_key(&key) {
            return Err(RigError::DuplicateJoint(key.to_string()));
        }
        self.joints.insert(key, node);
        self.joint_order.push(key);
        Ok(())
    }

    pub fn joint_node(&self, key: &JointKey) -> Option<NodeId> {
        self.joints.get(key).copied()
    }

    /// Joint keys in registration order.
    pub fn joint_keys(&self) -> &[JointKey] {
        &self.joint_order
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn local_transform(&self, node: NodeId) -> Option<&Sim3> {
        self.nodes.get(node.0).map(|n| &n.local)
    }

    /// Local transform of a joint, looked up by its string key.
    pub fn joint_transform(&self, key: &str) -> Option<&Sim3> {
        let key: JointKey = key.parse().ok()?;
        self.joint_node(&key).and_then(|n| self.local_transform(n))
    }

    /// Overwrite a joint's local rotation (Euler XYZ, degrees) and translation.
    ///
    /// The write is absolute: repeating a call leaves the same state. The
    /// joint's scale is preserved. Unknown keys change nothing and return
    /// `false`.
    pub fn set_joint_rotation(
        &mut self,
        key: &str,
        rotation_deg: Vector3<f64>,
        translation: Vector3<f64>,
    ) -> bool {
        match self.try_set_joint_rotation(key, rotation_deg, translation) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring pose for {}: {}", key, e);
                false
            }
        }
    }

    /// Slider form: rotation about the primary axis only, zero translation.
    pub fn set_joint_angle(&mut self, key: &str, angle_deg: f64) -> bool {
        self.set_joint_rotation(key, Vector3::new(angle_deg, 0.0, 0.0), Vector3::zeros())
    }

    /// Strict variant of [`set_joint_rotation`](Self::set_joint_rotation).
    pub fn try_set_joint_rotation(
        &mut self,
        key: &str,
        rotation_deg: Vector3<f64>,
        translation: Vector3<f64>,
    ) -> Result<(), RigError> {
        let node = key
            .parse::<JointKey>()
            .ok()
            .and_then(|k| self.joint_node(&k))
            .ok_or_else(|| RigError::UnknownJoint(key.to_string()))?;
        let scale = self.nodes[node.0].local.scale;
        self.nodes[node.0].local = Sim3 {
            scale,
            ..Sim3::from_euler_deg(rotation_deg, translation)
        };
        Ok(())
    }

    /// Uniform scale of the whole hand.
    pub fn set_root_scale(&mut self, scale: f64) {
        self.nodes[0].local.scale = scale;
    }

    /// Forward kinematics: world transform of every node, indexed by `NodeId`.
    pub fn world_transforms(&self) -> Vec<Sim3> {
        let mut world: Vec<Sim3> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let w = match node.parent {
                Some(p) => world[p.0].compose(&node.local),
                None => node.local,
            };
            world.push(w);
        }
        world
    }

    /// True when `node` is `ancestor` or lies below it.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Every mesh under `ancestor` with its world transform, in arena order.
    pub fn posed_meshes_under(&self, ancestor: NodeId) -> Vec<PosedMesh<'_>> {
        let world = self.world_transforms();
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node.kind {
                NodeKind::Mesh(mesh_id) if self.is_descendant(NodeId(i), ancestor) => {
                    Some(PosedMesh {
                        node: NodeId(i),
                        mesh: &self.meshes[mesh_id.0],
                        world: world[i],
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Every mesh of the hierarchy with its world transform.
    pub fn posed_meshes(&self) -> Vec<PosedMesh<'_>> {
        self.posed_meshes_under(self.root())
    }
}

impl Default for JointHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::joint::FingerPart;
    use approx::assert_relative_eq;

    fn two_link_chain() -> (JointHierarchy, NodeId, NodeId) {
        let mut h = JointHierarchy::new();
        let root = h.root();
        h.register_joint(JointKey::palm(), root).unwrap();
        let j0 = h.add_group(root, Sim3::identity()).unwrap();
        h.register_joint(JointKey::new(FingerPart::Index, 0), j0).unwrap();
        let next = h
            .add_group(j0, Sim3::from_translation(Vector3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let j1 = h.add_group(next, Sim3::identity()).unwrap();
        h.register_joint(JointKey::new(FingerPart::Index, 1), j1).unwrap();
        let tip = h
            .add_group(j1, Sim3::from_translation(Vector3::new(0.0, 1.0, 0.0)))
            .unwrap();
        (h, j1, tip)
    }

    #[test]
    fn test_forward_kinematics_accumulates_rotation() {
        let (mut h, _, tip) = two_link_chain();
        h.set_joint_rotation("index_0", Vector3::new(0.0, 0.0, 90.0), Vector3::zeros());

        let world = h.world_transforms();
        let tip_pos = world[tip.0].transform_point(&Point3::origin());

        // Both links now point along -X.
        assert_relative_eq!(tip_pos, Point3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_set_joint_rotation_is_absolute() {
        let (mut h, j1, _) = two_link_chain();
        let rot = Vector3::new(-45.0, 10.0, 5.0);
        let pos = Vector3::new(0.1, 0.2, 0.3);

        assert!(h.set_joint_rotation("index_1", rot, pos));
        let first = *h.local_transform(j1).unwrap();
        assert!(h.set_joint_rotation("index_1", rot, pos));
        let second = *h.local_transform(j1).unwrap();

        assert_eq!(first, second);
        assert_relative_eq!(second.translation, pos, epsilon = 1e-15);
    }

    #[test]
    fn test_unknown_joint_is_noop() {
        let (mut h, _, _) = two_link_chain();
        let before = h.world_transforms();

        assert!(!h.set_joint_rotation("index_7", Vector3::new(30.0, 0.0, 0.0), Vector3::zeros()));
        assert!(!h.set_joint_angle("middle_0", 30.0));
        assert!(!h.set_joint_angle("not a joint", 30.0));

        assert_eq!(before, h.world_transforms());
    }

    #[test]
    fn test_strict_setter_reports_unknown_joint() {
        let (mut h, _, _) = two_link_chain();
        let err = h
            .try_set_joint_rotation("ring_0", Vector3::zeros(), Vector3::zeros())
            .unwrap_err();
        assert!(matches!(err, RigError::UnknownJoint(k) if k == "ring_0"));
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let (mut h, j1, _) = two_link_chain();
        let err = h
            .register_joint(JointKey::new(FingerPart::Index, 1), j1)
            .unwrap_err();
        assert!(matches!(err, RigError::DuplicateJoint(_)));
    }

    #[test]
    fn test_attach_to_missing_parent_fails() {
        let mut h = JointHierarchy::new();
        assert!(h.add_group(NodeId(42), Sim3::identity()).is_err());
    }

    #[test]
    fn test_is_descendant() {
        let (h, j1, tip) = two_link_chain();
        assert!(h.is_descendant(tip, h.root()));
        assert!(h.is_descendant(tip, j1));
        assert!(!h.is_descendant(j1, tip));
    }
}
