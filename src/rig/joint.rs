//! Joint identity types.
//!
//! Joints are addressed by `"{part}_{index}"` keys, e.g. `palm_0`, `thumb_1`,
//! `pinky_2`. Scene nodes are addressed by [`NodeId`], a plain arena index
//! that stays valid for the lifetime of the hierarchy.

use std::fmt;
use std::str::FromStr;

use super::RigError;

/// Index of a node in the [`JointHierarchy`](super::JointHierarchy) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Index of a renderable primitive owned by the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Part of the hand a joint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FingerPart {
    Palm,
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerPart {
    /// Every part, palm first.
    pub const ALL: [FingerPart; 6] = [
        FingerPart::Palm,
        FingerPart::Thumb,
        FingerPart::Index,
        FingerPart::Middle,
        FingerPart::Ring,
        FingerPart::Pinky,
    ];

    /// The five digits (everything except the palm).
    pub const FINGERS: [FingerPart; 5] = [
        FingerPart::Thumb,
        FingerPart::Index,
        FingerPart::Middle,
        FingerPart::Ring,
        FingerPart::Pinky,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FingerPart::Palm => "palm",
            FingerPart::Thumb => "thumb",
            FingerPart::Index => "index",
            FingerPart::Middle => "middle",
            FingerPart::Ring => "ring",
            FingerPart::Pinky => "pinky",
        }
    }

    /// Number of joints (and segments, for digits) in this part.
    pub fn joint_count(self) -> u8 {
        match self {
            FingerPart::Palm => 1,
            FingerPart::Thumb => 2,
            _ => 3,
        }
    }

    /// Length of one finger segment.
    pub fn segment_length(self) -> f64 {
        match self {
            FingerPart::Thumb => 0.5,
            _ => 0.6,
        }
    }

    /// Radius of one finger segment.
    pub fn segment_radius(self) -> f64 {
        match self {
            FingerPart::Thumb => 0.15,
            FingerPart::Pinky => 0.10,
            _ => 0.12,
        }
    }

    /// All joint keys of this part, proximal first.
    pub fn joint_keys(self) -> impl Iterator<Item = JointKey> {
        (0..self.joint_count()).map(move |index| JointKey { part: self, index })
    }
}

impl fmt::Display for FingerPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FingerPart {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FingerPart::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| RigError::InvalidJointKey(s.to_string()))
    }
}

/// Joint identity: part plus 0-based index along the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointKey {
    pub part: FingerPart,
    pub index: u8,
}

impl JointKey {
    pub fn new(part: FingerPart, index: u8) -> Self {
        Self { part, index }
    }

    /// The hand root.
    pub fn palm() -> Self {
        Self::new(FingerPart::Palm, 0)
    }

    /// Every joint of the hand topology in palm, thumb..pinky order.
    pub fn all() -> impl Iterator<Item = JointKey> {
        FingerPart::ALL.into_iter().flat_map(FingerPart::joint_keys)
    }

    /// Joints of the five digits only.
    pub fn finger_joints() -> impl Iterator<Item = JointKey> {
        FingerPart::FINGERS.into_iter().flat_map(FingerPart::joint_keys)
    }
}

impl fmt::Display for JointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.part, self.index)
    }
}

impl FromStr for JointKey {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RigError::InvalidJointKey(s.to_string());
        let (part, index) = s.rsplit_once('_').ok_or_else(invalid)?;
        let part: FingerPart = part.parse().map_err(|_| invalid())?;
        let index: u8 = index.parse().map_err(|_| invalid())?;
        if index >= part.joint_count() {
            return Err(invalid());
        }
        Ok(Self { part, index })
    }
}
