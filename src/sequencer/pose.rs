//! Per-tick joint targets derived from the sweep counters.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::rig::{JointHierarchy, JointKey};

use super::state::{SweepConfig, SweepCounters};

/// Peak finger curl, degrees.
pub const MAX_CURL_DEG: f64 = 90.0;
/// Peak palm rotation on each axis, degrees.
pub const MAX_PALM_TILT_DEG: f64 = 45.0;

/// Absolute pose for one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTarget {
    pub key: JointKey,
    pub rotation_deg: Vector3<f64>,
    pub translation: Vector3<f64>,
}

/// One step of the sweep: its capture index, counters and full pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    /// 0-based capture counter, independent of the pose counters.
    pub index: u64,
    pub counters: SweepCounters,
    pub targets: Vec<JointTarget>,
}

impl PoseFrame {
    pub fn new(index: u64, counters: SweepCounters, config: &SweepConfig) -> Self {
        Self {
            index,
            counters,
            targets: derive_targets(&counters, config),
        }
    }

    /// Image / annotation name of this capture.
    pub fn name(&self) -> String {
        crate::export::frame_name(self.index)
    }

    /// Write every target into the rig. Returns how many joints were found.
    pub fn apply(&self, rig: &mut JointHierarchy) -> usize {
        self.targets
            .iter()
            .filter(|t| rig.set_joint_rotation(&t.key.to_string(), t.rotation_deg, t.translation))
            .count()
    }
}

/// `sin(frame * π / max_frames)`: one half-period over the frame range.
pub fn periodic_pi(frame: u32, max_frames: u32) -> f64 {
    (frame as f64 * PI / max_frames as f64).sin()
}

/// `sin(frame * 2π / max_frames)`: one full period over the frame range.
pub fn periodic_2pi(frame: u32, max_frames: u32) -> f64 {
    (frame as f64 * 2.0 * PI / max_frames as f64).sin()
}

/// Finger curl for a frame, degrees (positive = curled).
pub fn curl_angle(frame: u32, max_frames: u32) -> f64 {
    MAX_CURL_DEG * periodic_pi(frame, max_frames)
}

/// All joint targets implied by the counters.
///
/// Every finger joint gets the same `-curl` on its primary axis; the palm
/// tilts equally on all three axes and is placed at
/// `(max_x_pos * p2, hand_y, hand_z)`.
pub fn derive_targets(counters: &SweepCounters, config: &SweepConfig) -> Vec<JointTarget> {
    let curl = curl_angle(counters.frame, config.max_frames);
    let p2 = periodic_2pi(counters.frame, config.max_frames);
    let tilt = MAX_PALM_TILT_DEG * p2;

    let mut targets: Vec<JointTarget> = JointKey::finger_joints()
        .map(|key| JointTarget {
            key,
            rotation_deg: Vector3::new(-curl, 0.0, 0.0),
            translation: Vector3::zeros(),
        })
        .collect();

    targets.push(JointTarget {
        key: JointKey::palm(),
        rotation_deg: Vector3::new(tilt, tilt, tilt),
        translation: Vector3::new(
            config.max_x_pos * p2,
            counters.hand_y as f64,
            counters.hand_z as f64,
        ),
    });
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::build_hand;
    use approx::assert_relative_eq;

    fn counters(frame: u32, hand_y: i32, hand_z: i32) -> SweepCounters {
        SweepCounters {
            frame,
            hand_y,
            hand_z,
        }
    }

    #[test]
    fn test_curl_follows_half_sine() {
        let max_frames = 8;
        for frame in 0..max_frames {
            let expected = -90.0 * (frame as f64 * PI / max_frames as f64).sin();
            assert_relative_eq!(-curl_angle(frame, max_frames), expected, epsilon = 1e-12);
        }
        assert_relative_eq!(curl_angle(0, max_frames), 0.0);
        assert_relative_eq!(curl_angle(4, max_frames), 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_fingers_move_in_unison() {
        let cfg = SweepConfig {
            max_frames: 4,
            ..SweepConfig::default()
        };
        let targets = derive_targets(&counters(1, 0, 0), &cfg);
        let finger_rotations: Vec<_> = targets
            .iter()
            .filter(|t| t.key != JointKey::palm())
            .map(|t| t.rotation_deg)
            .collect();

        assert_eq!(finger_rotations.len(), 14);
        assert!(finger_rotations.windows(2).all(|w| w[0] == w[1]));
        assert_relative_eq!(finger_rotations[0].x, -90.0 * (PI / 4.0).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_palm_target() {
        let cfg = SweepConfig {
            max_frames: 4,
            ..SweepConfig::default()
        };
        let targets = derive_targets(&counters(1, -2, 1), &cfg);
        let palm = targets.iter().find(|t| t.key == JointKey::palm()).unwrap();

        // sin(π/2) = 1 at a quarter of the range.
        assert_relative_eq!(palm.rotation_deg, Vector3::new(45.0, 45.0, 45.0), epsilon = 1e-12);
        assert_relative_eq!(palm.translation, Vector3::new(7.0, -2.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rest_frame_has_neutral_palm() {
        let targets = derive_targets(&counters(0, 3, -1), &SweepConfig::default());
        let palm = targets.iter().find(|t| t.key == JointKey::palm()).unwrap();

        assert_relative_eq!(palm.rotation_deg, Vector3::zeros());
        assert_relative_eq!(palm.translation, Vector3::new(0.0, 3.0, -1.0));
    }

    #[test]
    fn test_apply_reaches_every_joint_and_is_idempotent() {
        let mut rig = build_hand().unwrap();
        let frame = PoseFrame::new(0, counters(1, 0, 0), &SweepConfig::default());

        assert_eq!(frame.apply(&mut rig), 15);
        let first = rig.world_transforms();
        frame.apply(&mut rig);
        assert_eq!(first, rig.world_transforms());
    }

    #[test]
    fn test_frame_name() {
        let frame = PoseFrame::new(17, counters(0, 0, 0), &SweepConfig::default());
        assert_eq!(frame.name(), "frame-17");
    }
}
