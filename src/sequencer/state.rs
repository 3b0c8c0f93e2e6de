//! Sweep counters and their advance rule.

use serde::{Deserialize, Serialize};

/// Sweep extents.
///
/// `frame` runs over `[0, max_frames)`, `hand_y` over `[-max_y_pos, max_y_pos]`
/// and `hand_z` over `[-max_z_pos, max_z_pos)`: the sweep ends as soon as
/// `hand_z` reaches `max_z_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub max_frames: u32,
    /// Amplitude of the palm's sideways oscillation, scene units.
    pub max_x_pos: f64,
    pub max_y_pos: i32,
    pub max_z_pos: i32,
}

impl SweepConfig {
    /// Number of frames the sweep captures.
    pub fn total_captures(&self) -> u64 {
        let y_steps = (2 * self.max_y_pos.max(0) + 1) as u64;
        let z_steps = (2 * self.max_z_pos.max(0)) as u64;
        self.max_frames as u64 * y_steps * z_steps
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_frames: 2,
            max_x_pos: 7.0,
            max_y_pos: 7,
            max_z_pos: 3,
        }
    }
}

/// Position of the sweep: finger-curl frame plus hand placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepCounters {
    pub frame: u32,
    pub hand_y: i32,
    pub hand_z: i32,
}

impl SweepCounters {
    /// First position of a sweep.
    pub fn start(config: &SweepConfig) -> Self {
        Self {
            frame: 0,
            hand_y: -config.max_y_pos,
            hand_z: -config.max_z_pos,
        }
    }

    /// Whether this position still produces a capture.
    pub fn is_active(&self, config: &SweepConfig) -> bool {
        config.max_frames > 0 && self.hand_z < config.max_z_pos
    }

    /// Step to the next position, innermost counter first.
    pub fn advance(&mut self, config: &SweepConfig) {
        if self.frame + 1 < config.max_frames {
            self.frame += 1;
        } else if self.hand_y < config.max_y_pos {
            self.frame = 0;
            self.hand_y += 1;
        } else {
            self.frame = 0;
            self.hand_y = -config.max_y_pos;
            self.hand_z += 1;
        }
    }
}
