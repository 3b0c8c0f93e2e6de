//! Deterministic pose sequencer.
//!
//! [`PoseSequencer`] is a plain iterator over [`PoseFrame`]s. It knows
//! nothing about rendering: the sweep driver consumes it one frame per tick,
//! and tests can enumerate a whole sweep headless.

pub mod pose;
pub mod state;

pub use pose::{JointTarget, PoseFrame, curl_angle, derive_targets, periodic_2pi, periodic_pi};
pub use state::{SweepConfig, SweepCounters};

use tracing::debug;

/// Enumerates the sweep, innermost counter (`frame`) first.
#[derive(Debug, Clone)]
pub struct PoseSequencer {
    config: SweepConfig,
    counters: SweepCounters,
    next_index: u64,
}

impl PoseSequencer {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            counters: SweepCounters::start(&config),
            config,
            next_index: 0,
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Counters of the next frame to be produced.
    pub fn counters(&self) -> SweepCounters {
        self.counters
    }

    /// Whether another frame will be produced.
    pub fn is_active(&self) -> bool {
        self.counters.is_active(&self.config)
    }

    /// Frames produced so far.
    pub fn produced(&self) -> u64 {
        self.next_index
    }
}

impl Iterator for PoseSequencer {
    type Item = PoseFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.is_active() {
            return None;
        }
        let frame = PoseFrame::new(self.next_index, self.counters, &self.config);
        self.next_index += 1;
        self.counters.advance(&self.config);
        if !self.is_active() {
            debug!("Pose sweep exhausted after {} frames", self.next_index);
        }
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .config
            .total_captures()
            .saturating_sub(self.next_index) as usize;
        (remaining, Some(remaining))
    }
}
