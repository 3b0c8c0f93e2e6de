//! Dataset sweep orchestration.
//!
//! [`DatasetSweep`] owns every piece of mutable state: the rig, the pose
//! sequencer, the renderer and the exporter. Each tick runs one full
//! pose → render → project → record step before the next one starts.

mod dataset_sweep;

pub use dataset_sweep::{DatasetSweep, SweepSummary, TickOutcome};
