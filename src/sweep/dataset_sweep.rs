use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::SynthConfig;
use crate::export::{ArtifactSink, DatasetExporter};
use crate::geometry::{PerspectiveCamera, Viewport};
use crate::projector::{self, BoundingBox};
use crate::render::FrameRenderer;
use crate::rig::{self, JointHierarchy};
use crate::sequencer::PoseSequencer;

/// Result of a single [`DatasetSweep::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A frame was posed, rendered and recorded.
    Captured {
        index: u64,
        bbox: Option<BoundingBox>,
    },
    /// The sweep had ended and the annotation document was emitted.
    Finalized,
    /// Nothing left to do.
    Idle,
}

/// Totals reported by [`DatasetSweep::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub captured: u64,
    pub detections: usize,
}

/// Drives one hand through the full pose sweep.
pub struct DatasetSweep<R: FrameRenderer, S: ArtifactSink> {
    hand: JointHierarchy,
    sequencer: PoseSequencer,
    renderer: R,
    camera: PerspectiveCamera,
    viewport: Viewport,
    exporter: DatasetExporter<S>,
    tick_delay: Duration,
}

impl<R: FrameRenderer, S: ArtifactSink> DatasetSweep<R, S> {
    pub fn new(
        hand: JointHierarchy,
        sequencer: PoseSequencer,
        renderer: R,
        camera: PerspectiveCamera,
        viewport: Viewport,
        exporter: DatasetExporter<S>,
    ) -> Self {
        Self {
            hand,
            sequencer,
            renderer,
            camera,
            viewport,
            exporter,
            tick_delay: Duration::ZERO,
        }
    }

    /// Build the default hand and wire everything from a validated config.
    pub fn from_config(config: &SynthConfig, renderer: R, sink: S) -> Result<Self> {
        config.validate().context("Invalid sweep configuration")?;
        let hand = rig::build_hand().context("Failed to build hand rig")?;
        let exporter = DatasetExporter::new(sink).with_images(config.output.save_images);
        Ok(Self::new(
            hand,
            PoseSequencer::new(config.sweep),
            renderer,
            config.camera(),
            config.viewport,
            exporter,
        )
        .with_tick_delay(config.output.tick_delay()))
    }

    pub fn with_tick_delay(mut self, tick_delay: Duration) -> Self {
        self.tick_delay = tick_delay;
        self
    }

    /// Advance the sweep by one step.
    ///
    /// While the sequencer yields frames each tick captures one. The first
    /// tick after the last capture emits the annotation document; every tick
    /// after that is a no-op.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let Some(frame) = self.sequencer.next() else {
            if self.exporter.is_finalized() {
                return Ok(TickOutcome::Idle);
            }
            self.exporter.finalize()?;
            return Ok(TickOutcome::Finalized);
        };

        let applied = frame.apply(&mut self.hand);
        debug!(
            "{}: frame={} y={} z={} ({} joints posed)",
            frame.name(),
            frame.counters.frame,
            frame.counters.hand_y,
            frame.counters.hand_z,
            applied
        );

        // The box must describe the exact pose that was rendered.
        let image = self
            .renderer
            .render(&self.hand, &self.camera, self.viewport)
            .with_context(|| format!("Failed to render {}", frame.name()))?;
        let bbox = projector::project(&self.hand, &self.camera, self.viewport);
        self.exporter.record_frame(frame.index, bbox, &image)?;

        Ok(TickOutcome::Captured {
            index: frame.index,
            bbox,
        })
    }

    /// Tick until the annotation document has been emitted, pausing
    /// `tick_delay` between captures.
    pub fn run(&mut self) -> Result<SweepSummary> {
        let total = self.sequencer.config().total_captures();
        info!(
            "Starting sweep: {} captures at {}x{}",
            total, self.viewport.width, self.viewport.height
        );
        let start = Instant::now();
        let progress_step = (total / 10).max(1);

        loop {
            match self.tick()? {
                TickOutcome::Captured { index, .. } => {
                    if (index + 1) % progress_step == 0 {
                        info!("Captured {}/{}", index + 1, total);
                    }
                    if !self.tick_delay.is_zero() {
                        thread::sleep(self.tick_delay);
                    }
                }
                TickOutcome::Finalized | TickOutcome::Idle => break,
            }
        }

        let summary = SweepSummary {
            captured: self.sequencer.produced(),
            detections: self.exporter.record().detections(),
        };
        info!(
            "Sweep finished in {:.2?}: {} frames, {} with a detection",
            start.elapsed(),
            summary.captured,
            summary.detections
        );
        Ok(summary)
    }

    pub fn hand(&self) -> &JointHierarchy {
        &self.hand
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn exporter(&self) -> &DatasetExporter<S> {
        &self.exporter
    }

    pub fn into_exporter(self) -> DatasetExporter<S> {
        self.exporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemorySink;
    use crate::render::{RenderSettings, SoftwareRenderer};
    use crate::sequencer::SweepConfig;
    use image::RgbaImage;

    fn small_config() -> SynthConfig {
        let mut cfg = SynthConfig::default();
        cfg.viewport = Viewport::new(160, 120);
        cfg.sweep = SweepConfig {
            max_frames: 2,
            max_x_pos: 2.0,
            max_y_pos: 1,
            max_z_pos: 1,
        };
        cfg.output.tick_delay_ms = 0;
        cfg
    }

    fn software_sweep(cfg: &SynthConfig) -> DatasetSweep<SoftwareRenderer, MemorySink> {
        let renderer = SoftwareRenderer::new(cfg.render.clone());
        DatasetSweep::from_config(cfg, renderer, MemorySink::new()).unwrap()
    }

    #[test]
    fn test_run_captures_every_frame_and_finalizes() {
        let cfg = small_config();
        let mut sweep = software_sweep(&cfg);
        let summary = sweep.run().unwrap();

        assert_eq!(summary.captured, 12);
        let exporter = sweep.exporter();
        assert!(exporter.is_finalized());
        assert_eq!(exporter.record().len(), 12);
        assert_eq!(exporter.sink().images.len(), 12);
        assert_eq!(exporter.sink().documents.len(), 1);
    }

    #[test]
    fn test_ticks_past_the_end_are_noops() {
        let cfg = small_config();
        let mut sweep = software_sweep(&cfg);
        sweep.run().unwrap();

        assert_eq!(sweep.tick().unwrap(), TickOutcome::Idle);
        assert_eq!(sweep.tick().unwrap(), TickOutcome::Idle);
        assert_eq!(sweep.exporter().sink().documents.len(), 1);
        assert_eq!(sweep.exporter().record().len(), 12);
    }

    #[test]
    fn test_tick_sequence_ends_with_single_finalize() {
        let cfg = small_config();
        let mut sweep = software_sweep(&cfg);
        let mut outcomes = Vec::new();
        for _ in 0..15 {
            outcomes.push(sweep.tick().unwrap());
        }

        let captured = outcomes
            .iter()
            .filter(|o| matches!(o, TickOutcome::Captured { .. }))
            .count();
        assert_eq!(captured, 12);
        assert_eq!(outcomes[12], TickOutcome::Finalized);
        assert_eq!(outcomes[13], TickOutcome::Idle);
        assert_eq!(outcomes[14], TickOutcome::Idle);
    }

    #[test]
    fn test_rendered_silhouette_lies_inside_recorded_box() {
        let cfg = small_config();
        let clear = cfg.render.clear_color;
        let mut sweep = software_sweep(&cfg);

        for _ in 0..4 {
            let TickOutcome::Captured { index, bbox } = sweep.tick().unwrap() else {
                panic!("expected a capture");
            };
            let (name, image) = sweep.exporter().sink().images.last().unwrap();
            assert_eq!(name, &format!("frame-{index}"));

            let drawn: Vec<(u32, u32)> = image
                .enumerate_pixels()
                .filter(|(_, _, p)| p.0 != clear)
                .map(|(x, y, _)| (x, y))
                .collect();
            let Some(bbox) = bbox else {
                assert!(drawn.is_empty());
                continue;
            };
            for (x, y) in drawn {
                assert!(bbox.contains(x as f64 + 0.5, y as f64 + 0.5, 1.0));
            }
        }
    }

    /// Records the rig's palm transform at render time.
    struct PoseSpy {
        seen: Vec<crate::geometry::Sim3>,
    }

    impl FrameRenderer for PoseSpy {
        fn render(
            &mut self,
            hand: &JointHierarchy,
            _camera: &PerspectiveCamera,
            viewport: Viewport,
        ) -> Result<RgbaImage> {
            if let Some(palm) = hand.joint_transform("palm_0") {
                self.seen.push(*palm);
            }
            Ok(RgbaImage::new(viewport.width, viewport.height))
        }
    }

    #[test]
    fn test_render_sees_pose_of_current_tick() {
        let cfg = small_config();
        let spy = PoseSpy { seen: Vec::new() };
        let mut sweep = DatasetSweep::from_config(&cfg, spy, MemorySink::new()).unwrap();

        sweep.tick().unwrap();
        sweep.tick().unwrap();
        let palm = *sweep.hand().joint_transform("palm_0").unwrap();

        let seen = &sweep.renderer.seen;
        assert_eq!(seen.len(), 2);
        // Second tick: frame 1 of y=-1, z=-1.
        assert_eq!(seen[1], palm);
        approx::assert_relative_eq!(seen[1].translation.y, -1.0);
        approx::assert_relative_eq!(seen[1].translation.z, -1.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut cfg = small_config();
        cfg.sweep.max_frames = 0;
        let renderer = SoftwareRenderer::new(RenderSettings::default());
        assert!(DatasetSweep::from_config(&cfg, renderer, MemorySink::new()).is_err());
    }
}
