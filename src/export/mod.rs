//! Dataset export: per-frame annotations, image captures and the final
//! annotation document.

pub mod annotations;
pub mod sink;

pub use annotations::AnnotationRecord;
pub use sink::{ArtifactSink, DirectorySink, MemorySink};

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::{debug, info};

use crate::projector::BoundingBox;

/// Name of the annotation document artifact.
pub const ANNOTATIONS_NAME: &str = "annotations";

/// Image / annotation key for a capture index.
pub fn frame_name(index: u64) -> String {
    format!("frame-{index}")
}

/// Accumulates the annotation record and drives the sink.
pub struct DatasetExporter<S: ArtifactSink> {
    sink: S,
    record: AnnotationRecord,
    save_images: bool,
    finalized: bool,
}

impl<S: ArtifactSink> DatasetExporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            record: AnnotationRecord::new(),
            save_images: true,
            finalized: false,
        }
    }

    /// Disable image capture; annotations are still recorded.
    pub fn with_images(mut self, save_images: bool) -> Self {
        self.save_images = save_images;
        self
    }

    /// Record `frame-{index}` and capture its raster.
    ///
    /// The annotation is appended only after the capture succeeds, so a
    /// failed write leaves the record unchanged.
    pub fn record_frame(
        &mut self,
        index: u64,
        bbox: Option<BoundingBox>,
        image: &RgbaImage,
    ) -> Result<()> {
        let name = frame_name(index);
        if self.save_images {
            self.sink
                .save_image(&name, image)
                .with_context(|| format!("Capture of {name} failed"))?;
        }
        debug!("{}: {:?}", name, bbox);
        self.record.push(name, bbox);
        Ok(())
    }

    /// Emit the annotation document. Returns `true` if this call emitted it,
    /// `false` if it was already emitted. A failed emission can be retried.
    pub fn finalize(&mut self) -> Result<bool> {
        if self.finalized {
            return Ok(false);
        }
        let json = self
            .record
            .to_json()
            .context("Failed to serialize annotations")?;
        self.sink
            .emit_document(ANNOTATIONS_NAME, &json)
            .context("Failed to emit annotations")?;
        self.finalized = true;
        info!(
            "Wrote {} annotations ({} with a detection)",
            self.record.len(),
            self.record.detections()
        );
        Ok(true)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn record(&self) -> &AnnotationRecord {
        &self.record
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn raster() -> RgbaImage {
        RgbaImage::new(4, 3)
    }

    #[test]
    fn test_record_frame_appends_and_captures() {
        let mut exporter = DatasetExporter::new(MemorySink::new());
        exporter
            .record_frame(0, BoundingBox::from_extent(1.0, 1.0, 3.0, 2.0), &raster())
            .unwrap();
        exporter.record_frame(1, None, &raster()).unwrap();

        assert_eq!(exporter.record().len(), 2);
        assert_eq!(exporter.record().get("frame-0").unwrap().len(), 1);
        assert!(exporter.record().get("frame-1").unwrap().is_empty());
        let names: Vec<&str> = exporter.sink().images.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["frame-0", "frame-1"]);
    }

    #[test]
    fn test_finalize_emits_once() {
        let mut exporter = DatasetExporter::new(MemorySink::new());
        exporter.record_frame(0, None, &raster()).unwrap();

        assert!(exporter.finalize().unwrap());
        assert!(!exporter.finalize().unwrap());

        let docs = &exporter.sink().documents;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, ANNOTATIONS_NAME);
    }

    #[test]
    fn test_images_can_be_disabled() {
        let mut exporter = DatasetExporter::new(MemorySink::new()).with_images(false);
        exporter.record_frame(0, None, &raster()).unwrap();

        assert!(exporter.sink().images.is_empty());
        assert_eq!(exporter.record().len(), 1);
    }

    struct FlakySink {
        fail_next: bool,
        emitted: usize,
    }

    impl ArtifactSink for FlakySink {
        fn save_image(&mut self, _name: &str, _image: &RgbaImage) -> Result<()> {
            bail!("disk full")
        }

        fn emit_document(&mut self, _name: &str, _contents: &str) -> Result<()> {
            if std::mem::take(&mut self.fail_next) {
                bail!("disk full");
            }
            self.emitted += 1;
            Ok(())
        }
    }

    #[test]
    fn test_failed_capture_is_reported_and_not_recorded() {
        let mut exporter = DatasetExporter::new(FlakySink {
            fail_next: false,
            emitted: 0,
        });
        let err = exporter.record_frame(5, None, &raster()).unwrap_err();

        assert!(format!("{err:#}").contains("frame-5"));
        assert!(exporter.record().is_empty());
    }

    #[test]
    fn test_failed_finalize_can_be_retried() {
        let mut exporter = DatasetExporter::new(FlakySink {
            fail_next: true,
            emitted: 0,
        });

        assert!(exporter.finalize().is_err());
        assert!(!exporter.is_finalized());
        assert!(exporter.finalize().unwrap());
        assert!(!exporter.finalize().unwrap());
        assert_eq!(exporter.sink().emitted, 1);
    }
}
