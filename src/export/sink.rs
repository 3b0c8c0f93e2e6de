//! Artifact destinations for captured frames and the annotation document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::debug;

/// Receives the exporter's side effects.
pub trait ArtifactSink {
    /// Store a captured raster as `{name}.png`.
    fn save_image(&mut self, name: &str, image: &RgbaImage) -> Result<()>;

    /// Store a UTF-8 JSON document as `{name}.json`.
    fn emit_document(&mut self, name: &str, contents: &str) -> Result<()>;
}

/// Writes artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Use `dir`, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save_image(&mut self, name: &str, image: &RgbaImage) -> Result<()> {
        let path = self.dir.join(format!("{name}.png"));
        image
            .save(&path)
            .with_context(|| format!("Failed to write image {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn emit_document(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.dir.join(format!("{name}.json"));
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write document {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub images: Vec<(String, RgbaImage)>,
    pub documents: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactSink for MemorySink {
    fn save_image(&mut self, name: &str, image: &RgbaImage) -> Result<()> {
        self.images.push((name.to_string(), image.clone()));
        Ok(())
    }

    fn emit_document(&mut self, name: &str, contents: &str) -> Result<()> {
        self.documents.push((name.to_string(), contents.to_string()));
        Ok(())
    }
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &mut S {
    fn save_image(&mut self, name: &str, image: &RgbaImage) -> Result<()> {
        (**self).save_image(name, image)
    }

    fn emit_document(&mut self, name: &str, contents: &str) -> Result<()> {
        (**self).emit_document(name, contents)
    }
}
