//! The in-memory annotation document.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::projector::BoundingBox;

/// Ordered mapping from image name to its detections (zero or one box).
///
/// Serializes as a JSON object whose keys keep capture order, e.g.
/// `{"frame-0": [[x, y, w, h]], "frame-1": []}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRecord {
    entries: Vec<(String, Vec<BoundingBox>)>,
}

impl AnnotationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, bbox: Option<BoundingBox>) {
        self.entries.push((name, bbox.into_iter().collect()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&[BoundingBox]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, boxes)| boxes.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BoundingBox])> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b.as_slice()))
    }

    /// Number of frames with a detection.
    pub fn detections(&self) -> usize {
        self.entries.iter().filter(|(_, b)| !b.is_empty()).count()
    }

    /// Pretty-printed JSON document (2-space indent).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for AnnotationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, boxes) in &self.entries {
            map.serialize_entry(name, boxes)?;
        }
        map.end()
    }
}
