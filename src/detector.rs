//! The landmark detector capability.
//!
//! Landmark detection itself is supplied from outside the crate through the
//! [`LandmarkDetector`] trait. [`DetectorHandle`] owns one detector for the
//! lifetime of a session and guarantees it is released exactly once.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::LandmarkSet;

/// Settings a detector is initialised with. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_faces: usize,
    /// Adds iris landmarks, bringing the mesh from 468 to 478 points.
    pub refine_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_faces: 1,
            refine_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

/// A face landmark detector.
///
/// Implementations receive RGB images and return one [`LandmarkSet`] per
/// detected face, in the detector's own order.
pub trait LandmarkDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<LandmarkSet>>;

    /// Free any resources held by the detector.
    fn release(&mut self) {}
}

/// Owns a detector and releases it exactly once, on [`release`] or drop.
///
/// [`release`]: DetectorHandle::release
pub struct DetectorHandle<D: LandmarkDetector> {
    inner: D,
    released: bool,
}

impl<D: LandmarkDetector> DetectorHandle<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            released: false,
        }
    }

    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<LandmarkSet>> {
        if self.released {
            return Err(Error::DetectorReleased);
        }
        self.inner.detect(image)
    }

    /// Release the detector. Later calls are no-ops.
    pub fn release(&mut self) {
        if !self.released {
            self.inner.release();
            self.released = true;
            debug!("landmark detector released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<D: LandmarkDetector> Drop for DetectorHandle<D> {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Deserialize)]
struct RecordedDocument {
    faces: Vec<LandmarkSet>,
}

/// A detector that replays landmark sets recorded ahead of time.
///
/// The document format is `{"faces": [[{"x": 0.5, "y": 0.4}, ...], ...]}`
/// with normalized coordinates, as exported from a face-mesh model.
#[derive(Debug, Clone)]
pub struct RecordedLandmarks {
    faces: Vec<LandmarkSet>,
    config: DetectorConfig,
}

impl RecordedLandmarks {
    pub fn new(faces: Vec<LandmarkSet>, config: DetectorConfig) -> Self {
        Self { faces, config }
    }

    /// Load a recording from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P, config: DetectorConfig) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json, config)
    }

    pub fn from_json(json: &str, config: DetectorConfig) -> Result<Self> {
        let doc: RecordedDocument = serde_json::from_str(json)?;
        Ok(Self::new(doc.faces, config))
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }
}

impl LandmarkDetector for RecordedLandmarks {
    fn detect(&mut self, _image: &RgbImage) -> Result<Vec<LandmarkSet>> {
        Ok(self
            .faces
            .iter()
            .take(self.config.max_faces)
            .cloned()
            .collect())
    }
}
