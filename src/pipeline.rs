//! Per-frame feature pipeline: validate, measure, classify, render, overlay.

use image::RgbImage;
use tracing::{debug, warn};

use crate::detector::{DetectorHandle, LandmarkDetector};
use crate::landmarks::{is_refined, MIN_LANDMARKS};
use crate::metrics::FaceMetrics;
use crate::overlay::draw_landmarks;
use crate::report::AnalysisReport;
use crate::types::LandmarkSet;

/// Why a detector result could not be analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoFace,
    InsufficientLandmarks { found: usize },
}

impl From<Rejection> for AnalysisReport {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::NoFace => AnalysisReport::NoFace,
            Rejection::InsufficientLandmarks { .. } => AnalysisReport::InsufficientLandmarks,
        }
    }
}

/// Pick the face to analyse. Only the first face is used.
pub fn validate(faces: &[LandmarkSet]) -> Result<&LandmarkSet, Rejection> {
    let face = faces.first().ok_or(Rejection::NoFace)?;
    if face.num_landmarks() < MIN_LANDMARKS {
        return Err(Rejection::InsufficientLandmarks {
            found: face.num_landmarks(),
        });
    }
    Ok(face)
}

/// Result of analysing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub report: AnalysisReport,
    /// Landmark count of the analysed face, `None` when no face was found.
    pub landmark_count: Option<usize>,
}

/// Analyse detector output for a `width` x `height` frame.
pub fn analyze(faces: &[LandmarkSet], width: u32, height: u32) -> Analysis {
    let landmark_count = faces.first().map(LandmarkSet::num_landmarks);

    let report = match validate(faces) {
        Ok(face) => match FaceMetrics::from_landmarks(face, width, height) {
            Ok(metrics) => AnalysisReport::from_metrics(&metrics),
            Err(e) => {
                debug!(error = %e, "required landmark missing");
                AnalysisReport::InsufficientLandmarks
            }
        },
        Err(rejection) => {
            debug!(?rejection, "detector result rejected");
            rejection.into()
        }
    };

    Analysis {
        report,
        landmark_count,
    }
}

/// Run the detector on `frame`, analyse the first face, then draw its
/// landmarks onto `frame`.
///
/// Measurements use the frame as detected, before any markers are drawn.
/// A detector failure is logged and reported as no face.
pub fn process_frame<D: LandmarkDetector>(
    detector: &mut DetectorHandle<D>,
    frame: &mut RgbImage,
) -> Analysis {
    let (width, height) = frame.dimensions();

    let faces = match detector.detect(frame) {
        Ok(faces) => faces,
        Err(e) => {
            warn!(error = %e, "landmark detection failed");
            Vec::new()
        }
    };

    if let Some(face) = faces.first() {
        let sample: Vec<_> = face.iter().take(3).map(|p| (p.x, p.y)).collect();
        debug!(
            landmarks = face.num_landmarks(),
            refined = is_refined(face),
            ?sample,
            "face landmarks detected"
        );
    }

    let analysis = analyze(&faces, width, height);

    if let Ok(face) = validate(&faces) {
        draw_landmarks(frame, face);
    }

    analysis
}
