//! # face-traits
//!
//! Camera acquisition and facial landmark geometry with rule-based trait
//! summaries.
//!
//! This crate provides:
//! - **Acquisition**: device enumeration, backend fallback when opening a
//!   camera, and a capture slot that survives transient read failures
//! - **Measurements**: philtrum length, lip thickness and eye width in pixels,
//!   computed from face-mesh landmarks (468 or 478 points)
//! - **Reports**: threshold classification of each measurement and a fixed,
//!   human-readable summary
//!
//! Landmark detection itself is pluggable through [`LandmarkDetector`].
//!
//! ## Pipeline
//!
//! 1. Pull a frame from the open camera (or take a decoded still image)
//! 2. Mirror live frames horizontally
//! 3. Run the landmark detector and keep the first face
//! 4. Reject faces with fewer than 468 landmarks
//! 5. Map the required landmarks to pixels and measure the three distances
//! 6. Classify each distance and render the report
//! 7. Mark every landmark on the display frame
//!
//! ## Quick Start
//!
//! ```rust
//! use face_traits::{analyze, LandmarkSet, Point};
//!
//! // Landmarks as a face-mesh detector would report them.
//! let mut points = vec![Point::new(0.5, 0.5); 478];
//! points[1] = Point::new(0.50, 0.40); // nose tip
//! points[13] = Point::new(0.50, 0.50); // upper lip
//! points[14] = Point::new(0.50, 0.54); // lower lip
//! points[33] = Point::new(0.40, 0.30); // left eye, inner corner
//! points[133] = Point::new(0.52, 0.30); // left eye, outer corner
//!
//! let analysis = analyze(&[LandmarkSet::new(points)], 640, 480);
//! println!("{}", analysis.report);
//! ```

pub mod capture;
mod classify;
mod config;
pub mod detector;
mod error;
mod landmarks;
mod metrics;
#[cfg(feature = "opencv")]
pub mod opencv_backend;
mod overlay;
mod pipeline;
mod report;
pub mod session;
mod types;
pub mod worker;

pub use capture::{
    Backend, CaptureDevice, CaptureManager, DeviceCandidate, DeviceOpener, DeviceState,
    FrameRead, OpenOutcome,
};
pub use classify::{
    classify, TraitLabel, EYE_WIDE_THRESHOLD_PX, LIP_THICK_THRESHOLD_PX,
    PHILTRUM_LONG_THRESHOLD_PX,
};
pub use config::{AcquisitionConfig, Config};
pub use detector::{DetectorConfig, DetectorHandle, LandmarkDetector, RecordedLandmarks};
pub use error::{Error, Result};
pub use image::RgbImage;
pub use landmarks::{
    is_refined, landmark_to_pixel, to_pixel, CHIN_CENTER, LEFT_EYE_INNER, LEFT_EYE_OUTER,
    MIN_LANDMARKS, MOUTH_LOWER, MOUTH_UPPER, NOSE_TIP, REFINED_LANDMARKS,
};
pub use metrics::{FaceMetrics, FacePoints, Measurement, MeasurementKind};
pub use overlay::{draw_landmarks, placeholder_frame, MARKER_COLOR};
pub use pipeline::{analyze, process_frame, validate, Analysis, Rejection};
pub use report::{
    AnalysisReport, ReportEntry, HEADER, INSUFFICIENT_LANDMARKS_MESSAGE, NO_FACE_MESSAGE,
};
pub use session::{Session, Status, TickOutput};
pub use types::{LandmarkSet, PixelPoint, Point};
