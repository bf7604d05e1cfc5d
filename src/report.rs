//! Human-readable analysis report.

use std::fmt;

use serde::Serialize;

use crate::classify::{classify, TraitLabel};
use crate::metrics::{FaceMetrics, Measurement, MeasurementKind};

pub const HEADER: &str = "Face reading results:";
pub const NO_FACE_MESSAGE: &str = "No face found.";
pub const INSUFFICIENT_LANDMARKS_MESSAGE: &str = "Not enough facial landmarks to analyze.";

/// One classified measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportEntry {
    pub measurement: Measurement,
    pub label: TraitLabel,
}

impl ReportEntry {
    pub fn new(measurement: Measurement) -> Self {
        Self {
            measurement,
            label: classify(&measurement),
        }
    }

    fn value_line(&self) -> String {
        let title = match self.measurement.kind {
            MeasurementKind::PhiltrumLength => "Philtrum length",
            MeasurementKind::LipThickness => "Lip thickness",
            MeasurementKind::EyeWidth => "Eye width",
        };
        format!("{} (est.): {} px", title, self.measurement.display_pixels())
    }

    fn description_line(&self) -> String {
        format!(" - {}", self.label.description())
    }
}

/// The outcome of analysing one frame or image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisReport {
    Traits { entries: Vec<ReportEntry> },
    NoFace,
    InsufficientLandmarks,
}

impl AnalysisReport {
    /// Classify every measurement, in report order.
    pub fn from_metrics(metrics: &FaceMetrics) -> Self {
        let entries = metrics
            .measurements()
            .into_iter()
            .map(ReportEntry::new)
            .collect();
        AnalysisReport::Traits { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        match self {
            AnalysisReport::Traits { entries } => entries,
            _ => &[],
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            AnalysisReport::Traits { entries } => {
                let mut lines = Vec::with_capacity(1 + entries.len() * 2);
                lines.push(HEADER.to_string());
                for entry in entries {
                    lines.push(entry.value_line());
                    lines.push(entry.description_line());
                }
                lines
            }
            AnalysisReport::NoFace => vec![NO_FACE_MESSAGE.to_string()],
            AnalysisReport::InsufficientLandmarks => {
                vec![INSUFFICIENT_LANDMARKS_MESSAGE.to_string()]
            }
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_then_pairs() {
        let report = AnalysisReport::from_metrics(&FaceMetrics {
            philtrum_length: 40.0,
            lip_thickness: 15.0,
            eye_width: 70.9,
        });
        let lines = report.lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "Philtrum length (est.): 40 px");
        assert_eq!(lines[2], format!(" - {}", TraitLabel::Long.description()));
        assert_eq!(lines[3], "Lip thickness (est.): 15 px");
        assert_eq!(lines[4], format!(" - {}", TraitLabel::AverageOrThin.description()));
        assert_eq!(lines[5], "Eye width (est.): 70 px");
        assert_eq!(lines[6], format!(" - {}", TraitLabel::Wide.description()));
    }

    #[test]
    fn rejection_messages_are_single_distinct_lines() {
        let no_face = AnalysisReport::NoFace.lines();
        let insufficient = AnalysisReport::InsufficientLandmarks.lines();
        assert_eq!(no_face, vec![NO_FACE_MESSAGE.to_string()]);
        assert_eq!(insufficient, vec![INSUFFICIENT_LANDMARKS_MESSAGE.to_string()]);
        assert_ne!(no_face, insufficient);
        assert!(AnalysisReport::NoFace.entries().is_empty());
    }

    #[test]
    fn display_joins_lines() {
        assert_eq!(AnalysisReport::NoFace.to_string(), NO_FACE_MESSAGE);
        let report = AnalysisReport::from_metrics(&FaceMetrics {
            philtrum_length: 1.0,
            lip_thickness: 1.0,
            eye_width: 1.0,
        });
        assert_eq!(report.to_string().lines().count(), 7);
    }

    #[test]
    fn rendering_is_deterministic() {
        let metrics = FaceMetrics {
            philtrum_length: 33.3,
            lip_thickness: 9.9,
            eye_width: 61.0,
        };
        assert_eq!(
            AnalysisReport::from_metrics(&metrics).to_string(),
            AnalysisReport::from_metrics(&metrics).to_string()
        );
    }
}
