//! Threshold rules that turn measurements into trait labels.
//!
//! Thresholds are raw pixel distances and are not normalized by face size,
//! so the same face can classify differently at different resolutions.

use serde::Serialize;

use crate::metrics::{Measurement, MeasurementKind};

pub const PHILTRUM_LONG_THRESHOLD_PX: f64 = 30.0;
pub const LIP_THICK_THRESHOLD_PX: f64 = 15.0;
pub const EYE_WIDE_THRESHOLD_PX: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraitLabel {
    Long,
    Average,
    Thick,
    AverageOrThin,
    Wide,
    AverageOrNarrow,
}

impl TraitLabel {
    pub const fn description(self) -> &'static str {
        match self {
            TraitLabel::Long => {
                "A long philtrum suggests someone who seeks a healthy, stable life."
            }
            TraitLabel::Average => "An average philtrum suggests someone candid and active.",
            TraitLabel::Thick => "Full lips suggest warmth and a generous appetite for life.",
            TraitLabel::AverageOrThin => {
                "Thin or average lips suggest a rational, meticulous temperament."
            }
            TraitLabel::Wide => "Wide eyes suggest rich emotional expression and curiosity.",
            TraitLabel::AverageOrNarrow => {
                "Narrow or average eyes suggest caution and strong concentration."
            }
        }
    }
}

impl MeasurementKind {
    pub const fn threshold(self) -> f64 {
        match self {
            MeasurementKind::PhiltrumLength => PHILTRUM_LONG_THRESHOLD_PX,
            MeasurementKind::LipThickness => LIP_THICK_THRESHOLD_PX,
            MeasurementKind::EyeWidth => EYE_WIDE_THRESHOLD_PX,
        }
    }

    /// Labels for (above threshold, at or below threshold).
    pub const fn labels(self) -> (TraitLabel, TraitLabel) {
        match self {
            MeasurementKind::PhiltrumLength => (TraitLabel::Long, TraitLabel::Average),
            MeasurementKind::LipThickness => (TraitLabel::Thick, TraitLabel::AverageOrThin),
            MeasurementKind::EyeWidth => (TraitLabel::Wide, TraitLabel::AverageOrNarrow),
        }
    }
}

/// Classify a measurement. A value equal to the threshold is not above it.
pub fn classify(measurement: &Measurement) -> TraitLabel {
    let (above, otherwise) = measurement.kind.labels();
    if measurement.pixels > measurement.kind.threshold() {
        above
    } else {
        otherwise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(kind: MeasurementKind, pixels: f64) -> Measurement {
        Measurement { kind, pixels }
    }

    #[test]
    fn eye_width_is_strictly_greater() {
        assert_eq!(classify(&m(MeasurementKind::EyeWidth, 60.0)), TraitLabel::AverageOrNarrow);
        assert_eq!(classify(&m(MeasurementKind::EyeWidth, 60.0001)), TraitLabel::Wide);
        assert_eq!(classify(&m(MeasurementKind::EyeWidth, 0.0)), TraitLabel::AverageOrNarrow);
    }

    #[test]
    fn philtrum_boundary() {
        assert_eq!(classify(&m(MeasurementKind::PhiltrumLength, 30.0)), TraitLabel::Average);
        assert_eq!(classify(&m(MeasurementKind::PhiltrumLength, 30.5)), TraitLabel::Long);
    }

    #[test]
    fn lip_boundary() {
        assert_eq!(classify(&m(MeasurementKind::LipThickness, 15.0)), TraitLabel::AverageOrThin);
        assert_eq!(classify(&m(MeasurementKind::LipThickness, 15.01)), TraitLabel::Thick);
    }

    #[test]
    fn classification_is_a_step_function() {
        for kind in MeasurementKind::ALL {
            let (above, otherwise) = kind.labels();
            let t = kind.threshold();
            for delta in [-10.0, -1.0, -1e-6, 0.0] {
                assert_eq!(classify(&m(kind, t + delta)), otherwise);
            }
            for delta in [1e-6, 1.0, 10.0, 1000.0] {
                assert_eq!(classify(&m(kind, t + delta)), above);
            }
        }
    }

    #[test]
    fn every_label_has_text() {
        for label in [
            TraitLabel::Long,
            TraitLabel::Average,
            TraitLabel::Thick,
            TraitLabel::AverageOrThin,
            TraitLabel::Wide,
            TraitLabel::AverageOrNarrow,
        ] {
            assert!(!label.description().is_empty());
        }
    }
}
