//! Facial distance measurements.
//!
//! Every measurement is the Euclidean distance between two landmarks after
//! they have been mapped onto the pixel grid of the analysed frame. Values
//! are therefore in pixels and scale with the capture resolution.

use serde::Serialize;

use crate::error::Result;
use crate::landmarks::{
    landmark_to_pixel, LEFT_EYE_INNER, LEFT_EYE_OUTER, MOUTH_LOWER, MOUTH_UPPER, NOSE_TIP,
};
use crate::types::{LandmarkSet, PixelPoint};

/// The fixed set of distances extracted from a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Nose tip to upper lip.
    PhiltrumLength,
    /// Upper lip to lower lip.
    LipThickness,
    /// Inner to outer corner of the left eye.
    EyeWidth,
}

impl MeasurementKind {
    /// Report order.
    pub const ALL: [MeasurementKind; 3] = [
        MeasurementKind::PhiltrumLength,
        MeasurementKind::LipThickness,
        MeasurementKind::EyeWidth,
    ];

    /// The landmark indices the distance is measured between.
    pub const fn landmarks(self) -> (usize, usize) {
        match self {
            MeasurementKind::PhiltrumLength => (NOSE_TIP, MOUTH_UPPER),
            MeasurementKind::LipThickness => (MOUTH_UPPER, MOUTH_LOWER),
            MeasurementKind::EyeWidth => (LEFT_EYE_INNER, LEFT_EYE_OUTER),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MeasurementKind::PhiltrumLength => "philtrum_length",
            MeasurementKind::LipThickness => "lip_thickness",
            MeasurementKind::EyeWidth => "eye_width",
        }
    }
}

/// A named pixel distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub pixels: f64,
}

impl Measurement {
    pub fn between(kind: MeasurementKind, a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            kind,
            pixels: a.distance(&b),
        }
    }

    /// The distance truncated toward zero, as shown to users.
    pub fn display_pixels(&self) -> i64 {
        self.pixels.trunc() as i64
    }
}

/// Pixel positions of the landmarks the measurements depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacePoints {
    pub nose_tip: PixelPoint,
    pub mouth_upper: PixelPoint,
    pub mouth_lower: PixelPoint,
    pub left_eye_inner: PixelPoint,
    pub left_eye_outer: PixelPoint,
}

impl FacePoints {
    /// Map every required landmark onto a `width` x `height` frame.
    ///
    /// Fails on the first missing index; no partial result is produced.
    pub fn from_landmarks(landmarks: &LandmarkSet, width: u32, height: u32) -> Result<Self> {
        let at = |index| landmark_to_pixel(landmarks, index, width, height);
        Ok(Self {
            nose_tip: at(NOSE_TIP)?,
            mouth_upper: at(MOUTH_UPPER)?,
            mouth_lower: at(MOUTH_LOWER)?,
            left_eye_inner: at(LEFT_EYE_INNER)?,
            left_eye_outer: at(LEFT_EYE_OUTER)?,
        })
    }
}

/// The three facial distances of one frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceMetrics {
    pub philtrum_length: f64,
    pub lip_thickness: f64,
    pub eye_width: f64,
}

impl FaceMetrics {
    pub fn from_points(points: &FacePoints) -> Self {
        Self {
            philtrum_length: points.nose_tip.distance(&points.mouth_upper),
            lip_thickness: points.mouth_upper.distance(&points.mouth_lower),
            eye_width: points.left_eye_inner.distance(&points.left_eye_outer),
        }
    }

    /// Measure a face in a `width` x `height` frame.
    pub fn from_landmarks(landmarks: &LandmarkSet, width: u32, height: u32) -> Result<Self> {
        let points = FacePoints::from_landmarks(landmarks, width, height)?;
        Ok(Self::from_points(&points))
    }

    pub fn get(&self, kind: MeasurementKind) -> Measurement {
        let pixels = match kind {
            MeasurementKind::PhiltrumLength => self.philtrum_length,
            MeasurementKind::LipThickness => self.lip_thickness,
            MeasurementKind::EyeWidth => self.eye_width,
        };
        Measurement { kind, pixels }
    }

    /// All measurements in report order.
    pub fn measurements(&self) -> [Measurement; 3] {
        MeasurementKind::ALL.map(|kind| self.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn synthetic_points() -> FacePoints {
        FacePoints {
            nose_tip: PixelPoint::new(100, 50),
            mouth_upper: PixelPoint::new(100, 90),
            mouth_lower: PixelPoint::new(100, 105),
            left_eye_inner: PixelPoint::new(60, 50),
            left_eye_outer: PixelPoint::new(130, 50),
        }
    }

    #[test]
    fn distances_from_points() {
        let m = FaceMetrics::from_points(&synthetic_points());
        assert!((m.philtrum_length - 40.0).abs() < 1e-9);
        assert!((m.lip_thickness - 15.0).abs() < 1e-9);
        assert!((m.eye_width - 70.0).abs() < 1e-9);
    }

    #[test]
    fn measurements_in_report_order() {
        let m = FaceMetrics::from_points(&synthetic_points());
        let kinds: Vec<_> = m.measurements().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, MeasurementKind::ALL.to_vec());
    }

    #[test]
    fn display_truncates() {
        let m = Measurement::between(
            MeasurementKind::EyeWidth,
            PixelPoint::new(0, 0),
            PixelPoint::new(10, 10),
        );
        // sqrt(200) = 14.142...
        assert_eq!(m.display_pixels(), 14);
        assert!(m.pixels > 14.1);
    }

    #[test]
    fn missing_landmark_fails_whole_measurement() {
        // Index 133 is the last one needed; 100 points cover all but that one.
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.5); 100]);
        assert!(FaceMetrics::from_landmarks(&set, 640, 480).is_err());
    }

    #[test]
    fn kind_landmark_pairs() {
        assert_eq!(MeasurementKind::PhiltrumLength.landmarks(), (1, 13));
        assert_eq!(MeasurementKind::LipThickness.landmarks(), (13, 14));
        assert_eq!(MeasurementKind::EyeWidth.landmarks(), (33, 133));
    }
}
