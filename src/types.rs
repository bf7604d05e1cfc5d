use serde::{Deserialize, Serialize};

/// A landmark position in normalized image coordinates.
///
/// Detectors report `x` and `y` relative to the analysed image, nominally in
/// `[0, 1]`. Values slightly outside that range occur for faces touching the
/// image border and are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A position on the integer pixel grid of one specific frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// The ordered landmarks of a single detected face.
///
/// Face-mesh detectors return 468 points, or 478 when iris refinement is
/// enabled. Indices are stable across frames for a given detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    pub points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn num_landmarks(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a LandmarkSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_distance() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance(&a) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn pixel_distance_is_not_truncated() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(1, 1);
        assert!((a.distance(&b) - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn landmark_lookup_is_bounds_checked() {
        let set = LandmarkSet::new(vec![Point::new(0.1, 0.2), Point::new(0.3, 0.4)]);
        assert_eq!(set.num_landmarks(), 2);
        assert_eq!(set.get(1), Some(&Point::new(0.3, 0.4)));
        assert!(set.get(2).is_none());
    }

    #[test]
    fn landmark_set_serializes_as_point_list() {
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.25)]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"x":0.5,"y":0.25}]"#);

        let back: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
