//! Face-mesh landmark indices and the normalized-to-pixel mapping.

use crate::error::{Error, Result};
use crate::types::{LandmarkSet, PixelPoint, Point};

/// Tip of the nose.
pub const NOSE_TIP: usize = 1;
/// Centre of the upper lip's inner edge.
pub const MOUTH_UPPER: usize = 13;
/// Centre of the lower lip's inner edge.
pub const MOUTH_LOWER: usize = 14;
/// Inner corner of the left eye.
pub const LEFT_EYE_INNER: usize = 33;
/// Outer corner of the left eye.
pub const LEFT_EYE_OUTER: usize = 133;
/// Centre of the chin. Not used by any current measurement.
pub const CHIN_CENTER: usize = 199;

/// Landmark count of the base face mesh.
pub const MIN_LANDMARKS: usize = 468;
/// Landmark count with iris refinement enabled.
pub const REFINED_LANDMARKS: usize = 478;

/// Map a normalized point onto the pixel grid of a `width` x `height` frame.
///
/// Coordinates are scaled and truncated toward zero.
pub fn to_pixel(point: Point, width: u32, height: u32) -> PixelPoint {
    let x = f64::from(point.x) * f64::from(width);
    let y = f64::from(point.y) * f64::from(height);
    PixelPoint::new(x as i32, y as i32)
}

/// Pixel position of landmark `index` in a `width` x `height` frame.
pub fn landmark_to_pixel(
    landmarks: &LandmarkSet,
    index: usize,
    width: u32,
    height: u32,
) -> Result<PixelPoint> {
    let point = landmarks.get(index).ok_or(Error::IndexOutOfRange {
        index,
        len: landmarks.num_landmarks(),
    })?;
    Ok(to_pixel(*point, width, height))
}

/// Whether the set includes the iris points added by refinement.
pub fn is_refined(landmarks: &LandmarkSet) -> bool {
    landmarks.num_landmarks() >= REFINED_LANDMARKS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(n: usize) -> LandmarkSet {
        LandmarkSet::new(vec![Point::new(0.5, 0.5); n])
    }

    #[test]
    fn scales_and_truncates() {
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.25), Point::new(0.999, 0.999)]);
        assert_eq!(landmark_to_pixel(&set, 0, 640, 480).unwrap(), PixelPoint::new(320, 120));
        // 0.999 * 640 = 639.36, 0.999 * 480 = 479.52
        assert_eq!(landmark_to_pixel(&set, 1, 640, 480).unwrap(), PixelPoint::new(639, 479));
    }

    #[test]
    fn negative_coordinates_truncate_toward_zero() {
        let p = to_pixel(Point::new(-0.001, -0.5), 640, 480);
        assert_eq!(p, PixelPoint::new(0, -240));
    }

    #[test]
    fn out_of_range_index() {
        let set = mesh(10);
        let err = landmark_to_pixel(&set, 10, 640, 480).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 10, len: 10 }));
    }

    #[test]
    fn required_indices_exist_in_base_mesh() {
        let set = mesh(MIN_LANDMARKS);
        let required = [
            NOSE_TIP,
            MOUTH_UPPER,
            MOUTH_LOWER,
            LEFT_EYE_INNER,
            LEFT_EYE_OUTER,
            CHIN_CENTER,
        ];
        for index in required {
            assert!(landmark_to_pixel(&set, index, 640, 480).is_ok());
        }
    }

    #[test]
    fn refinement_is_detected_from_count() {
        assert!(!is_refined(&mesh(MIN_LANDMARKS)));
        assert!(is_refined(&mesh(REFINED_LANDMARKS)));
    }

    #[test]
    fn mapping_is_deterministic() {
        let p = Point::new(0.3127, 0.6611);
        assert_eq!(to_pixel(p, 1280, 720), to_pixel(p, 1280, 720));
    }

    #[test]
    fn mapping_grows_with_frame_size() {
        let p = Point::new(0.5, 0.5);
        let mut last = to_pixel(p, 100, 100);
        for size in (102..=1000).step_by(2) {
            let next = to_pixel(p, size, size);
            assert!(next.x > last.x);
            assert!(next.y > last.y);
            last = next;
        }
    }

    #[test]
    fn mapping_never_shrinks() {
        let p = Point::new(0.3127, 0.6611);
        let mut last = to_pixel(p, 1, 1);
        for size in 2..=1000 {
            let next = to_pixel(p, size, size);
            assert!(next.x >= last.x);
            assert!(next.y >= last.y);
            last = next;
        }
    }
}
