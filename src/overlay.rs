//! Drawing helpers for the display buffer.

use image::{Rgb, RgbImage};

use crate::landmarks::to_pixel;
use crate::types::LandmarkSet;

pub const MARKER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Plot a single-pixel marker at every landmark. Points that fall outside
/// the frame are skipped. Returns the number of markers drawn.
pub fn draw_landmarks(frame: &mut RgbImage, landmarks: &LandmarkSet) -> usize {
    let (width, height) = frame.dimensions();
    let mut drawn = 0;

    for point in landmarks {
        let p = to_pixel(*point, width, height);
        if p.x >= 0 && p.x < width as i32 && p.y >= 0 && p.y < height as i32 {
            frame.put_pixel(p.x as u32, p.y as u32, MARKER_COLOR);
            drawn += 1;
        }
    }

    drawn
}

/// A uniformly coloured frame shown while no camera is connected.
pub fn placeholder_frame(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn marks_exact_pixels() {
        let mut frame = RgbImage::new(10, 10);
        let set = LandmarkSet::new(vec![Point::new(0.0, 0.0), Point::new(0.55, 0.39)]);
        assert_eq!(draw_landmarks(&mut frame, &set), 2);

        assert_eq!(*frame.get_pixel(0, 0), MARKER_COLOR);
        assert_eq!(*frame.get_pixel(5, 3), MARKER_COLOR);
        // Single pixel, no neighbours.
        assert_eq!(*frame.get_pixel(6, 3), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(5, 4), Rgb([0, 0, 0]));
    }

    #[test]
    fn skips_out_of_frame_points() {
        let mut frame = RgbImage::new(4, 4);
        let set = LandmarkSet::new(vec![
            Point::new(1.0, 0.5),
            Point::new(-0.5, 0.5),
            Point::new(0.5, 1.2),
        ]);
        assert_eq!(draw_landmarks(&mut frame, &set), 0);
        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn placeholder_is_uniform() {
        let frame = placeholder_frame(8, 6, [120, 120, 120]);
        assert_eq!(frame.dimensions(), (8, 6));
        assert!(frame.pixels().all(|p| *p == Rgb([120, 120, 120])));
    }
}
