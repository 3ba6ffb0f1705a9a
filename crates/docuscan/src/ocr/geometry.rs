//! Region geometry and cropping.

use image::RgbImage;
use image::imageops;
use serde::{Deserialize, Serialize};

/// A point in page pixel coordinates. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// A detected text quadrilateral.
///
/// Corners follow the detector's winding: top-left, top-right, bottom-right, bottom-left.
/// Serialized as `[[x, y], [x, y], [x, y], [x, y]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle from `(left, top)` to `(right, bottom)`.
    pub const fn from_rect(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new([
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    pub fn top_left(&self) -> Point {
        self.points[0]
    }

    pub fn bottom_right(&self) -> Point {
        self.points[2]
    }
}

impl From<[[f32; 2]; 4]> for Quad {
    fn from(points: [[f32; 2]; 4]) -> Self {
        Self::new(points.map(Point::from))
    }
}

/// Integer crop rectangle inside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The crop for `quad` on a `width` x `height` page, or `None` if it is degenerate.
///
/// The box spans corner 0 to corner 2. Coordinates are truncated toward zero and clamped
/// to the page, so a box hanging off an edge is cut back to the visible part and a box
/// entirely off the page is empty.
pub fn crop_box(quad: &Quad, width: u32, height: u32) -> Option<CropBox> {
    let top_left = quad.top_left();
    let bottom_right = quad.bottom_right();

    let x1 = clamp_coordinate(top_left.x, width);
    let y1 = clamp_coordinate(top_left.y, height);
    let x2 = clamp_coordinate(bottom_right.x, width);
    let y2 = clamp_coordinate(bottom_right.y, height);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(CropBox {
        x: x1,
        y: y1,
        width: x2 - x1,
        height: y2 - y1,
    })
}

/// Copy the pixels under `quad` out of `image`.
pub fn crop(image: &RgbImage, quad: &Quad) -> Option<RgbImage> {
    let bounds = crop_box(quad, image.width(), image.height())?;
    Some(imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image())
}

// NaN and negatives land on 0, anything past the edge on `limit`.
fn clamp_coordinate(value: f32, limit: u32) -> u32 {
    let truncated = value.trunc().max(0.0);
    if truncated >= limit as f32 {
        limit
    } else {
        truncated as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_quad_serializes_as_nested_arrays() {
        let quad = Quad::from_rect(1.0, 2.0, 3.5, 4.0);
        let json = serde_json::to_string(&quad).unwrap();
        assert_eq!(json, "[[1.0,2.0],[3.5,2.0],[3.5,4.0],[1.0,4.0]]");

        let back: Quad = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quad);
    }

    #[test]
    fn test_quad_corners() {
        let quad = Quad::from([[10.0, 20.0], [50.0, 21.0], [52.0, 40.0], [9.0, 39.0]]);
        assert_eq!(quad.top_left(), Point::new(10.0, 20.0));
        assert_eq!(quad.bottom_right(), Point::new(52.0, 40.0));
    }

    #[test]
    fn test_crop_box_truncates_coordinates() {
        let quad = Quad::from_rect(10.9, 5.2, 30.7, 15.99);
        let bounds = crop_box(&quad, 100, 100).unwrap();
        assert_eq!(
            bounds,
            CropBox {
                x: 10,
                y: 5,
                width: 20,
                height: 10
            }
        );
    }

    #[test]
    fn test_crop_box_zero_width_is_none() {
        assert!(crop_box(&Quad::from_rect(10.0, 0.0, 10.0, 20.0), 100, 100).is_none());
    }

    #[test]
    fn test_crop_box_zero_height_is_none() {
        assert!(crop_box(&Quad::from_rect(0.0, 7.0, 20.0, 7.9), 100, 100).is_none());
    }

    #[test]
    fn test_crop_box_inverted_is_none() {
        assert!(crop_box(&Quad::from_rect(50.0, 50.0, 10.0, 10.0), 100, 100).is_none());
    }

    #[test]
    fn test_crop_box_clamps_to_page() {
        let bounds = crop_box(&Quad::from_rect(-5.0, -5.0, 150.0, 40.0), 100, 50).unwrap();
        assert_eq!(
            bounds,
            CropBox {
                x: 0,
                y: 0,
                width: 100,
                height: 40
            }
        );
    }

    #[test]
    fn test_crop_box_outside_page_is_none() {
        assert!(crop_box(&Quad::from_rect(120.0, 10.0, 150.0, 20.0), 100, 100).is_none());
    }

    #[test]
    fn test_crop_box_nan_is_none() {
        assert!(crop_box(&Quad::from_rect(f32::NAN, 0.0, f32::NAN, 10.0), 100, 100).is_none());
    }

    #[test]
    fn test_crop_copies_pixels() {
        let mut image = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        image.put_pixel(5, 6, Rgb([255, 255, 255]));

        let cropped = crop(&image, &Quad::from_rect(5.0, 6.0, 8.0, 10.0)).unwrap();

        assert_eq!(cropped.dimensions(), (3, 4));
        assert_eq!(cropped.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(cropped.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }
}
