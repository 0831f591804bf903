//! Bounding rectangle of the dominant foreground region in a binary image.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::core::{contour_area, Rect};

/// Returns the bounding rectangle of the largest-area external contour.
///
/// The input is treated as binary: any non-zero pixel is foreground. Returns
/// the empty rectangle when the image contains no foreground contours.
pub fn largest_region_rect(image: &GrayImage) -> Rect {
    if image.width() == 0 || image.height() == 0 {
        return Rect::empty();
    }
    find_contours::<u32>(image)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .max_by(|a, b| contour_area(&a.points).total_cmp(&contour_area(&b.points)))
        .map(Rect::bounding)
        .unwrap_or_else(Rect::empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(image: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn picks_largest_region() {
        let mut image = GrayImage::new(100, 50);
        fill(&mut image, 5, 5, 10, 8);
        fill(&mut image, 30, 10, 40, 20);
        let rect = largest_region_rect(&image);
        assert_eq!(rect, Rect::new(30, 10, 40, 20));
    }

    #[test]
    fn empty_for_blank_image() {
        let image = GrayImage::new(64, 64);
        assert!(largest_region_rect(&image).is_empty());
    }
}
