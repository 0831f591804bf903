//! Visualization of segmentation results.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as DrawRect;

use crate::core::Rect;
use crate::processors::Segmentation;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const BORDER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Renders the band with the border crop and every character candidate box
/// drawn on top.
pub fn segmentation_overlay(band: &GrayImage, segmentation: &Segmentation) -> RgbImage {
    let mut canvas = RgbImage::from_fn(band.width(), band.height(), |x, y| {
        let v = band.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    draw_rect(&mut canvas, &segmentation.border, BORDER_COLOR);
    for line in &segmentation.lines {
        for cell in line {
            let absolute = cell.translate(segmentation.border.x, segmentation.border.y);
            draw_rect(&mut canvas, &absolute, BOX_COLOR);
        }
    }
    canvas
}

fn draw_rect(canvas: &mut RgbImage, rect: &Rect, color: Rgb<u8>) {
    if rect.is_empty() {
        return;
    }
    draw_hollow_rect_mut(
        canvas,
        DrawRect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MrzLayout;
    use image::Luma;

    #[test]
    fn overlay_marks_candidate_boxes() {
        let band = GrayImage::from_pixel(40, 20, Luma([128]));
        let segmentation = Segmentation {
            layout: MrzLayout::Td3,
            td1_confidence: 0.0,
            td3_confidence: 1.0,
            border: Rect::new(0, 0, 40, 20),
            lines: vec![vec![Rect::new(5, 5, 6, 10)]],
        };
        let overlay = segmentation_overlay(&band, &segmentation);
        assert_eq!(overlay.get_pixel(5, 5), &BOX_COLOR);
        assert_eq!(overlay.get_pixel(20, 10), &Rgb([128, 128, 128]));
    }
}
