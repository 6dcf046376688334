// src/annotation.rs - Overlay of accepted particle outlines

use bresenham::Bresenham;
use image::{GrayImage, Rgb, RgbImage};

use crate::contours::Contour;
use crate::image_utils::{gray_to_rgb, in_bounds};
use crate::shape_analysis::ParticleRecord;

/// Pixels of the closed polyline through the contour vertices
pub fn outline_pixels(contour: &Contour) -> Vec<(i32, i32)> {
    let points = &contour.points;
    match points.len() {
        0 => Vec::new(),
        1 => vec![(points[0].x, points[0].y)],
        n => (0..n)
            .flat_map(|i| {
                let p = points[i];
                let q = points[(i + 1) % n];
                // Each segment excludes its end point, which the next one starts at
                Bresenham::new((p.x as isize, p.y as isize), (q.x as isize, q.y as isize))
            })
            .map(|(x, y)| (x as i32, y as i32))
            .collect(),
    }
}

/// Draw a single-pixel outline of a contour onto `canvas`
pub fn draw_contour_mut(canvas: &mut RgbImage, contour: &Contour, color: [u8; 3]) {
    let (width, height) = canvas.dimensions();
    for (x, y) in outline_pixels(contour) {
        if in_bounds(x, y, width, height) {
            canvas.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}

/// Colour copy of the enhanced image with every retained particle outlined
pub fn annotate_particles(enhanced: &GrayImage, particles: &[ParticleRecord], color: [u8; 3]) -> RgbImage {
    let mut canvas = gray_to_rgb(enhanced);
    for particle in particles {
        draw_contour_mut(&mut canvas, &particle.contour, color);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape_analysis::measure_contour;
    use image::Luma;

    #[test]
    fn square_outline_is_closed_and_single_pixel() {
        let square = Contour::from_coords(&[(2, 2), (6, 2), (6, 6), (2, 6)]);
        let mut pixels = outline_pixels(&square);
        pixels.sort();
        pixels.dedup();
        // 5x5 ring
        assert_eq!(pixels.len(), 16);
        assert!(pixels.contains(&(2, 2)));
        assert!(pixels.contains(&(6, 6)));
        assert!(!pixels.contains(&(4, 4)));
    }

    #[test]
    fn annotation_without_particles_is_plain_colour_copy() {
        let gray = GrayImage::from_fn(8, 8, |x, y| Luma([(x * 10 + y) as u8]));
        let annotated = annotate_particles(&gray, &[], [255, 255, 0]);
        assert_eq!(annotated, gray_to_rgb(&gray));
    }

    #[test]
    fn outline_is_drawn_in_requested_colour() {
        let gray = GrayImage::new(10, 10);
        let record = measure_contour(0, Contour::from_coords(&[(1, 1), (4, 1), (4, 4), (1, 4)]));
        let annotated = annotate_particles(&gray, &[record], [255, 255, 0]);
        assert_eq!(annotated.get_pixel(1, 1), &Rgb([255, 255, 0]));
        assert_eq!(annotated.get_pixel(4, 2), &Rgb([255, 255, 0]));
        assert_eq!(annotated.get_pixel(2, 2), &Rgb([0, 0, 0]));
        assert_eq!(annotated.dimensions(), (10, 10));
    }

    #[test]
    fn points_outside_canvas_are_clipped() {
        let mut canvas = RgbImage::new(3, 3);
        let contour = Contour::from_coords(&[(-2, 1), (5, 1)]);
        draw_contour_mut(&mut canvas, &contour, [1, 2, 3]);
        assert_eq!(canvas.get_pixel(0, 1), &Rgb([1, 2, 3]));
        assert_eq!(canvas.get_pixel(2, 1), &Rgb([1, 2, 3]));
        assert_eq!(canvas.get_pixel(1, 0), &Rgb([0, 0, 0]));
    }
}
