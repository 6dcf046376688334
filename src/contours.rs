// src/contours.rs - Outer boundary extraction from binary masks

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// Closed boundary of a connected foreground region, as polygon vertices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Build a contour from `(x, y)` pairs
    pub fn from_coords(coords: &[(i32, i32)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Drop vertices that continue in the same direction as the previous step.
/// The chain is treated as closed, so a run crossing the start point is merged too.
pub fn simplify_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let simplified: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let (ax, ay) = (cur.x - prev.x, cur.y - prev.y);
            let (bx, by) = (next.x - cur.x, next.y - cur.y);
            let cross = ax * by - ay * bx;
            let dot = ax * bx + ay * by;
            cross != 0 || dot <= 0
        })
        .map(|i| points[i])
        .collect();

    if simplified.is_empty() {
        points[..1].to_vec()
    } else {
        simplified
    }
}

/// Outer boundaries of the top-level foreground components of `mask`.
/// Hole borders and components nested inside holes are skipped; an empty
/// mask yields an empty list.
pub fn find_outer_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(simplify_chain(&c.points)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill_rect(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn empty_mask_has_no_contours() {
        assert!(find_outer_contours(&GrayImage::new(20, 20)).is_empty());
    }

    #[test]
    fn square_reduces_to_four_corners() {
        let mut mask = GrayImage::new(20, 20);
        fill_rect(&mut mask, 5, 5, 10, 10, 255);
        let contours = find_outer_contours(&mask);
        assert_eq!(contours.len(), 1);

        let mut corners: Vec<(i32, i32)> = contours[0].points.iter().map(|p| (p.x, p.y)).collect();
        corners.sort();
        assert_eq!(corners, vec![(5, 5), (5, 14), (14, 5), (14, 14)]);
    }

    #[test]
    fn holes_and_nested_islands_are_excluded() {
        let mut mask = GrayImage::new(40, 40);
        fill_rect(&mut mask, 5, 5, 30, 30, 255);
        fill_rect(&mut mask, 10, 10, 20, 20, 0);
        fill_rect(&mut mask, 17, 17, 5, 5, 255);
        fill_rect(&mut mask, 37, 37, 2, 2, 255);

        let contours = find_outer_contours(&mask);
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn simplify_merges_runs_across_the_seam() {
        // Starts in the middle of the top edge
        let chain = Contour::from_coords(&[
            (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1), (0, 0),
        ]);
        let simplified = simplify_chain(&chain.points);
        assert_eq!(
            simplified,
            Contour::from_coords(&[(2, 0), (2, 2), (0, 2), (0, 0)]).points
        );
    }

    #[test]
    fn simplify_keeps_reversals() {
        // Single-pixel-wide line traced out and back
        let chain = Contour::from_coords(&[(0, 0), (1, 0), (2, 0), (1, 0)]);
        let simplified = simplify_chain(&chain.points);
        assert_eq!(simplified, Contour::from_coords(&[(0, 0), (2, 0)]).points);
    }

    #[test]
    fn single_pixel_contour_survives() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(2, 2, Luma([255]));
        let contours = find_outer_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 1);
    }
}
