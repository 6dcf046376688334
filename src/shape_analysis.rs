use std::f64::consts::PI;

use imageproc::point::Point;

use crate::contours::Contour;

/// Axis aligned bounds of a contour, inclusive pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// A retained contour together with its measurements
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    /// Index of the contour in extraction order
    pub index: usize,
    pub contour: Contour,
    pub area: f64,
    pub perimeter: f64,
    pub circularity: f64,
    pub centroid: (f64, f64),
    pub bounding_box: BoundingBox,
}

/// Signed polygon area via the shoelace formula
pub fn calculate_signed_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area: i64 = 0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }

    twice_area as f64 / 2.0
}

/// Enclosed area of a contour (absolute shoelace area)
pub fn calculate_area(points: &[Point<i32>]) -> f64 {
    calculate_signed_area(points).abs()
}

/// Calculate the perimeter of the closed polygon
pub fn calculate_perimeter(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len();
    (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n]; // Wrap around to first point
            let dx = (q.x - p.x) as f64;
            let dy = (q.y - p.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Calculate circularity of the shape (4π * Area / Perimeter²)
/// 1.0 for a perfect circle, < 1.0 for other shapes
pub fn calculate_circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    (4.0 * PI * area) / (perimeter * perimeter)
}

/// Polygon centroid; degenerate polygons fall back to the vertex mean
pub fn calculate_centroid(points: &[Point<i32>]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }

    let signed_area = calculate_signed_area(points);
    if signed_area == 0.0 {
        let n = points.len() as f64;
        let sx: f64 = points.iter().map(|p| p.x as f64).sum();
        let sy: f64 = points.iter().map(|p| p.y as f64).sum();
        return (sx / n, sy / n);
    }

    let n = points.len();
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = (p.x as f64) * (q.y as f64) - (q.x as f64) * (p.y as f64);
        cx += (p.x + q.x) as f64 * cross;
        cy += (p.y + q.y) as f64 * cross;
    }

    (cx / (6.0 * signed_area), cy / (6.0 * signed_area))
}

pub fn calculate_bounding_box(points: &[Point<i32>]) -> BoundingBox {
    let mut bbox = BoundingBox {
        min_x: i32::MAX,
        min_y: i32::MAX,
        max_x: i32::MIN,
        max_y: i32::MIN,
    };
    for p in points {
        bbox.min_x = bbox.min_x.min(p.x);
        bbox.min_y = bbox.min_y.min(p.y);
        bbox.max_x = bbox.max_x.max(p.x);
        bbox.max_y = bbox.max_y.max(p.y);
    }
    if points.is_empty() {
        bbox = BoundingBox { min_x: 0, min_y: 0, max_x: 0, max_y: 0 };
    }
    bbox
}

/// Measure a contour without any filtering
pub fn measure_contour(index: usize, contour: Contour) -> ParticleRecord {
    let area = calculate_area(&contour.points);
    let perimeter = calculate_perimeter(&contour.points);
    ParticleRecord {
        index,
        area,
        perimeter,
        circularity: calculate_circularity(area, perimeter),
        centroid: calculate_centroid(&contour.points),
        bounding_box: calculate_bounding_box(&contour.points),
        contour,
    }
}

/// Keep contours whose area lies in the inclusive range `[min_area, max_area]`
pub fn filter_by_area(contours: Vec<Contour>, min_area: f64, max_area: f64) -> Vec<ParticleRecord> {
    contours
        .into_iter()
        .enumerate()
        .map(|(index, contour)| measure_contour(index, contour))
        .filter(|record| record.area >= min_area && record.area <= max_area)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn rect(w: i32, h: i32) -> Contour {
        Contour::from_coords(&[(0, 0), (w, 0), (w, h), (0, h)])
    }

    #[test]
    fn shoelace_area_ignores_orientation() {
        let cw = rect(4, 5);
        let mut ccw = cw.clone();
        ccw.points.reverse();
        assert_approx_eq!(calculate_area(&cw.points), 20.0);
        assert_approx_eq!(calculate_area(&ccw.points), 20.0);
        assert_approx_eq!(calculate_signed_area(&cw.points), -calculate_signed_area(&ccw.points));
    }

    #[test]
    fn area_filter_boundaries_are_inclusive() {
        let min_area = 20.0;
        let max_area = 5000.0;
        let contours = vec![
            rect(4, 5),     // exactly min_area
            rect(1, 19),    // min_area - 1
            rect(50, 100),  // exactly max_area
            rect(3, 1667),  // max_area + 1
        ];
        let kept = filter_by_area(contours, min_area, max_area);
        let indices: Vec<usize> = kept.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_approx_eq!(kept[0].area, 20.0);
        assert_approx_eq!(kept[1].area, 5000.0);
    }

    #[test]
    fn degenerate_contours_have_zero_area() {
        assert_eq!(calculate_area(&Contour::from_coords(&[(3, 3)]).points), 0.0);
        assert_eq!(calculate_area(&Contour::from_coords(&[(0, 0), (5, 0)]).points), 0.0);
    }

    #[test]
    fn rectangle_measurements() {
        let record = measure_contour(7, rect(4, 2));
        assert_eq!(record.index, 7);
        assert_approx_eq!(record.perimeter, 12.0);
        assert_approx_eq!(record.centroid.0, 2.0);
        assert_approx_eq!(record.centroid.1, 1.0);
        assert_eq!(
            record.bounding_box,
            BoundingBox { min_x: 0, min_y: 0, max_x: 4, max_y: 2 }
        );
        assert!(record.circularity > 0.0 && record.circularity < 1.0);
    }

    #[test]
    fn degenerate_centroid_is_vertex_mean() {
        let (cx, cy) = calculate_centroid(&Contour::from_coords(&[(0, 0), (4, 2)]).points);
        assert_approx_eq!(cx, 2.0);
        assert_approx_eq!(cy, 1.0);
    }
}
