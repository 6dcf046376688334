// src/preprocess.rs - Bit depth normalization and contrast enhancement

use image::{GrayImage, Luma};

use crate::config::Config;
use crate::image_utils::SourceImage;

const HIST_BINS: usize = 256;

/// Linearly rescale the source range [min, max] onto [0, 255].
/// A constant image maps to all zeros.
pub fn normalize_to_u8(image: &SourceImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let samples = image.samples();

    let min = samples.iter().copied().min().unwrap_or(0);
    let max = samples.iter().copied().max().unwrap_or(0);

    if max == min {
        return GrayImage::new(width, height);
    }

    let scale = 255.0 / (max - min) as f64;
    let data = samples
        .iter()
        .map(|&v| ((v - min) as f64 * scale).round().clamp(0.0, 255.0) as u8)
        .collect();

    // Length always matches width * height since both come from the same buffer
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| GrayImage::new(width, height))
}

/// `out = saturate(|gain * x + bias|)`
pub fn apply_linear_contrast(image: &GrayImage, gain: f64, bias: f64) -> GrayImage {
    let mut lut = [0u8; HIST_BINS];
    for (value, slot) in lut.iter_mut().enumerate() {
        *slot = (gain * value as f64 + bias).abs().round().min(255.0) as u8;
    }

    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel[0] = lut[pixel[0] as usize];
    }
    result
}

/// Reflect an out-of-range index back into [0, len) without repeating the edge sample
#[inline]
fn reflect_101(index: u32, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    if index < len {
        index
    } else {
        (2 * len - 2).saturating_sub(index).min(len - 1)
    }
}

/// Tile index pair around `pos` and the weight of the second tile along one axis
fn tile_weights(pos: u32, tile: u32, tiles: u32) -> (usize, usize, f64) {
    let f = pos as f64 / tile as f64 - 0.5;
    let lo = f.floor();
    let weight = f - lo;
    let t0 = lo.max(0.0).min((tiles - 1) as f64) as usize;
    let t1 = (lo + 1.0).max(0.0).min((tiles - 1) as f64) as usize;
    (t0, t1, weight)
}

/// Contrast limited adaptive histogram equalization.
///
/// The image is split into `tile_grid[0] x tile_grid[1]` equally sized tiles
/// (the right and bottom edges are padded by reflection so every tile has the
/// same area). Each tile histogram is clipped at
/// `max(1, clip_limit * tile_area / 256)` with the excess redistributed evenly,
/// and pixels are mapped by bilinear interpolation between the four nearest
/// tile lookup tables.
pub fn apply_clahe(image: &GrayImage, clip_limit: f64, tile_grid: [u32; 2]) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = tile_grid[0].max(1);
    let tiles_y = tile_grid[1].max(1);
    let tile_w = (width + tiles_x - 1) / tiles_x;
    let tile_h = (height + tiles_y - 1) / tiles_y;
    let tile_area = (tile_w * tile_h) as f64;

    let clip = ((clip_limit * tile_area / HIST_BINS as f64) as u32).max(1);
    let lut_scale = 255.0 / tile_area;

    // One lookup table per tile, row-major
    let mut luts = vec![[0u8; HIST_BINS]; (tiles_x * tiles_y) as usize];

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; HIST_BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect_101(x, width);
                    hist[image.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }

            let mut excess = 0u32;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }

            let batch = excess / HIST_BINS as u32;
            let mut residual = excess - batch * HIST_BINS as u32;
            for bin in hist.iter_mut() {
                *bin += batch;
            }
            if residual > 0 {
                let step = (HIST_BINS as u32 / residual).max(1) as usize;
                let mut i = 0;
                while i < HIST_BINS && residual > 0 {
                    hist[i] += 1;
                    residual -= 1;
                    i += step;
                }
            }

            let lut = &mut luts[(ty * tiles_x + tx) as usize];
            let mut cdf = 0u32;
            for (value, slot) in lut.iter_mut().enumerate() {
                cdf += hist[value];
                *slot = (cdf as f64 * lut_scale).round().min(255.0) as u8;
            }
        }
    }

    let mut result = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = tile_weights(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx0, tx1, wx) = tile_weights(x, tile_w, tiles_x);
            let v = image.get_pixel(x, y)[0] as usize;
            let at = |ty: usize, tx: usize| luts[ty * tiles_x as usize + tx][v] as f64;

            let top = (1.0 - wx) * at(ty0, tx0) + wx * at(ty0, tx1);
            let bottom = (1.0 - wx) * at(ty1, tx0) + wx * at(ty1, tx1);
            let value = (1.0 - wy) * top + wy * bottom;
            result.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }

    result
}

/// Normalize to 8-bit and apply the configured contrast enhancement
pub fn preprocess_image(image: &SourceImage, config: &Config) -> GrayImage {
    let normalized = normalize_to_u8(image);

    if config.use_clahe {
        apply_clahe(&normalized, config.clahe_clip_limit, config.clahe_tile_grid)
    } else {
        apply_linear_contrast(&normalized, config.contrast_gain, config.contrast_bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_utils::{is_uniform, Gray16Image};

    fn gradient16(width: u32, height: u32) -> SourceImage {
        SourceImage::Gray16(Gray16Image::from_fn(width, height, |x, y| {
            Luma([1000 + (x * 37 + y * 11) as u16])
        }))
    }

    #[test]
    fn normalize_spans_full_range() {
        let out = normalize_to_u8(&gradient16(20, 10));
        let min = out.pixels().map(|p| p[0]).min().unwrap();
        let max = out.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!((min, max), (0, 255));
        assert_eq!(out.dimensions(), (20, 10));
    }

    #[test]
    fn normalize_constant_is_zero() {
        let img = SourceImage::Gray8(GrayImage::from_pixel(6, 6, Luma([200])));
        assert!(normalize_to_u8(&img).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn preprocess_keeps_dimensions_for_both_depths() {
        for use_clahe in [true, false] {
            let config = Config {
                use_clahe,
                ..Config::default()
            };
            let out16 = preprocess_image(&gradient16(33, 17), &config);
            assert_eq!(out16.dimensions(), (33, 17));

            let img8 = SourceImage::Gray8(GrayImage::from_fn(33, 17, |x, _| Luma([(x * 7) as u8])));
            let out8 = preprocess_image(&img8, &config);
            assert_eq!(out8.dimensions(), (33, 17));
        }
    }

    #[test]
    fn linear_contrast_takes_absolute_value_and_saturates() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[0u8, 100, 255][x as usize]]));
        let out = apply_linear_contrast(&img, 0.1, -100.0);
        assert_eq!(out.get_pixel(0, 0)[0], 100);
        assert_eq!(out.get_pixel(1, 0)[0], 90);
        assert_eq!(out.get_pixel(2, 0)[0], 75);

        let bright = apply_linear_contrast(&img, 2.0, 10.0);
        assert_eq!(bright.get_pixel(1, 0)[0], 210);
        assert_eq!(bright.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn clahe_keeps_uniform_images_uniform() {
        for size in [(50, 50), (100, 100), (7, 3)] {
            let img = GrayImage::new(size.0, size.1);
            assert!(is_uniform(&apply_clahe(&img, 2.0, [8, 8])));
        }
    }

    #[test]
    fn clahe_keeps_bright_square_on_top() {
        let img = GrayImage::from_fn(100, 100, |x, y| {
            if (45..55).contains(&x) && (45..55).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let out = apply_clahe(&img, 2.0, [8, 8]);
        assert_eq!(out.get_pixel(50, 50)[0], 255);
        assert!(out.get_pixel(5, 5)[0] < 20);
        assert!(out.get_pixel(40, 50)[0] < 20);
    }

    #[test]
    fn reflect_stays_in_range() {
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(7, 5), 1);
        assert_eq!(reflect_101(20, 5), 0);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn tile_blend_starts_half_a_tile_in() {
        // Two tiles of width 4: pixel 2 sits exactly on the first tile centre
        assert_eq!(tile_weights(2, 4, 2), (0, 1, 0.0));
        assert_eq!(tile_weights(4, 4, 2), (0, 1, 0.5));
        assert_eq!(tile_weights(6, 4, 2), (1, 1, 0.0));
        // Left of the first centre clamps to tile 0
        let (t0, t1, _) = tile_weights(0, 4, 2);
        assert_eq!((t0, t1), (0, 0));
    }

    #[test]
    fn clahe_blends_between_tile_tables() {
        // Left half dark, right half bright, one tile each
        let img = GrayImage::from_fn(8, 1, |x, _| if x < 4 { Luma([10]) } else { Luma([200]) });
        let out = apply_clahe(&img, 2.0, [2, 1]);
        // Pixels at the tile centres use a single table
        let left = apply_clahe(&GrayImage::from_pixel(4, 1, Luma([10])), 2.0, [1, 1]);
        assert_eq!(out.get_pixel(2, 0)[0], left.get_pixel(0, 0)[0]);
        assert_eq!(out.dimensions(), (8, 1));
    }
}
