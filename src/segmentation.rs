// src/segmentation.rs - Binary foreground/background masks from an enhanced image

use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::filter::box_filter;

use crate::config::{validate_kernel_size, Config, ThresholdMethod};
use crate::denoise::median_denoise;
use crate::errors::Result;
use crate::image_utils::is_uniform;
use crate::morphology::clean_mask;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Global threshold at the Otsu level; pixels strictly above it become foreground.
/// Returns the mask and the chosen level.
pub fn otsu_threshold(image: &GrayImage) -> (GrayImage, u8) {
    let (width, height) = image.dimensions();
    if is_uniform(image) {
        return (GrayImage::new(width, height), 0);
    }

    let level = otsu_level(image);
    (threshold(image, level), level)
}

/// Foreground where `value > local_mean - constant`, with the mean taken over a
/// `block_size x block_size` neighbourhood.
pub fn adaptive_mean_threshold(image: &GrayImage, block_size: u32, constant: i32) -> Result<GrayImage> {
    validate_kernel_size("threshold_block_size", block_size)?;

    let (width, height) = image.dimensions();
    if is_uniform(image) {
        return Ok(GrayImage::new(width, height));
    }

    let radius = block_size / 2;
    let means = box_filter(image, radius, radius);

    let mut mask = GrayImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let local = means.get_pixel(x, y)[0] as i32 - constant;
        let value = if pixel[0] as i32 > local { FOREGROUND } else { BACKGROUND };
        mask.put_pixel(x, y, Luma([value]));
    }

    Ok(mask)
}

/// Blur, threshold and clean a denoised image into a binary mask
pub fn segment(image: &GrayImage, config: &Config) -> Result<GrayImage> {
    let blurred = median_denoise(image, config.threshold_blur_kernel_size)?;

    let mask = match config.threshold_method {
        ThresholdMethod::Otsu => {
            let (mask, level) = otsu_threshold(&blurred);
            log::debug!("Otsu level: {}", level);
            mask
        }
        ThresholdMethod::AdaptiveMean => adaptive_mean_threshold(
            &blurred,
            config.threshold_block_size,
            config.threshold_constant,
        )?,
    };

    clean_mask(&mask, config.morph_kernel_size)
}
