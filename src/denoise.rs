use image::GrayImage;
use imageproc::filter::median_filter;

use crate::config::validate_kernel_size;
use crate::errors::Result;

/// Median filter over a `kernel_size x kernel_size` square.
/// `kernel_size` must be odd and at least 3.
pub fn median_denoise(image: &GrayImage, kernel_size: u32) -> Result<GrayImage> {
    validate_kernel_size("median kernel size", kernel_size)?;
    let radius = kernel_size / 2;
    Ok(median_filter(image, radius, radius))
}
