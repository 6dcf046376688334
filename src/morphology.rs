use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

use crate::config::validate_kernel_size;
use crate::errors::{ParticleError, Result};

/// Chessboard radius of a square structuring element with the given side length
fn square_radius(kernel_size: u32) -> Result<u8> {
    validate_kernel_size("morphology kernel size", kernel_size)?;
    u8::try_from(kernel_size / 2).map_err(|_| {
        ParticleError::Config(format!("morphology kernel size {} is too large", kernel_size))
    })
}

/// Apply morphological opening (erosion followed by dilation) with a square element
pub fn apply_opening(mask: &GrayImage, kernel_size: u32) -> Result<GrayImage> {
    let radius = square_radius(kernel_size)?;
    Ok(open(mask, Norm::LInf, radius))
}

/// Apply morphological closing (dilation followed by erosion) with a square element
pub fn apply_closing(mask: &GrayImage, kernel_size: u32) -> Result<GrayImage> {
    let radius = square_radius(kernel_size)?;
    Ok(close(mask, Norm::LInf, radius))
}

/// Opening then closing: drop isolated specks first, then fill small holes
pub fn clean_mask(mask: &GrayImage, kernel_size: u32) -> Result<GrayImage> {
    let opened = apply_opening(mask, kernel_size)?;
    apply_closing(&opened, kernel_size)
}
