// src/pipeline.rs - Per-image particle detection pipeline

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};

use crate::annotation::annotate_particles;
use crate::config::Config;
use crate::contours::find_outer_contours;
use crate::denoise::median_denoise;
use crate::errors::Result;
use crate::image_io::{output_path, save_gray_image, save_rgb_image, InputImage};
use crate::image_utils::SourceImage;
use crate::output::write_particle_csv;
use crate::preprocess::preprocess_image;
use crate::segmentation::segment;
use crate::shape_analysis::{filter_by_area, ParticleRecord};

pub const ADJUSTED_SUFFIX: &str = "adjusted";
pub const CONTOURS_SUFFIX: &str = "contours";
pub const MASK_SUFFIX: &str = "mask";

/// Every intermediate of one pipeline run, kept in memory
pub struct Analysis {
    /// Normalized and contrast enhanced image
    pub adjusted: GrayImage,
    pub denoised: GrayImage,
    /// Cleaned binary mask
    pub mask: GrayImage,
    /// Number of outer contours before the area filter
    pub contour_count: usize,
    pub particles: Vec<ParticleRecord>,
    pub annotated: RgbImage,
}

/// Files written and particles found for one input image
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub source_path: PathBuf,
    pub filename: String,
    pub adjusted_path: PathBuf,
    pub contours_path: PathBuf,
    pub particles_csv_path: Option<PathBuf>,
    pub contour_count: usize,
    pub particles: Vec<ParticleRecord>,
}

impl ImageReport {
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}

/// Run every stage on an already loaded image without touching the disk
pub fn analyze_image(image: &SourceImage, config: &Config) -> Result<Analysis> {
    // Step 1: normalize to 8-bit and enhance contrast
    let adjusted = preprocess_image(image, config);

    // Step 2: light denoise before segmentation
    let denoised = median_denoise(&adjusted, config.denoise_kernel_size)?;

    // Step 3: blur, threshold, open, close
    let mask = segment(&denoised, config)?;

    // Step 4: outer contours and area filter
    let contours = find_outer_contours(&mask);
    let contour_count = contours.len();
    let particles = filter_by_area(contours, config.min_area, config.max_area);

    // Step 5: outline accepted particles on the enhanced image
    let annotated = annotate_particles(&adjusted, &particles, config.contour_color_rgb);

    Ok(Analysis {
        adjusted,
        denoised,
        mask,
        contour_count,
        particles,
        annotated,
    })
}

/// Process a single image and write its outputs into `output_dir`
pub fn process_image(
    input_image: InputImage,
    config: &Config,
    output_dir: &Path,
    debug: bool,
) -> Result<ImageReport> {
    let InputImage { image, path, filename } = input_image;

    let (width, height) = image.dimensions();
    log::debug!(
        "{}: {}x{} pixels, {}-bit",
        filename,
        width,
        height,
        image.bit_depth().bits()
    );

    let analysis = analyze_image(&image, config)?;

    let adjusted_path = output_path(output_dir, &filename, ADJUSTED_SUFFIX, &config.output_extension);
    save_gray_image(&analysis.adjusted, &adjusted_path)?;

    let contours_path = output_path(output_dir, &filename, CONTOURS_SUFFIX, &config.output_extension);
    save_rgb_image(&analysis.annotated, &contours_path)?;

    let particles_csv_path = if config.write_particle_csv {
        Some(write_particle_csv(&analysis.particles, output_dir, &filename)?)
    } else {
        None
    };

    if debug {
        let debug_dir = output_dir.join("debug");
        fs::create_dir_all(&debug_dir)?;
        let mask_path = output_path(&debug_dir, &filename, MASK_SUFFIX, &config.output_extension);
        save_gray_image(&analysis.mask, &mask_path)?;
        log::debug!(
            "{}: {} contours before area filter, mask written to {}",
            filename,
            analysis.contour_count,
            mask_path.display()
        );
    }

    log::info!("Detected {} particles in {}.", analysis.particles.len(), filename);

    Ok(ImageReport {
        source_path: path,
        filename,
        adjusted_path,
        contours_path,
        particles_csv_path,
        contour_count: analysis.contour_count,
        particles: analysis.particles,
    })
}
