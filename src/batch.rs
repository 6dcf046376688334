// src/batch.rs - Folder level driver around the per-image pipeline

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::errors::{ParticleError, Result};
use crate::image_io::{get_image_files_in_dir, load_image};
use crate::output::{write_summary_csv, FileStatus};
use crate::pipeline::{process_image, ImageReport};

/// Result of running the pipeline over a set of files
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Reports of successfully processed files, in enumeration order
    pub reports: Vec<ImageReport>,
    /// Files that could not be loaded, processed or written
    pub failures: Vec<(PathBuf, String)>,
    pub summary_csv_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total_particles(&self) -> usize {
        self.reports.iter().map(|r| r.particle_count()).sum()
    }
}

/// Load and process one file, logging instead of propagating per-image failures
fn run_file(path: &Path, config: &Config, output_dir: &Path, debug: bool) -> Result<ImageReport> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::info!("Processing {}...", name);

    let input_image = match load_image(path) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Failed to load: {} ({})", name, e);
            return Err(e);
        }
    };

    process_image(input_image, config, output_dir, debug).map_err(|e| {
        log::error!("Failed to process {}: {}", name, e);
        e
    })
}

/// Process every matching file directly inside `input_dir`.
///
/// The output directory is created (with parents) before anything else. A file
/// that fails to load, process or write is logged and recorded in the summary;
/// it never stops the remaining files. Configuration errors are returned
/// before any file is touched.
pub fn run_batch(input_dir: &Path, output_dir: &Path, config: &Config, debug: bool) -> Result<BatchSummary> {
    config.validate()?;

    fs::create_dir_all(output_dir)?;

    let files = get_image_files_in_dir(input_dir, &config.input_extension)?;
    log::info!(
        "Found {} .{} files in {}",
        files.len(),
        config.input_extension.trim_start_matches('.'),
        input_dir.display()
    );

    let results: Vec<Result<ImageReport>> = if config.use_parallel {
        files
            .par_iter()
            .map(|path| run_file(path, config, output_dir, debug))
            .collect()
    } else {
        files
            .iter()
            .map(|path| run_file(path, config, output_dir, debug))
            .collect()
    };

    let mut summary = BatchSummary::default();
    let mut rows = Vec::with_capacity(files.len());

    for (path, result) in files.into_iter().zip(results) {
        match result {
            Ok(report) => {
                rows.push((path, FileStatus::from(&report)));
                summary.reports.push(report);
            }
            Err(e) if e.is_per_image() => {
                rows.push((path.clone(), FileStatus::Failed { reason: e.to_string() }));
                summary.failures.push((path, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    if config.write_particle_csv {
        match write_summary_csv(&rows, output_dir) {
            Ok(path) => summary.summary_csv_path = Some(path),
            Err(e) => log::error!("Failed to write batch summary: {}", e),
        }
    }

    log::info!(
        "All images processed: {} succeeded, {} failed, {} particles in total.",
        summary.processed(),
        summary.failed(),
        summary.total_particles()
    );

    Ok(summary)
}

/// Process a single file into `output_dir`, creating it if needed
pub fn run_single(path: &Path, output_dir: &Path, config: &Config, debug: bool) -> Result<ImageReport> {
    config.validate()?;
    if !path.is_file() {
        return Err(ParticleError::InvalidPath(path.to_path_buf()));
    }
    fs::create_dir_all(output_dir)?;
    run_file(path, config, output_dir, debug)
}
