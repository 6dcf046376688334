use std::path::{Path, PathBuf};
use std::fs;
use image::{GrayImage, RgbImage};

use crate::errors::{ParticleError, Result};
use crate::image_utils::SourceImage;

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: SourceImage,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all files with the given extension directly inside a directory (not recursive).
/// Sorted by path so repeated runs log in the same order.
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(ParticleError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(ParticleError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let wanted = extension.trim_start_matches('.').to_ascii_lowercase();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase() == wanted)
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load an image preserving its native bit depth
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    // Get filename without extension
    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ParticleError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let img = image::open(path).map_err(|e| ParticleError::LoadFailure {
        source: e,
        path: path.to_path_buf(),
    })?;

    Ok(InputImage {
        image: SourceImage::from_dynamic(img),
        path: path.to_path_buf(),
        filename,
    })
}

/// `<output_dir>/<stem>_<suffix>.<extension>`
pub fn output_path(output_dir: &Path, stem: &str, suffix: &str, extension: &str) -> PathBuf {
    output_dir.join(format!(
        "{}_{}.{}",
        stem,
        suffix,
        extension.trim_start_matches('.')
    ))
}

/// Save an 8-bit grayscale image; the format follows the path's extension
pub fn save_gray_image<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|e| ParticleError::WriteFailure {
        source: e,
        path: path.to_path_buf(),
    })
}

/// Save an RGB image; the format follows the path's extension
pub fn save_rgb_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|e| ParticleError::WriteFailure {
        source: e,
        path: path.to_path_buf(),
    })
}
