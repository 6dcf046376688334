use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{ParticleError, Result};

/// Configuration for the particle counting pipeline
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Extension (without dot) of the files picked up from the input directory
    #[serde(default = "default_extension")]
    pub input_extension: String,

    #[serde(default = "default_extension")]
    pub output_extension: String,

    // Contrast enhancement
    #[serde(default = "default_use_clahe")]
    pub use_clahe: bool,

    #[serde(default = "default_clahe_clip_limit")]
    pub clahe_clip_limit: f64,

    #[serde(default = "default_clahe_tile_grid")]
    pub clahe_tile_grid: [u32; 2],

    #[serde(default = "default_contrast_gain")]
    pub contrast_gain: f64,

    #[serde(default = "default_contrast_bias")]
    pub contrast_bias: f64,

    // Denoising
    #[serde(default = "default_denoise_kernel_size")]
    pub denoise_kernel_size: u32,

    #[serde(default = "default_threshold_blur_kernel_size")]
    pub threshold_blur_kernel_size: u32,

    // Segmentation
    #[serde(default)]
    pub threshold_method: ThresholdMethod,

    #[serde(default = "default_threshold_block_size")]
    pub threshold_block_size: u32,

    #[serde(default = "default_threshold_constant")]
    pub threshold_constant: i32,

    #[serde(default = "default_morph_kernel_size")]
    pub morph_kernel_size: u32,

    // Particle filter
    #[serde(default = "default_min_area")]
    pub min_area: f64,

    #[serde(default = "default_max_area")]
    pub max_area: f64,

    #[serde(default = "default_contour_color_rgb")]
    pub contour_color_rgb: [u8; 3],

    #[serde(default = "default_write_particle_csv")]
    pub write_particle_csv: bool,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,
}

/// Thresholding strategy used by the segmenter
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Global level chosen by Otsu's method
    #[default]
    Otsu,
    /// Local mean over `threshold_block_size` minus `threshold_constant`
    AdaptiveMean,
}

fn default_input_path() -> String {
    "./input".to_string()
}

fn default_output_dir() -> String {
    "./input/processed".to_string()
}

fn default_extension() -> String {
    "tif".to_string()
}

fn default_use_clahe() -> bool {
    true
}

fn default_clahe_clip_limit() -> f64 {
    2.0
}

fn default_clahe_tile_grid() -> [u32; 2] {
    [8, 8]
}

fn default_contrast_gain() -> f64 {
    0.1
}

fn default_contrast_bias() -> f64 {
    -100.0
}

fn default_denoise_kernel_size() -> u32 {
    3 // Use 5 if noise is worse
}

fn default_threshold_blur_kernel_size() -> u32 {
    7
}

fn default_threshold_block_size() -> u32 {
    15
}

fn default_threshold_constant() -> i32 {
    2
}

fn default_morph_kernel_size() -> u32 {
    3
}

fn default_min_area() -> f64 {
    20.0
}

fn default_max_area() -> f64 {
    5000.0
}

fn default_contour_color_rgb() -> [u8; 3] {
    [255, 255, 0] // Yellow
}

fn default_write_particle_csv() -> bool {
    true
}

fn default_parallel() -> bool {
    false
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_dir: default_output_dir(),
            input_extension: default_extension(),
            output_extension: default_extension(),
            use_clahe: default_use_clahe(),
            clahe_clip_limit: default_clahe_clip_limit(),
            clahe_tile_grid: default_clahe_tile_grid(),
            contrast_gain: default_contrast_gain(),
            contrast_bias: default_contrast_bias(),
            denoise_kernel_size: default_denoise_kernel_size(),
            threshold_blur_kernel_size: default_threshold_blur_kernel_size(),
            threshold_method: ThresholdMethod::default(),
            threshold_block_size: default_threshold_block_size(),
            threshold_constant: default_threshold_constant(),
            morph_kernel_size: default_morph_kernel_size(),
            min_area: default_min_area(),
            max_area: default_max_area(),
            contour_color_rgb: default_contour_color_rgb(),
            write_particle_csv: default_write_particle_csv(),
            use_parallel: default_parallel(),
        }
    }
}

/// Odd-and-at-least-3 check shared by every square neighbourhood parameter
pub fn validate_kernel_size(name: &str, size: u32) -> Result<()> {
    if size < 3 || size % 2 == 0 {
        return Err(ParticleError::Config(format!(
            "{} must be an odd integer >= 3 (got {})",
            name, size
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ParticleError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| ParticleError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })
    }

    /// Load configuration if the file exists, otherwise fall back to defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration. Must pass before any image is processed.
    pub fn validate(&self) -> Result<()> {
        validate_kernel_size("denoise_kernel_size", self.denoise_kernel_size)?;
        validate_kernel_size("threshold_blur_kernel_size", self.threshold_blur_kernel_size)?;
        validate_kernel_size("threshold_block_size", self.threshold_block_size)?;
        validate_kernel_size("morph_kernel_size", self.morph_kernel_size)?;

        if self.input_extension.trim_start_matches('.').is_empty() {
            return Err(ParticleError::Config(
                "input_extension must not be empty".to_string(),
            ));
        }

        if self.output_extension.trim_start_matches('.').is_empty() {
            return Err(ParticleError::Config(
                "output_extension must not be empty".to_string(),
            ));
        }

        if !(self.clahe_clip_limit > 0.0) {
            return Err(ParticleError::Config(
                "clahe_clip_limit must be > 0.0".to_string(),
            ));
        }

        if self.clahe_tile_grid[0] == 0 || self.clahe_tile_grid[1] == 0 {
            return Err(ParticleError::Config(
                "clahe_tile_grid entries must be > 0".to_string(),
            ));
        }

        if !self.contrast_gain.is_finite() || !self.contrast_bias.is_finite() {
            return Err(ParticleError::Config(
                "contrast_gain and contrast_bias must be finite".to_string(),
            ));
        }

        if self.min_area < 0.0 || !self.min_area.is_finite() {
            return Err(ParticleError::Config(
                "min_area must be a finite value >= 0.0".to_string(),
            ));
        }

        if self.max_area.is_nan() {
            return Err(ParticleError::Config(
                "max_area must be a number".to_string(),
            ));
        }

        if self.max_area < self.min_area {
            return Err(ParticleError::Config(format!(
                "max_area ({}) must be >= min_area ({})",
                self.max_area, self.min_area
            )));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            ParticleError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}
