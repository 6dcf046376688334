// src/lib.rs - Library interface for the particle counting pipeline

pub mod annotation;
pub mod batch;
pub mod config;
pub mod contours;
pub mod denoise;
pub mod errors;
pub mod image_io;
pub mod image_utils;
pub mod morphology;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod preview;
pub mod segmentation;
pub mod shape_analysis;

// Re-export commonly used types and functions
pub use errors::{ParticleError, Result};
pub use config::{Config, ThresholdMethod};
pub use batch::{run_batch, run_single, BatchSummary};
pub use pipeline::{analyze_image, process_image, Analysis, ImageReport};
pub use image_io::{InputImage, load_image, get_image_files_in_dir};
pub use image_utils::{BitDepth, Gray16Image, SourceImage};

// Re-export pipeline stages
pub use preprocess::{apply_clahe, apply_linear_contrast, normalize_to_u8, preprocess_image};
pub use denoise::median_denoise;
pub use segmentation::{adaptive_mean_threshold, otsu_threshold, segment};
pub use morphology::{apply_closing, apply_opening, clean_mask};
pub use contours::{find_outer_contours, Contour};
pub use shape_analysis::{
    calculate_area,
    calculate_perimeter,
    filter_by_area,
    BoundingBox,
    ParticleRecord,
};
pub use annotation::annotate_particles;
