use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for the particle counting pipeline
#[derive(Error, Debug)]
pub enum ParticleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Failed to load image {path}: {source}")]
    LoadFailure {
        source: image::ImageError,
        path: PathBuf,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        source: image::ImageError,
        path: PathBuf,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Preview window error: {0}")]
    Preview(String),
}

impl ParticleError {
    /// True for failures that only affect a single image and should not stop a batch
    pub fn is_per_image(&self) -> bool {
        !matches!(self, ParticleError::Config(_) | ParticleError::ConfigLoad { .. })
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, ParticleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_not_per_image() {
        assert!(!ParticleError::Config("bad".to_string()).is_per_image());
        assert!(ParticleError::InvalidPath(PathBuf::from("x.tif")).is_per_image());
    }

    #[test]
    fn load_failure_message_names_the_path() {
        let err = ParticleError::LoadFailure {
            source: image::ImageError::IoError(io::Error::new(io::ErrorKind::NotFound, "gone")),
            path: PathBuf::from("missing.tif"),
        };
        assert!(err.to_string().contains("missing.tif"));
    }
}
