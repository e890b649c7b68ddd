use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for SectionAlign
#[derive(Error, Debug)]
pub enum SectionAlignError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    /// Fewer than 3 points, or a singular covariance matrix
    #[error("Degenerate contour: {0}")]
    DegenerateContour(String),

    /// An angular search window held no contour points
    #[error("Insufficient contour density: no points in {window}")]
    InsufficientContourDensity { window: String },

    #[error("Mismatched correspondence count: source has {source_count}, reference has {reference_count}")]
    MismatchedCorrespondenceCount {
        source_count: usize,
        reference_count: usize,
    },

    #[error("Landmark with index {index} is not a point of the contour")]
    ForeignLandmark { index: usize },

    #[error("Invalid point on line {line}: {reason}")]
    InvalidPoint { line: usize, reason: String },

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Section id '{id}' of {path} is already used by another input file")]
    DuplicateSectionId { id: String, path: PathBuf },
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, SectionAlignError>;
