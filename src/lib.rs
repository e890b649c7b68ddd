// src/lib.rs - Library interface for SectionAlign

pub mod alignment;
pub mod config;
pub mod contour;
pub mod correspondence;
pub mod errors;
pub mod optimizer;
pub mod orientation;
pub mod output;
pub mod pipeline;
pub mod point_io;
pub mod polar;
pub mod sampler;

// Re-export commonly used types and functions
pub use errors::{SectionAlignError, Result};
pub use config::Config;
pub use contour::{Contour, ContourPoint};
pub use correspondence::CorrespondencePointSet;
pub use point_io::{InputContour, get_csv_files_in_dir, load_contour_csv, read_points};

// Engine
pub use orientation::{estimate_orientation, Orientation};
pub use polar::{AngularStep, PolarFrame, PolarPoint};
pub use sampler::{sample_contour, CorrespondenceSampler, SamplingParams};
pub use optimizer::{optimize, DriftDirection, OptimizationReport, OptimizedSet, OptimizerParams};
pub use alignment::{build_alignment_pairs, AlignmentPair, CENTROID_WEIGHT};

// Pipeline
pub use pipeline::{
    align_contours,
    process_batch,
    process_section,
    process_section_file,
    AlignmentResult,
    BatchSummary,
};
