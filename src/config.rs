// src/config.rs - Sampling, optimization and batch settings loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::alignment::CENTROID_WEIGHT;
use crate::errors::{Result, SectionAlignError};
use crate::optimizer::OptimizerParams;
use crate::sampler::SamplingParams;

pub use crate::sampler::MAX_LEVELS;

/// Configuration for SectionAlign
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Section outline CSV, or a directory of them
    pub input_path: String,

    /// Reference (atlas slice) outline CSV
    pub reference_path: String,

    pub output_base_dir: String,

    // Correspondence sampling
    #[serde(default = "default_levels")]
    pub levels: u32,

    #[serde(default = "default_phi_tol")]
    pub phi_tol: f64,

    // Greedy optimization
    #[serde(default = "default_optimize")]
    pub optimize: bool,

    #[serde(default = "default_drift_threshold")]
    pub drift_threshold: f64,

    // Pair building
    #[serde(default = "default_centroid_weight")]
    pub centroid_weight: f64,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,
}

fn default_levels() -> u32 {
    4 // 64 correspondence points
}

fn default_phi_tol() -> f64 {
    0.1
}

fn default_optimize() -> bool {
    true
}

fn default_drift_threshold() -> f64 {
    1.0
}

fn default_centroid_weight() -> f64 {
    CENTROID_WEIGHT
}

fn default_parallel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            reference_path: "./reference.csv".to_string(),
            output_base_dir: "./output".to_string(),
            levels: default_levels(),
            phi_tol: default_phi_tol(),
            optimize: default_optimize(),
            drift_threshold: default_drift_threshold(),
            centroid_weight: default_centroid_weight(),
            use_parallel: default_parallel(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SectionAlignError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|source| SectionAlignError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            SectionAlignError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Validate numeric parameters
    pub fn validate(&self) -> Result<()> {
        self.sampling_params().validate()?;

        if !self.drift_threshold.is_finite() {
            return Err(SectionAlignError::Config(
                "drift_threshold must be finite".to_string(),
            ));
        }

        if !(self.centroid_weight > 0.0 && self.centroid_weight.is_finite()) {
            return Err(SectionAlignError::Config(
                "centroid_weight must be > 0.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Check that the configured input and reference paths exist
    pub fn validate_paths(&self) -> Result<()> {
        for path in [&self.input_path, &self.reference_path] {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(SectionAlignError::InvalidPath(path));
            }
        }

        let reference = PathBuf::from(&self.reference_path);
        if !reference.is_file() {
            return Err(SectionAlignError::Config(format!(
                "reference_path '{}' must be a file",
                reference.display()
            )));
        }

        Ok(())
    }

    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            levels: self.levels,
            phi_tol: self.phi_tol,
        }
    }

    pub fn optimizer_params(&self) -> OptimizerParams {
        OptimizerParams {
            drift_threshold: self.drift_threshold,
        }
    }
}
