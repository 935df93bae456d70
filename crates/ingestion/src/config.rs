//! Pipeline configuration.
//!
//! Defines which reanalysis variables join the forecast and how the
//! sources are aligned.

use fusion_common::{FusionError, FusionResult};
use grid_processor::{LongitudeConvention, MergeOptions};
use serde::{Deserialize, Serialize};

/// Settings for one fusion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reanalysis single-level variables merged into the forecast
    pub reanalysis_single_variables: Vec<String>,
    /// Reanalysis pressure-level variables merged into the forecast.
    /// The reanalysis pressure file is only loaded when this is non-empty.
    pub reanalysis_pressure_variables: Vec<String>,
    /// Singleton time dimension dropped from reanalysis datasets
    pub squeeze_dimension: Option<String>,
    /// Longitude convention of the fused output
    pub target_convention: LongitudeConvention,
    /// Extension of source and output files, without the dot
    pub file_extension: String,
    /// Maximum coordinate difference tolerated when merging
    pub coordinate_tolerance: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reanalysis_single_variables: vec!["sst".to_string()],
            reanalysis_pressure_variables: Vec::new(),
            squeeze_dimension: Some("valid_time".to_string()),
            target_convention: LongitudeConvention::Signed180,
            file_extension: "nc".to_string(),
            coordinate_tolerance: 0.0,
        }
    }
}

impl PipelineConfig {
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            coordinate_tolerance: self.coordinate_tolerance,
        }
    }

    /// The extension without any leading dot.
    pub fn extension(&self) -> &str {
        self.file_extension.trim_start_matches('.')
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.extension().is_empty() {
            return Err(FusionError::invalid_input("file_extension must not be empty"));
        }
        if !self.coordinate_tolerance.is_finite() || self.coordinate_tolerance < 0.0 {
            return Err(FusionError::invalid_input(format!(
                "coordinate_tolerance must be finite and non-negative, got {}",
                self.coordinate_tolerance
            )));
        }
        if let Some(name) = self
            .reanalysis_single_variables
            .iter()
            .chain(&self.reanalysis_pressure_variables)
            .find(|v| v.trim().is_empty())
        {
            return Err(FusionError::invalid_input(format!(
                "empty variable name in configuration: {:?}",
                name
            )));
        }
        Ok(())
    }
}
