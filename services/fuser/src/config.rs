//! Fuser configuration.

use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use grid_processor::LongitudeConvention;
use ingestion::PipelineConfig;
use serde::{Deserialize, Serialize};
use solar_radiation::GridSpec;

/// Top-level fuser configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuserConfig {
    /// Fusion pipeline settings
    pub pipeline: PipelineConfig,

    /// Reference field grid
    pub reference: ReferenceConfig,
}

/// Resolution of the TOA radiation reference grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub lat_step: f64,
    pub lon_step: f64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        let spec = GridSpec::default();
        Self {
            lat_step: spec.lat_step,
            lon_step: spec.lon_step,
        }
    }
}

impl ReferenceConfig {
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            lat_step: self.lat_step,
            lon_step: self.lon_step,
        }
    }
}

impl FuserConfig {
    /// Load configuration from an optional YAML file, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Override settings from `FUSER_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("FUSER_TARGET_CONVENTION") {
            self.pipeline.target_convention = value
                .parse::<LongitudeConvention>()
                .context("Invalid FUSER_TARGET_CONVENTION")?;
        }
        if let Some(value) = lookup("FUSER_FILE_EXTENSION") {
            self.pipeline.file_extension = value;
        }
        if let Some(value) = lookup("FUSER_REANALYSIS_VARIABLES") {
            self.pipeline.reanalysis_single_variables = value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .validate()
            .context("Invalid pipeline configuration")?;
        if let Err(e) = self.reference.grid_spec().validate() {
            bail!("Invalid reference configuration: {}", e);
        }
        Ok(())
    }
}
