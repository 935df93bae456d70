//! The TOA radiation reference field job.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fusion_common::{output_file_stem, FusionResult};
use grid_processor::Dataset;
use solar_radiation::{grid_integrated_irradiance, GridSpec, TOA_RADIATION};
use tracing::{info, instrument};

use crate::store::DatasetStore;

/// Compute the integrated TOA radiation grid for the window ending at
/// `end_time` and persist it as `toa_radiation_<timestamp>.<extension>`
/// in `output_dir`.
#[instrument(skip(store, output_dir, spec), fields(output_dir = %output_dir.display()))]
pub fn write_reference_field<S>(
    store: &S,
    output_dir: &Path,
    end_time: DateTime<Utc>,
    duration_hours: f64,
    spec: &GridSpec,
    extension: &str,
) -> FusionResult<PathBuf>
where
    S: DatasetStore + ?Sized,
{
    let field = grid_integrated_irradiance(&end_time, duration_hours, spec)?;
    let mut dataset = Dataset::from_fields([field])?;
    dataset.set_attr("title", "Top-of-atmosphere solar radiation");
    dataset.set_attr("valid_time", end_time.to_rfc3339());
    dataset.set_attr("integration_hours", duration_hours);

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!(
        "{}_{}.{}",
        TOA_RADIATION,
        output_file_stem(end_time),
        extension.trim_start_matches('.')
    ));
    store.persist(&dataset, &path)?;

    info!(path = %path.display(), "Wrote reference field");
    Ok(path)
}
