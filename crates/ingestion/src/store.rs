//! Dataset loading and persistence.

use std::path::Path;

use fusion_common::FusionResult;
use grid_processor::Dataset;
use tracing::debug;

use crate::selector::SourceFile;

/// Where datasets are loaded from and persisted to.
///
/// Implementations must be shareable across threads: the pipeline loads
/// independent files in parallel.
pub trait DatasetStore: Sync {
    fn load(&self, source: &SourceFile) -> FusionResult<Dataset>;

    /// Persist a dataset at `path`. A failed call must not leave a file at
    /// `path`.
    fn persist(&self, dataset: &Dataset, path: &Path) -> FusionResult<()>;
}

/// NetCDF files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfStore;

impl DatasetStore for NetCdfStore {
    fn load(&self, source: &SourceFile) -> FusionResult<Dataset> {
        debug!(path = %source.path.display(), level = %source.level, "Loading NetCDF file");
        Ok(netcdf_parser::read_dataset(&source.path)?)
    }

    fn persist(&self, dataset: &Dataset, path: &Path) -> FusionResult<()> {
        Ok(netcdf_parser::write_dataset(dataset, path)?)
    }
}
