//! The two-source fusion pipeline.
//!
//! ```text
//! Selecting → Loading → Normalizing → Merging → Persisting → Done
//! ```
//!
//! Any failure aborts the run in the state it occurred in; nothing is
//! written unless every earlier state succeeded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fusion_common::{output_file_stem, FusionResult};
use grid_processor::{merge_with, normalize_to, Dataset};
use tracing::{debug, info, instrument};

use crate::config::PipelineConfig;
use crate::error::{at, PipelineState, Result};
use crate::selector::{select_level_pair, SourceFile};
use crate::store::DatasetStore;

/// Fuses the latest reanalysis snapshot into the latest forecast snapshot.
#[derive(Debug, Clone)]
pub struct FusionPipeline {
    reanalysis_dir: PathBuf,
    forecast_dir: PathBuf,
    output_dir: PathBuf,
    config: PipelineConfig,
}

/// Files chosen in the Selecting state.
#[derive(Debug, Clone)]
struct Selection {
    reanalysis_pressure: SourceFile,
    reanalysis_single: SourceFile,
    forecast_pressure: SourceFile,
    forecast_single: SourceFile,
}

/// Datasets produced by the Loading state.
struct Loaded {
    reanalysis_single: Dataset,
    reanalysis_pressure: Option<Dataset>,
    forecast_single: Dataset,
    forecast_pressure: Dataset,
}

impl FusionPipeline {
    pub fn new(
        reanalysis_dir: impl Into<PathBuf>,
        forecast_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            reanalysis_dir: reanalysis_dir.into(),
            forecast_dir: forecast_dir.into(),
            output_dir: output_dir.into(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the artifact a run at `now` writes.
    pub fn output_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", output_file_stem(now), self.config.extension()))
    }

    /// Run one fusion and return the path of the written dataset.
    #[instrument(skip(self, store), fields(
        reanalysis = %self.reanalysis_dir.display(),
        forecast = %self.forecast_dir.display(),
    ))]
    pub fn run<S>(&self, store: &S, now: DateTime<Utc>) -> Result<PathBuf>
    where
        S: DatasetStore + ?Sized,
    {
        self.enter(PipelineState::Selecting);
        let selection = self.select().map_err(at(PipelineState::Selecting))?;

        self.enter(PipelineState::Loading);
        let loaded = self.load(store, &selection).map_err(at(PipelineState::Loading))?;

        self.enter(PipelineState::Normalizing);
        let loaded = self.normalize(loaded).map_err(at(PipelineState::Normalizing))?;

        self.enter(PipelineState::Merging);
        let fused = self.merge(loaded).map_err(at(PipelineState::Merging))?;

        self.enter(PipelineState::Persisting);
        let path = self.output_path(now);
        self.persist(store, &fused, &path)
            .map_err(at(PipelineState::Persisting))?;

        info!(
            state = %PipelineState::Done,
            path = %path.display(),
            variables = ?fused.variable_names(),
            "Fusion complete"
        );
        Ok(path)
    }

    fn enter(&self, state: PipelineState) {
        info!(state = %state, "Entering pipeline state");
    }

    fn select(&self) -> FusionResult<Selection> {
        let ext = self.config.extension();
        let (reanalysis_pressure, reanalysis_single) = select_level_pair(&self.reanalysis_dir, ext)?;
        let (forecast_pressure, forecast_single) = select_level_pair(&self.forecast_dir, ext)?;

        for file in [
            &reanalysis_pressure,
            &reanalysis_single,
            &forecast_pressure,
            &forecast_single,
        ] {
            info!(path = %file.path.display(), level = %file.level, "Selected source file");
        }

        Ok(Selection {
            reanalysis_pressure,
            reanalysis_single,
            forecast_pressure,
            forecast_single,
        })
    }

    fn load<S>(&self, store: &S, selection: &Selection) -> FusionResult<Loaded>
    where
        S: DatasetStore + ?Sized,
    {
        let with_reanalysis_pressure = !self.config.reanalysis_pressure_variables.is_empty();

        let ((forecast_pressure, forecast_single), (reanalysis_single, reanalysis_pressure)) =
            rayon::join(
                || {
                    rayon::join(
                        || store.load(&selection.forecast_pressure),
                        || store.load(&selection.forecast_single),
                    )
                },
                || {
                    rayon::join(
                        || store.load(&selection.reanalysis_single),
                        || {
                            with_reanalysis_pressure
                                .then(|| store.load(&selection.reanalysis_pressure))
                                .transpose()
                        },
                    )
                },
            );

        let loaded = Loaded {
            forecast_pressure: forecast_pressure?,
            forecast_single: forecast_single?,
            reanalysis_single: reanalysis_single?,
            reanalysis_pressure: reanalysis_pressure?,
        };
        info!(
            reanalysis_pressure = with_reanalysis_pressure,
            "Loaded all required source files"
        );
        Ok(loaded)
    }

    fn normalize(&self, mut loaded: Loaded) -> FusionResult<Loaded> {
        let convention = self.config.target_convention;

        if let Some(dim) = &self.config.squeeze_dimension {
            loaded.reanalysis_single.squeeze(dim)?;
            if let Some(ds) = loaded.reanalysis_pressure.as_mut() {
                ds.squeeze(dim)?;
            }
        }

        info!(convention = %convention, "Shifting longitudes to a common range");
        normalize_to(&mut loaded.reanalysis_single, convention)?;
        if let Some(ds) = loaded.reanalysis_pressure.as_mut() {
            normalize_to(ds, convention)?;
        }
        normalize_to(&mut loaded.forecast_single, convention)?;
        normalize_to(&mut loaded.forecast_pressure, convention)?;
        Ok(loaded)
    }

    fn merge(&self, loaded: Loaded) -> FusionResult<Dataset> {
        let options = self.config.merge_options();

        info!(
            variables = ?self.config.reanalysis_single_variables,
            "Merging reanalysis variables into forecast single level"
        );
        let selected = loaded
            .reanalysis_single
            .subset(&self.config.reanalysis_single_variables)?;
        let single = merge_with(&[selected, loaded.forecast_single], &options)?;

        info!("Merging forecast pressure levels with single level data");
        let mut parts = vec![single, loaded.forecast_pressure];
        if let Some(ds) = loaded.reanalysis_pressure {
            parts.push(ds.subset(&self.config.reanalysis_pressure_variables)?);
        }
        let fused = merge_with(&parts, &options)?;

        debug!(variables = fused.len(), "Merged dataset");
        Ok(fused)
    }

    fn persist<S>(&self, store: &S, dataset: &Dataset, path: &Path) -> FusionResult<()>
    where
        S: DatasetStore + ?Sized,
    {
        std::fs::create_dir_all(&self.output_dir)?;
        info!(path = %path.display(), "Saving fused dataset");
        store.persist(dataset, path)
    }
}
