//! Data sources and retrieval dispatch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fusion_common::{parse_filename_timestamp, FusionError, FusionResult};
use tracing::info;

use crate::selector::select_level_pair;

/// The producers whose snapshots are fused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Reanalysis product (ERA5)
    Reanalysis,
    /// Operational forecast product (IFS)
    Forecast,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Reanalysis, SourceKind::Forecast];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Reanalysis => "era5",
            SourceKind::Forecast => "ifs",
        }
    }

    /// The directory this source uses under the target folder.
    pub fn directory(&self, root: &Path) -> PathBuf {
        root.join(self.name())
    }

    /// The retrieval capability for this source.
    pub fn retriever(&self, extension: &str) -> Box<dyn SourceRetriever> {
        match self {
            SourceKind::Reanalysis | SourceKind::Forecast => {
                Box::new(LocalArchive::new(*self, extension))
            }
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SourceKind {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "era5" => Ok(SourceKind::Reanalysis),
            "ifs" => Ok(SourceKind::Forecast),
            other => Err(FusionError::invalid_input(format!("unknown source: {}", other))),
        }
    }
}

/// Makes the latest snapshot of a source available in a directory.
pub trait SourceRetriever: Send + Sync {
    /// Ensure `target` holds the latest pressure+single pair and return the
    /// snapshot time it represents.
    fn retrieve_latest(&self, target: &Path) -> FusionResult<DateTime<Utc>>;
}

/// Retrieval from files already present on disk.
///
/// Performs no network access: it checks that the directory holds a
/// pressure+single pair and reports the time encoded in the newest name.
#[derive(Debug, Clone)]
pub struct LocalArchive {
    kind: SourceKind,
    extension: String,
}

impl LocalArchive {
    pub fn new(kind: SourceKind, extension: impl Into<String>) -> Self {
        Self {
            kind,
            extension: extension.into(),
        }
    }
}

impl SourceRetriever for LocalArchive {
    fn retrieve_latest(&self, target: &Path) -> FusionResult<DateTime<Utc>> {
        let (pressure, single) = select_level_pair(target, &self.extension)?;

        let newest = pressure.file_name().max(single.file_name());
        let time = parse_filename_timestamp(&newest).ok_or_else(|| {
            FusionError::invalid_input(format!(
                "cannot read a timestamp from file name '{}'",
                newest
            ))
        })?;

        info!(
            source = %self.kind,
            directory = %target.display(),
            snapshot = %time,
            "Using local archive"
        );
        Ok(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{source_tree, temp_test_dir, touch_files};

    #[test]
    fn test_names_and_directories() {
        let root = Path::new("/data");
        assert_eq!(SourceKind::Reanalysis.directory(root), Path::new("/data/era5"));
        assert_eq!(SourceKind::Forecast.directory(root), Path::new("/data/ifs"));
        assert_eq!("IFS".parse::<SourceKind>().unwrap(), SourceKind::Forecast);
        assert!("gfs".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_local_archive_reports_snapshot_time() {
        let dir = temp_test_dir();
        let (era5, ifs) = source_tree(dir.path());

        let era5_time = SourceKind::Reanalysis
            .retriever("nc")
            .retrieve_latest(&era5)
            .unwrap();
        assert_eq!(era5_time.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        let ifs_time = SourceKind::Forecast
            .retriever("nc")
            .retrieve_latest(&ifs)
            .unwrap();
        assert_eq!(ifs_time.to_rfc3339(), "2024-01-02T06:00:00+00:00");
    }

    #[test]
    fn test_local_archive_missing_pair() {
        let dir = temp_test_dir();
        touch_files(dir.path(), &["2024-01-02T00-00Z-single.nc"]);

        let err = SourceKind::Reanalysis
            .retriever("nc")
            .retrieve_latest(dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), "NoMatchingFileError");
    }

    #[test]
    fn test_local_archive_unparseable_name() {
        let dir = temp_test_dir();
        touch_files(dir.path(), &["latest-pressure.nc", "latest-single.nc"]);

        let err = LocalArchive::new(SourceKind::Forecast, "nc")
            .retrieve_latest(dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInputError");
    }
}
