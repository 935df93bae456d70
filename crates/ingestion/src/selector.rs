//! Latest-file selection.
//!
//! Producers name files so that lexical order equals chronological order
//! (`2024-01-02T00-00Z-pressure.nc`), so "latest" is simply the
//! lexically greatest matching name.

use std::path::{Path, PathBuf};

use fusion_common::{FusionError, FusionResult, LevelKind};
use tracing::debug;
use walkdir::WalkDir;

/// A selected source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub directory: PathBuf,
    pub level: LevelKind,
}

impl SourceFile {
    /// The file name, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Return the entry of `directory` whose name ends with `suffix` and is
/// lexically greatest.
///
/// Files and symlinks count; directories, including links to directories,
/// do not. A dangling link can still be selected so that loading reports it
/// instead of an older file being picked. Subdirectories are not searched.
/// Fails with `NoMatchingFile` when nothing matches and with an I/O error
/// when the directory cannot be listed.
pub fn select_latest(directory: &Path, suffix: &str) -> FusionResult<PathBuf> {
    let mut latest: Option<(String, PathBuf)> = None;

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.ends_with(suffix) {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| name > best.as_str()) {
            latest = Some((name.to_string(), entry.into_path()));
        }
    }

    match latest {
        Some((name, path)) => {
            debug!(directory = %directory.display(), suffix, file = %name, "Selected latest file");
            Ok(path)
        }
        None => Err(FusionError::NoMatchingFile {
            directory: directory.to_path_buf(),
            suffix: suffix.to_string(),
        }),
    }
}

/// Select the latest file of one level kind, e.g. `*pressure.nc`.
pub fn select_level(directory: &Path, level: LevelKind, extension: &str) -> FusionResult<SourceFile> {
    let path = select_latest(directory, &level.suffix(extension))?;
    Ok(SourceFile {
        path,
        directory: directory.to_path_buf(),
        level,
    })
}

/// Select the latest pressure-level and single-level files of a directory.
pub fn select_level_pair(
    directory: &Path,
    extension: &str,
) -> FusionResult<(SourceFile, SourceFile)> {
    let pressure = select_level(directory, LevelKind::Pressure, extension)?;
    let single = select_level(directory, LevelKind::Single, extension)?;
    Ok((pressure, single))
}

fn walk_error(err: walkdir::Error) -> FusionError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(io) => FusionError::Io(io),
        None => FusionError::Storage(message),
    }
}
