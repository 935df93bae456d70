//! Common test fixtures for the fusion pipeline.
//!
//! Source directories are populated with empty files whose names follow the
//! producers' conventions; only the names matter for selection.

use std::fs;
use std::path::{Path, PathBuf};

/// Reanalysis file names, oldest first.
pub const ERA5_FILES: [&str; 4] = [
    "2024-01-01T00-00Z-pressure.nc",
    "2024-01-01T00-00Z-single.nc",
    "2024-01-02T00-00Z-pressure.nc",
    "2024-01-02T00-00Z-single.nc",
];

/// Forecast file names, oldest first.
pub const IFS_FILES: [&str; 4] = [
    "2024-01-02T00:00:00Z-pressure.nc",
    "2024-01-02T00:00:00Z-single.nc",
    "2024-01-02T06:00:00Z-pressure.nc",
    "2024-01-02T06:00:00Z-single.nc",
];

/// Files that live next to source data but must never be selected.
pub const DISTRACTOR_FILES: [&str; 3] = [
    "2024-01-03T00-00Z-pressure.zip",
    "2024-01-03T00-00Z-single.grib2",
    "README",
];

/// Creates empty files with the given names inside `dir`.
///
/// Returns the created paths in the same order.
pub fn touch_files<S: AsRef<str>>(dir: &Path, names: &[S]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).expect("Failed to create fixture directory");
    names
        .iter()
        .map(|name| {
            let path = dir.join(name.as_ref());
            fs::write(&path, b"").expect("Failed to create fixture file");
            path
        })
        .collect()
}

/// Creates a `<root>/era5` and `<root>/ifs` tree populated with
/// [`ERA5_FILES`] and [`IFS_FILES`].
pub fn source_tree(root: &Path) -> (PathBuf, PathBuf) {
    let era5 = root.join("era5");
    let ifs = root.join("ifs");
    touch_files(&era5, &ERA5_FILES);
    touch_files(&ifs, &IFS_FILES);
    (era5, ifs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temp_test_dir;

    #[test]
    fn test_touch_files() {
        let dir = temp_test_dir();
        let paths = touch_files(dir.path(), &DISTRACTOR_FILES);
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_source_tree() {
        let dir = temp_test_dir();
        let (era5, ifs) = source_tree(dir.path());
        assert_eq!(fs::read_dir(era5).unwrap().count(), 4);
        assert_eq!(fs::read_dir(ifs).unwrap().count(), 4);
    }
}
