//! Vertical level classification of source files.

use serde::{Deserialize, Serialize};

/// Which family of vertical levels a source file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    /// Isobaric levels (`pressure_level` axis)
    Pressure,
    /// Single/surface level fields
    Single,
}

impl LevelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelKind::Pressure => "pressure",
            LevelKind::Single => "single",
        }
    }

    /// Filename suffix for this level kind, e.g. `pressure.nc`.
    pub fn suffix(&self, extension: &str) -> String {
        format!("{}.{}", self.as_str(), extension.trim_start_matches('.'))
    }
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
