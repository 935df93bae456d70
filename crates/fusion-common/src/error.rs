//! Error types for the fusion workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using FusionError.
pub type FusionResult<T> = Result<T, FusionError>;

/// Primary error type for selection, normalization, merge and irradiance operations.
#[derive(Debug, Error)]
pub enum FusionError {
    // === Selection Errors ===
    #[error("No file ending with '{suffix}' in {}", directory.display())]
    NoMatchingFile { directory: PathBuf, suffix: String },

    // === Grid Errors ===
    #[error("Unsupported longitude convention: '{0}' (expected '0-360' or '-180-180')")]
    UnsupportedConvention(String),

    #[error("Conflicting definitions of variable '{name}': {reason}")]
    VariableConflict { name: String, reason: String },

    #[error("Coordinate '{name}' does not match: {reason}")]
    CoordinateMismatch { name: String, reason: String },

    #[error("Shape mismatch for '{name}': expected {expected} values, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid coordinate '{name}': {reason}")]
    InvalidCoordinate { name: String, reason: String },

    #[error("Variable not found: {0}")]
    MissingVariable(String),

    // === Model Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl FusionError {
    /// Stable identifier of the error kind, used when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            FusionError::NoMatchingFile { .. } => "NoMatchingFileError",
            FusionError::UnsupportedConvention(_) => "UnsupportedConventionError",
            FusionError::VariableConflict { .. } => "VariableConflictError",
            FusionError::CoordinateMismatch { .. } => "CoordinateMismatchError",
            FusionError::ShapeMismatch { .. } => "ShapeMismatchError",
            FusionError::InvalidCoordinate { .. } => "InvalidCoordinateError",
            FusionError::MissingVariable(_) => "MissingVariableError",
            FusionError::InvalidInput(_) => "InvalidInputError",
            FusionError::Io(_) => "IoError",
            FusionError::Storage(_) => "StorageError",
        }
    }

    pub fn variable_conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::VariableConflict {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn coordinate_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CoordinateMismatch {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_coordinate(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
