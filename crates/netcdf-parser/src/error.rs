//! Error types for NetCDF reading and writing.

use fusion_common::FusionError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by libnetcdf
    #[error("NetCDF error: {0}")]
    Library(#[from] netcdf::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// File content that violates the dataset model
    #[error(transparent)]
    Model(#[from] FusionError),
}

impl From<NetCdfError> for FusionError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => FusionError::Io(e),
            NetCdfError::Model(e) => e,
            other => FusionError::Storage(other.to_string()),
        }
    }
}
