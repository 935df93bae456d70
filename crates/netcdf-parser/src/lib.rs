//! NetCDF reading and writing for gridded datasets.
//!
//! Files produced by the reanalysis and forecast sources are NetCDF-4 with
//! CF-style coordinate variables (`latitude`, `longitude`, `pressure_level`,
//! `valid_time`). [`read_dataset`] turns such a file into a
//! [`grid_processor::Dataset`], unpacking `scale_factor`/`add_offset` and
//! replacing fill values with NaN. [`write_dataset`] writes a dataset back,
//! atomically.
//!
//! # Implementation Notes
//!
//! This uses the native netcdf library (libnetcdf + HDF5).
//! System requirements: libhdf5-dev libnetcdf-dev.

pub mod error;
pub mod native;
pub mod reader;
pub mod writer;

pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use reader::read_dataset;
pub use writer::write_dataset;
