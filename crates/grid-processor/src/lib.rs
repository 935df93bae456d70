//! Gridded dataset model for multi-source snapshot fusion.
//!
//! A [`Dataset`] holds named [`GriddedField`]s that share a set of
//! coordinate axes (`time`, `pressure_level`, `latitude`, `longitude`, ...).
//! Two operations turn datasets from different producers into one:
//!
//! - **Longitude normalization**: rewrite the longitude axis between the
//!   `0-360` and `-180-180` conventions, permuting the data so the axis stays
//!   strictly increasing.
//! - **Merging**: union of variable sets with exact coordinate agreement.
//!   Nothing is ever interpolated or resampled.
//!
//! ```text
//! source A (0-360) ──► squeeze(valid_time) ──► normalize(-180-180) ──┐
//!                                                                   ├──► merge ──► Dataset
//! source B (-180-180) ──────────────────────► normalize(-180-180) ──┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{merge, normalize, Dataset};
//!
//! normalize(&mut reanalysis, "-180-180")?;
//! let fused = merge(&[reanalysis.subset(&["sst"])?, forecast])?;
//! ```

pub mod longitude;
pub mod merge;
pub mod types;

// Re-export commonly used types at crate root
pub use longitude::{normalize, normalize_field, normalize_to, LongitudeConvention, LONGITUDE_NAMES};
pub use merge::{merge, merge_with, MergeOptions};
pub use types::{AttrValue, Attributes, Coordinate, Dataset, GriddedField};
