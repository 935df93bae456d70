//! Common types and utilities shared across the snapshot fusion crates.

pub mod error;
pub mod level;
pub mod time;

pub use error::{FusionError, FusionResult};
pub use level::LevelKind;
pub use time::{output_file_stem, parse_filename_timestamp, parse_utc_timestamp};
