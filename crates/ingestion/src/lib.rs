//! Multi-source snapshot fusion.
//!
//! Selects the latest reanalysis and forecast files, loads them, aligns
//! their longitude conventions and merges them into one dataset.
//!
//! # Architecture
//!
//! - [`selector`]: latest-file selection by lexical order
//! - [`source`]: the fixed set of sources and their retrieval capability
//! - [`store`]: loading and persisting datasets (NetCDF on disk)
//! - [`pipeline`]: the `Selecting → … → Done` state sequence
//! - [`reference`]: the TOA radiation reference field

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reference;
pub mod selector;
pub mod source;
pub mod store;

// Re-exports
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineState, Result};
pub use pipeline::FusionPipeline;
pub use reference::write_reference_field;
pub use selector::{select_latest, select_level, select_level_pair, SourceFile};
pub use source::{LocalArchive, SourceKind, SourceRetriever};
pub use store::{DatasetStore, NetCdfStore};
