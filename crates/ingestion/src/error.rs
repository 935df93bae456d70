//! Error types for the fusion pipeline.

use std::fmt;

use fusion_common::FusionError;
use thiserror::Error;

/// Stages of one fusion run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Selecting,
    Loading,
    Normalizing,
    Merging,
    Persisting,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Selecting => "Selecting",
            PipelineState::Loading => "Loading",
            PipelineState::Normalizing => "Normalizing",
            PipelineState::Merging => "Merging",
            PipelineState::Persisting => "Persisting",
            PipelineState::Done => "Done",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure together with the stage it aborted.
#[derive(Error, Debug)]
#[error("Fusion failed in state {state}: {error}")]
pub struct PipelineError {
    pub state: PipelineState,
    #[source]
    pub error: FusionError,
}

impl PipelineError {
    pub fn new(state: PipelineState, error: FusionError) -> Self {
        Self { state, error }
    }

    /// Stable identifier of the underlying error.
    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Attach a stage to a fallible step: `.map_err(at(PipelineState::Merging))`.
pub(crate) fn at(state: PipelineState) -> impl Fn(FusionError) -> PipelineError {
    move |error| PipelineError::new(state, error)
}
