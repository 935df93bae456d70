//! Dataset merging.
//!
//! Merging is a strict union: shared coordinates must agree, identical
//! duplicate variables collapse into one, and anything else is an error.
//! Values are never interpolated or resampled.

use fusion_common::{FusionError, FusionResult};
use tracing::debug;

use crate::types::Dataset;

/// Options controlling how strictly coordinates are compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    /// Maximum absolute difference for two coordinate values to be considered
    /// equal. Zero means exact.
    pub coordinate_tolerance: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            coordinate_tolerance: 0.0,
        }
    }
}

/// Merge datasets left to right with exact coordinate matching.
pub fn merge(datasets: &[Dataset]) -> FusionResult<Dataset> {
    merge_with(datasets, &MergeOptions::default())
}

/// Merge datasets left to right.
///
/// The first dataset to define a coordinate fixes its values; later fields
/// matched within the tolerance are relabeled with those values. Scalar
/// coordinates are unioned under the same rule, and a name used as a scalar
/// in one input and as a dimension in another is a `CoordinateMismatch`.
/// Global attributes are merged first-wins. Inputs are not modified.
pub fn merge_with(datasets: &[Dataset], options: &MergeOptions) -> FusionResult<Dataset> {
    let tolerance = options.coordinate_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(FusionError::invalid_input(format!(
            "coordinate tolerance must be finite and non-negative, got {}",
            tolerance
        )));
    }

    let mut merged = Dataset::new();

    for (index, dataset) in datasets.iter().enumerate() {
        for coord in dataset.coords() {
            if merged.scalar_coord(&coord.name).is_some() {
                return Err(FusionError::coordinate_mismatch(
                    &coord.name,
                    format!("dimension in dataset {} but scalar in an earlier input", index),
                ));
            }
            match merged.coord(&coord.name) {
                Some(existing) if !existing.matches(coord, tolerance) => {
                    return Err(FusionError::coordinate_mismatch(
                        &coord.name,
                        format!(
                            "dataset {} disagrees with earlier input: {}",
                            index,
                            existing.describe_mismatch(coord, tolerance)
                        ),
                    ));
                }
                Some(_) => {}
                None => merged.insert_coord_unchecked(coord.clone()),
            }
        }

        for coord in dataset.scalar_coords() {
            if merged.coord(&coord.name).is_some() {
                return Err(FusionError::coordinate_mismatch(
                    &coord.name,
                    format!("scalar in dataset {} but a dimension in an earlier input", index),
                ));
            }
            match merged.scalar_coord(&coord.name) {
                Some(existing) if !existing.matches(coord, tolerance) => {
                    return Err(FusionError::coordinate_mismatch(
                        &coord.name,
                        format!(
                            "dataset {} disagrees with earlier input: {}",
                            index,
                            existing.describe_mismatch(coord, tolerance)
                        ),
                    ));
                }
                Some(_) => {}
                None => merged.insert_scalar_unchecked(coord.clone()),
            }
        }

        for field in dataset.variables() {
            if let Some(existing) = merged.variable(field.name()) {
                match existing.definition_difference(field, tolerance) {
                    None => {
                        debug!(
                            variable = %field.name(),
                            dataset = index,
                            "Dropping identical duplicate variable"
                        );
                        continue;
                    }
                    Some(reason) => {
                        return Err(FusionError::variable_conflict(field.name(), reason));
                    }
                }
            }
            merged.insert_aligned(field.clone());
        }

        for (key, value) in dataset.attrs() {
            merged
                .attrs_mut()
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    debug!(
        inputs = datasets.len(),
        variables = merged.len(),
        "Merged datasets"
    );
    Ok(merged)
}
