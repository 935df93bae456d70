//! Longitude convention handling.
//!
//! Producers disagree on longitude: reanalysis grids usually run 0..360 while
//! forecast grids run -180..180. Normalization converts the coordinate values
//! and reorders the data so the axis stays strictly increasing.

use std::fmt;
use std::str::FromStr;

use fusion_common::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Coordinate, Dataset, GriddedField};

/// Dimension names treated as longitude axes.
pub const LONGITUDE_NAMES: [&str; 2] = ["longitude", "lon"];

/// Longitude value convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LongitudeConvention {
    /// Degrees east in [0, 360).
    #[serde(rename = "0-360")]
    ZeroTo360,
    /// Degrees in [-180, 180).
    #[serde(rename = "-180-180")]
    Signed180,
}

impl LongitudeConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            LongitudeConvention::ZeroTo360 => "0-360",
            LongitudeConvention::Signed180 => "-180-180",
        }
    }

    /// Convert a single longitude to this convention.
    pub fn convert(&self, lon: f64) -> f64 {
        match self {
            LongitudeConvention::Signed180 if lon > 180.0 => lon - 360.0,
            LongitudeConvention::ZeroTo360 if lon < 0.0 => lon + 360.0,
            _ => lon,
        }
    }
}

impl FromStr for LongitudeConvention {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-360" => Ok(LongitudeConvention::ZeroTo360),
            "-180-180" => Ok(LongitudeConvention::Signed180),
            other => Err(FusionError::UnsupportedConvention(other.to_string())),
        }
    }
}

impl fmt::Display for LongitudeConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize every longitude axis of a dataset to `target`, parsed from
/// `"0-360"` or `"-180-180"`.
pub fn normalize(dataset: &mut Dataset, target: &str) -> FusionResult<()> {
    let convention = target.parse::<LongitudeConvention>()?;
    normalize_to(dataset, convention)
}

/// Normalize every longitude axis of a dataset to `convention`.
///
/// All longitude-bearing fields are permuted together with the shared
/// coordinate. On error the dataset is left unchanged.
pub fn normalize_to(dataset: &mut Dataset, convention: LongitudeConvention) -> FusionResult<()> {
    let mut planned = Vec::new();
    for name in LONGITUDE_NAMES {
        if let Some(coord) = dataset.coord(name) {
            if let Some(plan) = plan_conversion(coord, convention)? {
                planned.push(plan);
            }
        }
    }

    for (coord, perm) in planned {
        debug!(
            coordinate = %coord.name,
            convention = %convention,
            points = coord.len(),
            "Normalized longitude axis"
        );
        dataset.permute_coord(coord, &perm);
    }
    Ok(())
}

/// Normalize the longitude axis of a single field.
///
/// Fields without a longitude dimension are returned untouched.
pub fn normalize_field(
    field: &mut GriddedField,
    convention: LongitudeConvention,
) -> FusionResult<()> {
    let Some(axis) = field
        .coords()
        .iter()
        .position(|c| LONGITUDE_NAMES.contains(&c.name.as_str()))
    else {
        return Ok(());
    };

    if let Some((coord, perm)) = plan_conversion(&field.coords()[axis], convention)? {
        field.permute_axis(axis, coord, &perm);
    }
    Ok(())
}

/// Converted coordinate plus the source index for each output position,
/// or `None` if the coordinate is already in the target convention and order.
fn plan_conversion(
    coord: &Coordinate,
    convention: LongitudeConvention,
) -> FusionResult<Option<(Coordinate, Vec<usize>)>> {
    let converted: Vec<f64> = coord.values.iter().map(|l| convention.convert(*l)).collect();

    if converted == coord.values && coord.is_strictly_increasing() {
        return Ok(None);
    }

    // sort_by is stable, so equal longitudes keep their original order
    let mut perm: Vec<usize> = (0..converted.len()).collect();
    perm.sort_by(|&a, &b| converted[a].total_cmp(&converted[b]));

    let sorted = Coordinate {
        name: coord.name.clone(),
        values: perm.iter().map(|&i| converted[i]).collect(),
        attrs: coord.attrs.clone(),
    };

    if !sorted.is_strictly_increasing() {
        return Err(FusionError::invalid_coordinate(
            &coord.name,
            format!(
                "longitudes are not unique after conversion to {}",
                convention
            ),
        ));
    }

    Ok(Some((sorted, perm)))
}
