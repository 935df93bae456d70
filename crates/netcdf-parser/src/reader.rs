//! Read NetCDF files into [`Dataset`]s.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use grid_processor::{AttrValue, Attributes, Coordinate, Dataset, GriddedField};
use netcdf::types::NcVariableType;
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{silence_hdf5_errors, to_attr_value};

/// Attributes consumed while unpacking values.
const PACKING_ATTRS: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Read every gridded variable of a NetCDF file.
///
/// Dimension variables become coordinates; dimensions without one get an
/// index coordinate `0..n`. A 0-d variable becomes a scalar coordinate when
/// a `coordinates` attribute names it or it is a time axis; other 0-d
/// variables and all non-numeric variables are skipped. Values are unpacked
/// to `f64` with fill values replaced by NaN. Any other read failure is an
/// error.
pub fn read_dataset(path: &Path) -> NetCdfResult<Dataset> {
    silence_hdf5_errors();

    let file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut coords: HashMap<String, Coordinate> = HashMap::new();
    for dim in file.dimensions() {
        let name = dim.name();
        let coord = match file.variable(&name) {
            Some(var) if is_coordinate_variable(&var) && is_numeric(&var) => {
                let (values, attrs) = read_values(&var)?;
                Coordinate {
                    name: name.clone(),
                    values,
                    attrs,
                }
            }
            _ => Coordinate::new(name.clone(), (0..dim.len()).map(|i| i as f64).collect()),
        };
        coords.insert(name, coord);
    }

    let referenced = referenced_coordinates(&file);

    let mut dataset = Dataset::new();
    let mut scalars = Vec::new();
    for var in file.variables() {
        let name = var.name();
        if coords.contains_key(&name) && is_coordinate_variable(&var) && is_numeric(&var) {
            continue;
        }
        if !is_numeric(&var) {
            debug!(variable = %name, "Skipping non-numeric variable");
            continue;
        }
        if var.dimensions().is_empty() {
            if referenced.contains(&name) || is_time_axis(&var) {
                let (values, attrs) = read_values(&var)?;
                scalars.push(Coordinate { name, values, attrs });
            } else {
                debug!(variable = %name, "Skipping scalar variable");
            }
            continue;
        }

        let (data, mut attrs) = read_values(&var)?;
        attrs.remove("coordinates");

        let dims = var
            .dimensions()
            .iter()
            .map(|d| {
                coords
                    .get(&d.name())
                    .cloned()
                    .ok_or_else(|| NetCdfError::MissingData(format!("dimension {}", d.name())))
            })
            .collect::<NetCdfResult<Vec<_>>>()?;

        let mut field = GriddedField::new(name, dims, data)?;
        *field.attrs_mut() = attrs;
        dataset.insert(field)?;
    }
    for coord in scalars {
        dataset.set_scalar_coord(coord)?;
    }

    for attr in file.attributes() {
        if let Some(value) = attr.value().ok().and_then(to_attr_value) {
            dataset.set_attr(attr.name(), value);
        }
    }

    debug!(
        path = %path.display(),
        variables = dataset.len(),
        "Read NetCDF dataset"
    );
    Ok(dataset)
}

/// A 1-D variable named after its own dimension.
fn is_coordinate_variable(var: &netcdf::Variable) -> bool {
    let dims = var.dimensions();
    dims.len() == 1 && dims[0].name() == var.name()
}

fn is_numeric(var: &netcdf::Variable) -> bool {
    matches!(var.vartype(), NcVariableType::Int(_) | NcVariableType::Float(_))
}

/// A 0-d variable tagged as time by `standard_name` or `axis`.
fn is_time_axis(var: &netcdf::Variable) -> bool {
    text_attr(var, "standard_name").as_deref() == Some("time")
        || text_attr(var, "axis").as_deref() == Some("T")
}

fn text_attr(var: &netcdf::Variable, key: &str) -> Option<String> {
    var.attribute(key)
        .and_then(|attr| attr.value().ok())
        .and_then(to_attr_value)
        .and_then(|value| value.as_str().map(str::to_string))
}

/// Names listed in any variable's or the global `coordinates` attribute.
fn referenced_coordinates(file: &netcdf::File) -> HashSet<String> {
    let global = file
        .attribute("coordinates")
        .and_then(|attr| attr.value().ok())
        .and_then(to_attr_value)
        .and_then(|value| value.as_str().map(str::to_string));

    file.variables()
        .filter_map(|var| text_attr(&var, "coordinates"))
        .chain(global)
        .flat_map(|list| {
            list.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Read a variable as unpacked `f64` values together with its remaining
/// attributes.
fn read_values(var: &netcdf::Variable) -> NetCdfResult<(Vec<f64>, Attributes)> {
    let raw: Vec<f64> = var.get_values(..)?;

    let mut attrs = Attributes::new();
    for attr in var.attributes() {
        if let Some(value) = attr.value().ok().and_then(to_attr_value) {
            attrs.insert(attr.name().to_string(), value);
        }
    }

    let fill: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|key| attrs.get(*key))
        .flat_map(|value| match value {
            AttrValue::Number(v) => vec![*v],
            AttrValue::Numbers(v) => v.clone(),
            AttrValue::Text(_) => Vec::new(),
        })
        .collect();
    let scale = attrs.get("scale_factor").and_then(AttrValue::as_f64).unwrap_or(1.0);
    let offset = attrs.get("add_offset").and_then(AttrValue::as_f64).unwrap_or(0.0);

    let values = raw
        .into_iter()
        .map(|v| {
            if v.is_nan() || fill.contains(&v) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    for key in PACKING_ATTRS {
        attrs.remove(key);
    }
    Ok((values, attrs))
}
