//! Write [`Dataset`]s to NetCDF files.

use std::path::Path;

use grid_processor::{Attributes, Dataset};
use tracing::{debug, info};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{from_attr_value, silence_hdf5_errors};

/// Write a dataset to `path` as NetCDF-4.
///
/// The file is first written to a `.partial` temp file next to the
/// destination and renamed into place once complete, so readers never see a
/// half-written file and a failed write leaves nothing behind.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> NetCdfResult<()> {
    silence_hdf5_errors();

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".fusion-")
        .suffix(".partial")
        .tempfile_in(dir)?;

    write_contents(dataset, temp.path())?;

    temp.persist(path).map_err(|e| NetCdfError::IoError(e.error))?;

    info!(
        path = %path.display(),
        variables = dataset.len(),
        "Wrote NetCDF dataset"
    );
    Ok(())
}

fn write_contents(dataset: &Dataset, path: &Path) -> NetCdfResult<()> {
    let mut file = netcdf::create(path)?;

    for coord in dataset.coords() {
        file.add_dimension(&coord.name, coord.len())?;
    }

    for coord in dataset.coords() {
        let mut var = file.add_variable::<f64>(&coord.name, &[coord.name.as_str()])?;
        put_attributes(&mut var, &coord.attrs)?;
        var.put_values(&coord.values, ..)?;
    }

    for coord in dataset.scalar_coords() {
        let mut var = file.add_variable::<f64>(&coord.name, &[])?;
        put_attributes(&mut var, &coord.attrs)?;
        var.put_values(&coord.values, ..)?;
    }
    let scalar_names = dataset
        .scalar_coords()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    for field in dataset.variables() {
        let dims = field.dims();
        let mut var = file.add_variable::<f64>(field.name(), &dims)?;
        if field.data().iter().any(|v| v.is_nan()) {
            var.put_attribute("_FillValue", f64::NAN)?;
        }
        if !scalar_names.is_empty() {
            var.put_attribute("coordinates", scalar_names.as_str())?;
        }
        put_attributes(&mut var, field.attrs())?;
        var.put_values(field.data(), ..)?;
        debug!(variable = %field.name(), dims = ?dims, "Wrote variable");
    }

    for (key, value) in dataset.attrs() {
        file.add_attribute(key, from_attr_value(value))?;
    }

    Ok(())
}

fn put_attributes(var: &mut netcdf::VariableMut<'_>, attrs: &Attributes) -> NetCdfResult<()> {
    for (key, value) in attrs {
        // Derived from the data and the scalar coordinates
        if key == "_FillValue" || key == "coordinates" {
            continue;
        }
        var.put_attribute(key, from_attr_value(value))?;
    }
    Ok(())
}
