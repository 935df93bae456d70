//! Human-readable summary of a NetCDF dataset.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use grid_processor::{AttrValue, Attributes, Coordinate, Dataset};

/// Read `path` and print its structure, variables and coordinates.
pub fn inspect(path: &Path) -> Result<()> {
    let dataset = netcdf_parser::read_dataset(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{}", Summary(&dataset));
    Ok(())
}

/// Display adapter listing what a dataset holds.
pub struct Summary<'a>(pub &'a Dataset);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = self.0;

        writeln!(f, "--- Full Structure ---")?;
        writeln!(f)?;
        let dims: Vec<String> = ds
            .coords()
            .map(|c| format!("{}: {}", c.name, c.len()))
            .collect();
        writeln!(f, "Dimensions:  ({})", dims.join(", "))?;
        writeln!(f, "Variables:   {}", ds.len())?;
        writeln!(f, "Attributes:")?;
        write_attrs(f, ds.attrs(), "    ")?;

        writeln!(f)?;
        writeln!(f, "--- Variables ---")?;
        writeln!(f)?;
        for field in ds.variables() {
            let missing = field.data().iter().filter(|v| v.is_nan()).count();
            writeln!(
                f,
                "    {:<16} ({})  {}  missing: {}/{}",
                field.name(),
                field.dims().join(", "),
                field.units().unwrap_or("-"),
                missing,
                field.len()
            )?;
        }

        writeln!(f)?;
        writeln!(f, "--- Coordinates ---")?;
        writeln!(f)?;
        for coord in ds.coords() {
            writeln!(f, "  * {:<16} ({})  {}", coord.name, coord.len(), extent(coord))?;
        }
        for coord in ds.scalar_coords() {
            writeln!(f, "    {:<16} ()  {}", coord.name, extent(coord))?;
        }
        Ok(())
    }
}

fn extent(coord: &Coordinate) -> String {
    let units = coord
        .attrs
        .get("units")
        .and_then(AttrValue::as_str)
        .map(|u| format!(" [{}]", u))
        .unwrap_or_default();
    match coord.values.as_slice() {
        [] => format!("empty{}", units),
        [only] => format!("{}{}", only, units),
        [first, .., last] => format!("{} .. {}{}", first, last, units),
    }
}

fn write_attrs(f: &mut fmt::Formatter<'_>, attrs: &Attributes, indent: &str) -> fmt::Result {
    for (key, value) in attrs {
        match value {
            AttrValue::Text(s) => writeln!(f, "{}{}: {}", indent, key, s)?,
            AttrValue::Number(v) => writeln!(f, "{}{}: {}", indent, key, v)?,
            AttrValue::Numbers(v) => writeln!(f, "{}{}: {:?}", indent, key, v)?,
        }
    }
    Ok(())
}
