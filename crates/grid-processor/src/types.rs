//! Core types for gridded datasets.

use std::collections::BTreeMap;

use fusion_common::{FusionError, FusionResult};
use serde::{Deserialize, Serialize};

use crate::longitude::LONGITUDE_NAMES;

/// A metadata attribute value (units, long_name, fill values, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Numbers(Vec<f64>),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            AttrValue::Numbers(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        AttrValue::Numbers(v)
    }
}

/// Free-form metadata, ordered by key.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A named, monotonic coordinate axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub name: String,
    pub values: Vec<f64>,
    pub attrs: Attributes,
}

impl Coordinate {
    /// Create a new coordinate without attributes.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attrs: Attributes::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Evenly spaced values in `[start, stop)`.
    ///
    /// Values are computed as `start + i * step` rather than by accumulation,
    /// so quarter-degree axes stay exact.
    pub fn regular(name: impl Into<String>, start: f64, stop: f64, step: f64) -> Self {
        let count = ((stop - start) / step).ceil().max(0.0) as usize;
        let values = (0..count)
            .map(|i| start + i as f64 * step)
            .filter(|v| *v < stop)
            .collect();
        Self::new(name, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.values.windows(2).all(|w| w[0] < w[1])
    }

    /// Strictly increasing or strictly decreasing. NaN values never are.
    pub fn is_monotonic(&self) -> bool {
        self.is_strictly_increasing() || self.values.windows(2).all(|w| w[0] > w[1])
    }

    /// Increasing once the values are unwrapped modulo 360 with at most one
    /// wrap, as in `[350, 0, 10]`. Used for longitude axes that have not
    /// been normalized yet.
    fn is_cyclic_increasing(&self) -> bool {
        if self.values.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let wraps = self.values.windows(2).filter(|w| w[1] <= w[0]).count();
        let span_ok = match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) if wraps == 1 => *last < *first,
            _ => true,
        };
        wraps <= 1
            && span_ok
            && self
                .values
                .windows(2)
                .all(|w| w[1] > w[0] || w[1] + 360.0 > w[0])
    }

    /// Compare values with another coordinate of the same name.
    ///
    /// With `tolerance == 0.0` this is bit-exact equality (NaN never matches).
    pub fn matches(&self, other: &Coordinate, tolerance: f64) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a == b || (a - b).abs() <= tolerance)
    }

    /// Describe why two coordinates do not match (for error messages).
    pub(crate) fn describe_mismatch(&self, other: &Coordinate, tolerance: f64) -> String {
        if self.values.len() != other.values.len() {
            return format!("length {} vs {}", self.values.len(), other.values.len());
        }
        let first = self
            .values
            .iter()
            .zip(&other.values)
            .position(|(a, b)| !(a == b || (a - b).abs() <= tolerance));
        match first {
            Some(i) => format!(
                "value at index {} is {} vs {}",
                i, self.values[i], other.values[i]
            ),
            None => "values match".to_string(),
        }
    }
}

/// A named numeric array addressed by ordered coordinate axes.
///
/// Data is stored in row-major order: the last dimension varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedField {
    name: String,
    coords: Vec<Coordinate>,
    data: Vec<f64>,
    attrs: Attributes,
}

impl GriddedField {
    /// Create a field, checking that the data length equals the product of
    /// the coordinate lengths, that dimension names are unique and that every
    /// coordinate is monotonic.
    ///
    /// Longitude axes may wrap once (`[350, 0, 10]`) since normalization is
    /// what puts them in order.
    pub fn new(
        name: impl Into<String>,
        coords: Vec<Coordinate>,
        data: Vec<f64>,
    ) -> FusionResult<Self> {
        let name = name.into();

        for (i, coord) in coords.iter().enumerate() {
            if coords[..i].iter().any(|c| c.name == coord.name) {
                return Err(FusionError::invalid_coordinate(
                    &coord.name,
                    format!("dimension repeated in field '{}'", name),
                ));
            }
            let is_longitude = LONGITUDE_NAMES.contains(&coord.name.as_str());
            if !(coord.is_monotonic() || (is_longitude && coord.is_cyclic_increasing())) {
                return Err(FusionError::invalid_coordinate(
                    &coord.name,
                    format!("values are not monotonic in field '{}'", name),
                ));
            }
        }

        let expected: usize = coords.iter().map(Coordinate::len).product();
        if expected != data.len() {
            return Err(FusionError::ShapeMismatch {
                name,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            name,
            coords,
            data,
            attrs: Attributes::new(),
        })
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension names in declared order.
    pub fn dims(&self) -> Vec<&str> {
        self.coords.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.iter().find(|c| c.name == dim)
    }

    /// Position of a dimension in the field's axis order.
    pub fn axis(&self, dim: &str) -> Option<usize> {
        self.coords.iter().position(|c| c.name == dim)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.coords.iter().map(Coordinate::len).collect()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    pub fn units(&self) -> Option<&str> {
        self.attrs.get("units").and_then(AttrValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at a multi-dimensional index, one entry per dimension.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.coords.len() {
            return None;
        }
        let mut flat = 0;
        for (i, coord) in index.iter().zip(&self.coords) {
            if *i >= coord.len() {
                return None;
            }
            flat = flat * coord.len() + i;
        }
        self.data.get(flat).copied()
    }

    /// Why two fields are not the same definition: different dimensions,
    /// mismatched coordinates, or different data (NaN equal to NaN).
    /// Attributes are not compared.
    pub(crate) fn definition_difference(
        &self,
        other: &GriddedField,
        tolerance: f64,
    ) -> Option<String> {
        if self.dims() != other.dims() {
            return Some(format!(
                "dimensions ({}) vs ({})",
                self.dims().join(", "),
                other.dims().join(", ")
            ));
        }
        for (a, b) in self.coords.iter().zip(&other.coords) {
            if !a.matches(b, tolerance) {
                return Some(format!(
                    "coordinate '{}' differs: {}",
                    a.name,
                    a.describe_mismatch(b, tolerance)
                ));
            }
        }
        let differing = self
            .data
            .iter()
            .zip(&other.data)
            .filter(|(a, b)| !(a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())))
            .count();
        if differing > 0 {
            return Some(format!(
                "values differ at {} of {} points",
                differing,
                self.data.len()
            ));
        }
        None
    }

    /// Replace the coordinate of `axis` and reorder the data along it.
    ///
    /// Position `j` of the new axis takes the data that was at `perm[j]`.
    pub(crate) fn permute_axis(&mut self, axis: usize, coord: Coordinate, perm: &[usize]) {
        let n = self.coords[axis].len();
        debug_assert_eq!(perm.len(), n);
        debug_assert_eq!(coord.len(), n);

        let inner: usize = self.coords[axis + 1..].iter().map(Coordinate::len).product();
        let block = n * inner;
        let mut reordered = Vec::with_capacity(self.data.len());

        if block > 0 {
            for chunk in self.data.chunks_exact(block) {
                for &src in perm {
                    reordered.extend_from_slice(&chunk[src * inner..(src + 1) * inner]);
                }
            }
        }

        self.data = reordered;
        self.coords[axis] = coord;
    }

    /// Replace the coordinate of `axis` with one of identical length.
    pub(crate) fn relabel_axis(&mut self, axis: usize, coord: Coordinate) {
        debug_assert_eq!(self.coords[axis].len(), coord.len());
        self.coords[axis] = coord;
    }

    /// Remove a length-1 axis. Row-major data layout is unaffected.
    pub(crate) fn drop_singleton_axis(&mut self, axis: usize) {
        debug_assert_eq!(self.coords[axis].len(), 1);
        self.coords.remove(axis);
    }
}

/// Variables sharing a common coordinate system.
///
/// Every coordinate referenced by a field is also held in the dataset's
/// coordinate set, and fields sharing a coordinate name agree on its values.
///
/// Scalar coordinates label the whole dataset with a single value (the
/// forecast reference `time`, for instance) without being a dimension of
/// any field. A name is either a dimension or a scalar coordinate, never
/// both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    coords: BTreeMap<String, Coordinate>,
    scalars: BTreeMap<String, Coordinate>,
    variables: BTreeMap<String, GriddedField>,
    attrs: Attributes,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from fields, checking coordinate consistency.
    pub fn from_fields<I>(fields: I) -> FusionResult<Self>
    where
        I: IntoIterator<Item = GriddedField>,
    {
        let mut dataset = Self::new();
        for field in fields {
            dataset.insert(field)?;
        }
        Ok(dataset)
    }

    /// Add a field.
    ///
    /// Fails with `CoordinateMismatch` if one of its coordinates disagrees
    /// with the dataset's, and with `VariableConflict` if a different field
    /// of the same name is already present. Re-inserting an identical field
    /// is a no-op.
    pub fn insert(&mut self, field: GriddedField) -> FusionResult<()> {
        for coord in field.coords() {
            if self.scalars.contains_key(&coord.name) {
                return Err(FusionError::coordinate_mismatch(
                    &coord.name,
                    format!("scalar coordinate used as a dimension of '{}'", field.name()),
                ));
            }
            if let Some(existing) = self.coords.get(&coord.name) {
                if !existing.matches(coord, 0.0) {
                    return Err(FusionError::coordinate_mismatch(
                        &coord.name,
                        existing.describe_mismatch(coord, 0.0),
                    ));
                }
            }
        }

        if let Some(existing) = self.variables.get(field.name()) {
            return match existing.definition_difference(&field, 0.0) {
                None => Ok(()),
                Some(reason) => Err(FusionError::variable_conflict(field.name(), reason)),
            };
        }

        for coord in field.coords() {
            self.coords
                .entry(coord.name.clone())
                .or_insert_with(|| coord.clone());
        }
        self.variables.insert(field.name().to_string(), field);
        Ok(())
    }

    /// Add a scalar coordinate holding exactly one value.
    ///
    /// Re-adding an identical scalar is a no-op; a different value fails
    /// with `CoordinateMismatch`.
    pub fn set_scalar_coord(&mut self, coord: Coordinate) -> FusionResult<()> {
        if coord.len() != 1 {
            return Err(FusionError::invalid_coordinate(
                &coord.name,
                format!("a scalar coordinate holds one value, got {}", coord.len()),
            ));
        }
        if self.coords.contains_key(&coord.name) {
            return Err(FusionError::coordinate_mismatch(
                &coord.name,
                "already a dimension of this dataset",
            ));
        }
        if let Some(existing) = self.scalars.get(&coord.name) {
            if !existing.matches(&coord, 0.0) {
                return Err(FusionError::coordinate_mismatch(
                    &coord.name,
                    existing.describe_mismatch(&coord, 0.0),
                ));
            }
            return Ok(());
        }
        self.scalars.insert(coord.name.clone(), coord);
        Ok(())
    }

    pub fn scalar_coord(&self, name: &str) -> Option<&Coordinate> {
        self.scalars.get(name)
    }

    /// Scalar coordinates in name order.
    pub fn scalar_coords(&self) -> impl Iterator<Item = &Coordinate> {
        self.scalars.values()
    }

    pub fn variable(&self, name: &str) -> Option<&GriddedField> {
        self.variables.get(name)
    }

    /// Fields in name order.
    pub fn variables(&self) -> impl Iterator<Item = &GriddedField> {
        self.variables.values()
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    /// Coordinates in name order.
    pub fn coords(&self) -> impl Iterator<Item = &Coordinate> {
        self.coords.values()
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Drop a length-1 dimension from every field and from the coordinate set.
    /// The coordinate value is discarded, not kept as a scalar coordinate.
    ///
    /// Returns `false` when the dimension is absent. Fails with
    /// `InvalidInput` if the dimension has any length other than 1.
    pub fn squeeze(&mut self, dim: &str) -> FusionResult<bool> {
        let len = match self.coords.get(dim) {
            Some(coord) => coord.len(),
            None => return Ok(false),
        };
        if len != 1 {
            return Err(FusionError::invalid_input(format!(
                "cannot squeeze dimension '{}' of length {}",
                dim, len
            )));
        }

        for field in self.variables.values_mut() {
            if let Some(axis) = field.axis(dim) {
                field.drop_singleton_axis(axis);
            }
        }
        self.coords.remove(dim);
        Ok(true)
    }

    /// A new dataset holding only the named variables and the coordinates
    /// they reference. Scalar coordinates and global attributes are carried
    /// over.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> FusionResult<Dataset> {
        let mut subset = Dataset {
            scalars: self.scalars.clone(),
            attrs: self.attrs.clone(),
            ..Dataset::default()
        };
        for name in names {
            let name = name.as_ref();
            let field = self
                .variables
                .get(name)
                .ok_or_else(|| FusionError::MissingVariable(name.to_string()))?;
            subset.insert(field.clone())?;
        }
        Ok(subset)
    }

    /// Replace the coordinate `name` and permute every field along it.
    pub(crate) fn permute_coord(&mut self, coord: Coordinate, perm: &[usize]) {
        for field in self.variables.values_mut() {
            if let Some(axis) = field.axis(&coord.name) {
                field.permute_axis(axis, coord.clone(), perm);
            }
        }
        self.coords.insert(coord.name.clone(), coord);
    }

    /// Insert a field whose coordinates have already been checked against
    /// this dataset, relabeling its axes with the dataset's coordinates.
    pub(crate) fn insert_aligned(&mut self, mut field: GriddedField) {
        for axis in 0..field.coords().len() {
            let name = field.coords()[axis].name.clone();
            match self.coords.get(&name) {
                Some(canonical) => field.relabel_axis(axis, canonical.clone()),
                None => {
                    self.coords.insert(name, field.coords()[axis].clone());
                }
            }
        }
        self.variables.insert(field.name().to_string(), field);
    }

    pub(crate) fn insert_coord_unchecked(&mut self, coord: Coordinate) {
        self.coords.insert(coord.name.clone(), coord);
    }

    pub(crate) fn insert_scalar_unchecked(&mut self, coord: Coordinate) {
        self.scalars.insert(coord.name.clone(), coord);
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lat_lon_field(name: &str, base: f64) -> GriddedField {
        let lat = Coordinate::new("latitude", vec![10.0, 0.0, -10.0]);
        let lon = Coordinate::new("longitude", vec![0.0, 1.0]);
        let data = (0..6).map(|i| base + i as f64).collect();
        GriddedField::new(name, vec![lat, lon], data).unwrap()
    }

    #[test]
    fn test_field_shape_checked() {
        let lat = Coordinate::new("latitude", vec![10.0, 0.0]);
        let lon = Coordinate::new("longitude", vec![0.0, 1.0, 2.0]);
        let err = GriddedField::new("t2m", vec![lat, lon], vec![0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            FusionError::ShapeMismatch {
                expected: 6,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_field_repeated_dimension() {
        let lat = Coordinate::new("latitude", vec![10.0, 0.0]);
        let err = GriddedField::new("t2m", vec![lat.clone(), lat], vec![0.0; 4]).unwrap_err();
        assert_eq!(err.kind(), "InvalidCoordinateError");
    }

    #[test]
    fn test_field_get() {
        let field = lat_lon_field("t2m", 0.0);
        assert_eq!(field.shape(), vec![3, 2]);
        assert_eq!(field.get(&[0, 0]), Some(0.0));
        assert_eq!(field.get(&[1, 1]), Some(3.0));
        assert_eq!(field.get(&[2, 1]), Some(5.0));
        assert_eq!(field.get(&[3, 0]), None);
        assert_eq!(field.get(&[0]), None);
    }

    #[test]
    fn test_field_rejects_non_monotonic_axis() {
        let lat = Coordinate::new("latitude", vec![10.0, -10.0, 0.0]);
        let err = GriddedField::new("t2m", vec![lat], vec![0.0; 3]).unwrap_err();
        assert_eq!(err.kind(), "InvalidCoordinateError");

        let level = Coordinate::new("pressure_level", vec![500.0, 500.0]);
        assert!(GriddedField::new("z", vec![level], vec![0.0; 2]).is_err());

        let nan = Coordinate::new("latitude", vec![0.0, f64::NAN]);
        assert!(GriddedField::new("t2m", vec![nan], vec![0.0; 2]).is_err());
    }

    #[test]
    fn test_field_accepts_decreasing_and_wrapped_axes() {
        let lat = Coordinate::new("latitude", vec![10.0, 0.0, -10.0]);
        let lon = Coordinate::new("longitude", vec![350.0, 0.0, 10.0]);
        assert!(GriddedField::new("t2m", vec![lat, lon], vec![0.0; 9]).is_ok());

        // Only longitude axes may wrap, and only once
        let lat = Coordinate::new("latitude", vec![350.0, 0.0, 10.0]);
        assert!(GriddedField::new("t2m", vec![lat], vec![0.0; 3]).is_err());
        let lon = Coordinate::new("lon", vec![0.0, 180.0, 0.0, 180.0]);
        assert!(GriddedField::new("t2m", vec![lon], vec![0.0; 4]).is_err());
        let lon = Coordinate::new("lon", vec![10.0, 200.0, 10.0]);
        assert!(GriddedField::new("t2m", vec![lon], vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_regular_coordinate() {
        let lon = Coordinate::regular("longitude", -180.0, 180.0, 0.25);
        assert_eq!(lon.len(), 1440);
        assert_eq!(lon.values[0], -180.0);
        assert_eq!(lon.values[1439], 179.75);
        assert!(lon.is_strictly_increasing());
    }

    #[test]
    fn test_dataset_insert_shares_coords() {
        let mut ds = Dataset::new();
        ds.insert(lat_lon_field("t2m", 0.0)).unwrap();
        ds.insert(lat_lon_field("msl", 100.0)).unwrap();
        assert_eq!(ds.variable_names(), vec!["msl", "t2m"]);
        assert_eq!(ds.coords().count(), 2);
    }

    #[test]
    fn test_dataset_insert_coordinate_mismatch() {
        let mut ds = Dataset::new();
        ds.insert(lat_lon_field("t2m", 0.0)).unwrap();

        let lat = Coordinate::new("latitude", vec![10.0, 0.0, -10.5]);
        let lon = Coordinate::new("longitude", vec![0.0, 1.0]);
        let other = GriddedField::new("msl", vec![lat, lon], vec![0.0; 6]).unwrap();

        let err = ds.insert(other).unwrap_err();
        assert_eq!(err.kind(), "CoordinateMismatchError");
        assert!(!ds.contains("msl"));
    }

    #[test]
    fn test_dataset_insert_duplicate() {
        let mut ds = Dataset::new();
        ds.insert(lat_lon_field("t2m", 0.0)).unwrap();
        ds.insert(lat_lon_field("t2m", 0.0)).unwrap();
        assert_eq!(ds.len(), 1);

        let err = ds.insert(lat_lon_field("t2m", 1.0)).unwrap_err();
        assert_eq!(err.kind(), "VariableConflictError");
    }

    #[test]
    fn test_scalar_coords() {
        let mut ds = Dataset::from_fields([lat_lon_field("t2m", 0.0)]).unwrap();
        let time = Coordinate::new("time", vec![1_704_175_200.0]).with_attr("standard_name", "time");
        ds.set_scalar_coord(time.clone()).unwrap();
        ds.set_scalar_coord(time.clone()).unwrap();
        assert_eq!(ds.scalar_coord("time"), Some(&time));
        assert_eq!(ds.scalar_coords().count(), 1);
        assert!(ds.coord("time").is_none());

        let err = ds
            .set_scalar_coord(Coordinate::new("time", vec![0.0]))
            .unwrap_err();
        assert_eq!(err.kind(), "CoordinateMismatchError");

        let err = ds
            .set_scalar_coord(Coordinate::new("step", vec![0.0, 3600.0]))
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidCoordinateError");

        let err = ds
            .set_scalar_coord(Coordinate::new("latitude", vec![0.0]))
            .unwrap_err();
        assert_eq!(err.kind(), "CoordinateMismatchError");

        // A scalar name cannot become a dimension
        let field = GriddedField::new("tp", vec![Coordinate::new("time", vec![0.0])], vec![1.0])
            .unwrap();
        assert_eq!(ds.insert(field).unwrap_err().kind(), "CoordinateMismatchError");
    }

    #[test]
    fn test_subset_keeps_scalar_coords() {
        let mut ds =
            Dataset::from_fields([lat_lon_field("sst", 0.0), lat_lon_field("t2m", 0.0)]).unwrap();
        ds.set_scalar_coord(Coordinate::new("time", vec![0.0])).unwrap();

        let sst = ds.subset(&["sst"]).unwrap();
        assert_eq!(sst.scalar_coord("time").map(|c| c.values.clone()), Some(vec![0.0]));
    }

    #[test]
    fn test_squeeze() {
        let time = Coordinate::new("valid_time", vec![1_720_000_000.0]);
        let lat = Coordinate::new("latitude", vec![10.0, 0.0]);
        let field = GriddedField::new("sst", vec![time, lat], vec![280.0, 290.0]).unwrap();
        let mut ds = Dataset::from_fields([field]).unwrap();

        assert!(ds.squeeze("valid_time").unwrap());
        assert!(ds.coord("valid_time").is_none());

        let sst = ds.variable("sst").unwrap();
        assert_eq!(sst.dims(), vec!["latitude"]);
        assert_eq!(sst.data(), &[280.0, 290.0]);

        // Already gone
        assert!(!ds.squeeze("valid_time").unwrap());
    }

    #[test]
    fn test_squeeze_non_singleton() {
        let mut ds = Dataset::from_fields([lat_lon_field("t2m", 0.0)]).unwrap();
        let err = ds.squeeze("latitude").unwrap_err();
        assert_eq!(err.kind(), "InvalidInputError");
        assert_eq!(ds.variable("t2m").unwrap().shape(), vec![3, 2]);
    }

    #[test]
    fn test_subset() {
        let level = Coordinate::new("pressure_level", vec![500.0, 850.0]);
        let lat = Coordinate::new("latitude", vec![10.0, 0.0, -10.0]);
        let z = GriddedField::new("z", vec![level, lat], vec![0.0; 6]).unwrap();

        let mut ds = Dataset::from_fields([lat_lon_field("sst", 0.0), z]).unwrap();
        ds.set_attr("Conventions", "CF-1.7");

        let sst = ds.subset(&["sst"]).unwrap();
        assert_eq!(sst.variable_names(), vec!["sst"]);
        assert!(sst.coord("pressure_level").is_none());
        assert!(sst.coord("longitude").is_some());
        assert_eq!(sst.attrs().get("Conventions"), Some(&AttrValue::from("CF-1.7")));

        let err = ds.subset(&["tp"]).unwrap_err();
        assert!(matches!(err, FusionError::MissingVariable(name) if name == "tp"));
    }

    #[test]
    fn test_attr_value_accessors() {
        assert_eq!(AttrValue::from("K").as_str(), Some("K"));
        assert_eq!(AttrValue::from(1.5).as_f64(), Some(1.5));
        assert_eq!(AttrValue::from(vec![2.0]).as_f64(), Some(2.0));
        assert_eq!(AttrValue::from(vec![1.0, 2.0]).as_f64(), None);
    }
}
