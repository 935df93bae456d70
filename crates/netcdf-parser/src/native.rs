//! Glue between the netcdf library and the dataset model.

use std::sync::Once;

use grid_processor::AttrValue;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// It only needs to be called once per process, but is safe to call multiple
/// times. The reader and writer call it before touching any file.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Convert a NetCDF attribute into the model's attribute value.
///
/// Integer and float scalars and arrays become numbers; string arrays are
/// joined with newlines. Returns `None` for empty arrays.
pub(crate) fn to_attr_value(value: netcdf::AttributeValue) -> Option<AttrValue> {
    use netcdf::AttributeValue as V;

    let numbers = |v: Vec<f64>| match v.len() {
        0 => None,
        1 => Some(AttrValue::Number(v[0])),
        _ => Some(AttrValue::Numbers(v)),
    };

    match value {
        V::Str(s) => Some(AttrValue::Text(s)),
        V::Strs(s) => Some(AttrValue::Text(s.join("\n"))),
        V::Double(v) => Some(AttrValue::Number(v)),
        V::Float(v) => Some(AttrValue::Number(v as f64)),
        V::Int(v) => Some(AttrValue::Number(v as f64)),
        V::Short(v) => Some(AttrValue::Number(v as f64)),
        V::Schar(v) => Some(AttrValue::Number(v as f64)),
        V::Uchar(v) => Some(AttrValue::Number(v as f64)),
        V::Ushort(v) => Some(AttrValue::Number(v as f64)),
        V::Uint(v) => Some(AttrValue::Number(v as f64)),
        V::Longlong(v) => Some(AttrValue::Number(v as f64)),
        V::Ulonglong(v) => Some(AttrValue::Number(v as f64)),
        V::Doubles(v) => numbers(v),
        V::Floats(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Ints(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Shorts(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Schars(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Uchars(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Ushorts(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Uints(v) => numbers(v.into_iter().map(f64::from).collect()),
        V::Longlongs(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        V::Ulonglongs(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Convert a model attribute into a NetCDF attribute value.
pub(crate) fn from_attr_value(value: &AttrValue) -> netcdf::AttributeValue {
    match value {
        AttrValue::Text(s) => netcdf::AttributeValue::Str(s.clone()),
        AttrValue::Number(v) => netcdf::AttributeValue::Double(*v),
        AttrValue::Numbers(v) => netcdf::AttributeValue::Doubles(v.clone()),
    }
}
