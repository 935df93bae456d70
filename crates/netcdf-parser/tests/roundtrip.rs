//! Write/read tests against real NetCDF files in a scratch directory.

use grid_processor::{AttrValue, Coordinate, Dataset, GriddedField};
use netcdf_parser::{read_dataset, write_dataset};
use test_utils::{assert_slice_approx_eq, create_grid_with_nans, create_test_grid, temp_test_dir};

fn sample_dataset() -> Dataset {
    let lat = Coordinate::new("latitude", vec![10.0, 5.0, 0.0]).with_attr("units", "degrees_north");
    let lon = Coordinate::new("longitude", vec![-5.0, 0.0, 5.0, 10.0])
        .with_attr("units", "degrees_east");
    let level = Coordinate::new("pressure_level", vec![500.0, 850.0]).with_attr("units", "hPa");

    let sst = GriddedField::new(
        "sst",
        vec![lat.clone(), lon.clone()],
        create_grid_with_nans(4, 3, &[(1, 1)]),
    )
    .unwrap()
    .with_attr("units", "K")
    .with_attr("long_name", "Sea surface temperature");

    let mut z_data = create_test_grid(4, 3);
    z_data.extend(create_test_grid(4, 3).iter().map(|v| v + 0.5));
    let z = GriddedField::new("z", vec![level, lat, lon], z_data)
        .unwrap()
        .with_attr("units", "m**2 s**-2");

    let mut ds = Dataset::from_fields([sst, z]).unwrap();
    ds.set_attr("Conventions", "CF-1.7");
    ds.set_attr("version", 2.0);
    ds
}

#[test]
fn test_write_then_read() {
    let dir = temp_test_dir();
    let path = dir.path().join("2024-01-02T06-00-00Z.nc");
    let original = sample_dataset();

    write_dataset(&original, &path).unwrap();
    let read = read_dataset(&path).unwrap();

    assert_eq!(read.variable_names(), vec!["sst", "z"]);
    for coord in original.coords() {
        assert_eq!(read.coord(&coord.name), Some(coord));
    }
    for field in original.variables() {
        let back = read.variable(field.name()).unwrap();
        assert_eq!(back.dims(), field.dims());
        assert_eq!(back.attrs(), field.attrs());
        assert_slice_approx_eq!(back.data(), field.data(), 0.0);
    }
    assert_eq!(read.attrs().get("Conventions"), Some(&AttrValue::from("CF-1.7")));
    assert_eq!(read.attrs().get("version"), Some(&AttrValue::from(2.0)));
}

#[test]
fn test_no_partial_files_left() {
    let dir = temp_test_dir();
    let path = dir.path().join("out.nc");
    write_dataset(&sample_dataset(), &path).unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["out.nc".to_string()]);
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = temp_test_dir();
    let path = dir.path().join("missing").join("out.nc");
    assert!(write_dataset(&sample_dataset(), &path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_unpacks_scaled_values() {
    let dir = temp_test_dir();
    let path = dir.path().join("packed.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("valid_time", 1).unwrap();
        file.add_dimension("latitude", 2).unwrap();
        file.add_dimension("member", 3).unwrap();

        let mut lat = file.add_variable::<f64>("latitude", &["latitude"]).unwrap();
        lat.put_values(&[1.0, 0.0], ..).unwrap();

        let mut time = file.add_variable::<i64>("valid_time", &["valid_time"]).unwrap();
        time.put_attribute("units", "seconds since 1970-01-01").unwrap();
        time.put_values(&[1_704_153_600i64], ..).unwrap();

        let mut sst = file
            .add_variable::<i16>("sst", &["valid_time", "latitude", "member"])
            .unwrap();
        sst.put_attribute("scale_factor", 0.5f64).unwrap();
        sst.put_attribute("add_offset", 270.0f64).unwrap();
        sst.put_attribute("_FillValue", -32767i16).unwrap();
        sst.put_attribute("units", "K").unwrap();
        sst.put_values(&[0i16, 2, -32767, 4, 6, 8], ..).unwrap();

        file.add_variable::<i32>("number", &[]).unwrap();
    }

    let ds = read_dataset(&path).unwrap();
    assert_eq!(ds.variable_names(), vec!["sst"]);
    assert_eq!(ds.coord("member").unwrap().values, vec![0.0, 1.0, 2.0]);
    assert_eq!(ds.coord("valid_time").unwrap().values, vec![1_704_153_600.0]);
    assert_eq!(
        ds.coord("valid_time").unwrap().attrs.get("units"),
        Some(&AttrValue::from("seconds since 1970-01-01"))
    );

    let sst = ds.variable("sst").unwrap();
    assert_slice_approx_eq!(
        sst.data(),
        &[270.0, 271.0, f64::NAN, 272.0, 273.0, 274.0],
        1e-12
    );
    assert_eq!(sst.units(), Some("K"));
    assert!(sst.attrs().get("scale_factor").is_none());
    assert!(sst.attrs().get("_FillValue").is_none());
}

#[test]
fn test_scalar_coords_round_trip() {
    let dir = temp_test_dir();
    let path = dir.path().join("scalar.nc");
    let mut original = sample_dataset();
    original
        .set_scalar_coord(
            Coordinate::new("time", vec![1_704_153_600.0])
                .with_attr("units", "seconds since 1970-01-01"),
        )
        .unwrap();

    write_dataset(&original, &path).unwrap();
    let read = read_dataset(&path).unwrap();

    assert_eq!(read.scalar_coord("time"), original.scalar_coord("time"));
    assert!(read.coord("time").is_none());
    for field in read.variables() {
        assert!(field.attrs().get("coordinates").is_none());
    }

    let file = netcdf::open(&path).unwrap();
    let time = file.variable("time").unwrap();
    assert!(time.dimensions().is_empty());
    let sst = file.variable("sst").unwrap();
    match sst.attribute("coordinates").unwrap().value().unwrap() {
        netcdf::AttributeValue::Str(list) => assert_eq!(list, "time"),
        other => panic!("unexpected coordinates attribute {:?}", other),
    }
}

#[test]
fn test_time_tagged_scalar_kept() {
    let dir = temp_test_dir();
    let path = dir.path().join("tagged.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("latitude", 2).unwrap();
        let mut lat = file.add_variable::<f64>("latitude", &["latitude"]).unwrap();
        lat.put_values(&[1.0, 0.0], ..).unwrap();

        let mut t2m = file.add_variable::<f32>("t2m", &["latitude"]).unwrap();
        t2m.put_values(&[280.0f32, 281.0], ..).unwrap();

        let mut time = file.add_variable::<i64>("time", &[]).unwrap();
        time.put_attribute("standard_name", "time").unwrap();
        time.put_values(&[1_704_160_800i64], ..).unwrap();

        file.add_variable::<i32>("number", &[]).unwrap();
    }

    let ds = read_dataset(&path).unwrap();
    assert_eq!(ds.variable_names(), vec!["t2m"]);
    assert_eq!(ds.scalar_coord("time").unwrap().values, vec![1_704_160_800.0]);
    assert!(ds.scalar_coord("number").is_none());
}

#[test]
fn test_skips_string_variables() {
    let dir = temp_test_dir();
    let path = dir.path().join("strings.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("latitude", 2).unwrap();
        let mut lat = file.add_variable::<f64>("latitude", &["latitude"]).unwrap();
        lat.put_values(&[1.0, 0.0], ..).unwrap();

        let mut sst = file.add_variable::<f64>("sst", &["latitude"]).unwrap();
        sst.put_values(&[290.0, 291.0], ..).unwrap();

        file.add_string_variable("station", &["latitude"]).unwrap();
    }

    let ds = read_dataset(&path).unwrap();
    assert_eq!(ds.variable_names(), vec!["sst"]);
}

#[test]
fn test_corrupt_variable_is_an_error() {
    let dir = temp_test_dir();
    let path = dir.path().join("corrupt.nc");
    let (rows, cols) = (200usize, 200usize);
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("latitude", rows).unwrap();
        file.add_dimension("longitude", cols).unwrap();

        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let noise: Vec<f64> = (0..rows * cols)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ((state >> 33) % 1000) as f64
            })
            .collect();

        let mut var = file
            .add_variable::<f64>("noise", &["latitude", "longitude"])
            .unwrap();
        var.set_chunking(&[50, 50]).unwrap();
        var.set_compression(6, true).unwrap();
        var.put_values(&noise, ..).unwrap();
    }

    let mut bytes = std::fs::read(&path).unwrap();
    let len = bytes.len();
    for b in &mut bytes[len * 3 / 10..len * 6 / 10] {
        *b = 0xFF;
    }
    std::fs::write(&path, bytes).unwrap();

    assert!(read_dataset(&path).is_err());
}

#[test]
fn test_open_missing_file() {
    let dir = temp_test_dir();
    let err = read_dataset(&dir.path().join("absent.nc")).unwrap_err();
    let fusion: fusion_common::FusionError = err.into();
    assert_eq!(fusion.kind(), "StorageError");
}
