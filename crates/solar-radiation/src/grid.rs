//! Global irradiance grids.

use chrono::{DateTime, TimeZone};
use fusion_common::{FusionError, FusionResult};
use grid_processor::{Coordinate, GriddedField};
use rayon::prelude::*;
use tracing::debug;

use crate::model::Window;

/// Name of the reference field.
pub const TOA_RADIATION: &str = "toa_radiation";

/// Largest number of grid points a [`GridSpec`] may describe.
pub const MAX_GRID_POINTS: usize = 16_777_216;

/// Resolution of the global grid in degrees.
///
/// Latitudes cover [-90, 90) and longitudes [-180, 180). The grid may hold
/// at most [`MAX_GRID_POINTS`] points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub lat_step: f64,
    pub lon_step: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            lat_step: 0.25,
            lon_step: 0.25,
        }
    }
}

impl GridSpec {
    pub fn new(lat_step: f64, lon_step: f64) -> FusionResult<Self> {
        let spec = Self { lat_step, lon_step };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> FusionResult<()> {
        for (name, step) in [("lat_step", self.lat_step), ("lon_step", self.lon_step)] {
            if !step.is_finite() || step <= 0.0 {
                return Err(FusionError::invalid_input(format!(
                    "{} must be positive and finite, got {}",
                    name, step
                )));
            }
        }

        let points = (180.0 / self.lat_step).ceil() * (360.0 / self.lon_step).ceil();
        if points > MAX_GRID_POINTS as f64 {
            return Err(FusionError::invalid_input(format!(
                "grid of {} x {} degrees has {:.0} points, more than {}",
                self.lat_step, self.lon_step, points, MAX_GRID_POINTS
            )));
        }
        Ok(())
    }

    pub fn latitudes(&self) -> Coordinate {
        Coordinate::regular("latitude", -90.0, 90.0, self.lat_step)
            .with_attr("units", "degrees_north")
            .with_attr("standard_name", "latitude")
    }

    pub fn longitudes(&self) -> Coordinate {
        Coordinate::regular("longitude", -180.0, 180.0, self.lon_step)
            .with_attr("units", "degrees_east")
            .with_attr("standard_name", "longitude")
    }
}

/// Integrated TOA irradiance over the window ending at `end`, on a global
/// `latitude × longitude` grid.
///
/// Rows are evaluated in parallel. Each point equals
/// [`integrated_irradiance`](crate::integrated_irradiance) at its coordinates.
pub fn grid_integrated_irradiance<Tz: TimeZone>(
    end: &DateTime<Tz>,
    duration_hours: f64,
    spec: &GridSpec,
) -> FusionResult<GriddedField> {
    spec.validate()?;
    let window = Window::new(end, duration_hours)?;

    let lats = spec.latitudes();
    let lons = spec.longitudes();
    let width = lons.len();

    let mut data = vec![0.0; lats.len() * width];
    data.par_chunks_mut(width.max(1))
        .zip(lats.values.par_iter())
        .for_each(|(row, &lat)| {
            for (cell, &lon) in row.iter_mut().zip(&lons.values) {
                *cell = window.integrate(lat, lon);
            }
        });

    debug!(
        rows = lats.len(),
        cols = width,
        duration_hours,
        "Computed TOA radiation grid"
    );

    Ok(GriddedField::new(TOA_RADIATION, vec![lats, lons], data)?
        .with_attr("units", "J m-2")
        .with_attr("long_name", "Hourly TOA solar radiation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::integrated_irradiance;
    use chrono::Utc;
    use test_utils::assert_approx_eq;

    fn end() -> DateTime<Utc> {
        fusion_common::parse_utc_timestamp("2025-07-09T10:00:00Z").unwrap()
    }

    #[test]
    fn test_default_grid_shape() {
        let spec = GridSpec::default();
        assert_eq!(spec.latitudes().len(), 720);
        assert_eq!(spec.longitudes().len(), 1440);
        assert_eq!(spec.latitudes().values[719], 89.75);
        assert_eq!(spec.longitudes().values[0], -180.0);
    }

    #[test]
    fn test_grid_matches_point_model() {
        let spec = GridSpec::new(10.0, 15.0).unwrap();
        let field = grid_integrated_irradiance(&end(), 1.0, &spec).unwrap();

        assert_eq!(field.name(), TOA_RADIATION);
        assert_eq!(field.dims(), vec!["latitude", "longitude"]);
        assert_eq!(field.shape(), vec![18, 24]);
        assert_eq!(field.units(), Some("J m-2"));

        let lats = &field.coord("latitude").unwrap().values;
        let lons = &field.coord("longitude").unwrap().values;
        for (i, lat) in lats.iter().enumerate() {
            for (j, lon) in lons.iter().enumerate() {
                let expected = integrated_irradiance(*lat, *lon, &end(), 1.0).unwrap();
                assert_approx_eq!(field.get(&[i, j]).unwrap(), expected, 1e-9);
            }
        }
    }

    #[test]
    fn test_grid_non_negative_with_daylight() {
        let field = grid_integrated_irradiance(&end(), 1.0, &GridSpec::new(5.0, 5.0).unwrap())
            .unwrap();
        assert!(field.data().iter().all(|v| *v >= 0.0));
        assert!(field.data().iter().any(|v| *v > 0.0));
        assert!(field.data().iter().any(|v| *v == 0.0));
    }

    #[test]
    fn test_invalid_steps() {
        for (lat, lon) in [(0.0, 1.0), (1.0, -1.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            let err = grid_integrated_irradiance(&end(), 1.0, &GridSpec { lat_step: lat, lon_step: lon })
                .unwrap_err();
            assert_eq!(err.kind(), "InvalidInputError");
        }
    }

    #[test]
    fn test_too_many_points() {
        for (lat, lon) in [(1e-12, 0.25), (0.25, 1e-9), (0.01, 0.01)] {
            let err = GridSpec::new(lat, lon).unwrap_err();
            assert_eq!(err.kind(), "InvalidInputError");
            assert!(err.to_string().contains("points"));
        }

        let finest = GridSpec::new(0.0625, 0.0625).unwrap();
        let points = finest.latitudes().len() * finest.longitudes().len();
        assert_eq!(points, 2880 * 5760);
        assert!(points <= MAX_GRID_POINTS);
    }

    #[test]
    fn test_invalid_duration() {
        let err = grid_integrated_irradiance(&end(), 0.0, &GridSpec::default()).unwrap_err();
        assert_eq!(err.kind(), "InvalidInputError");
    }

    #[test]
    fn test_step_not_dividing_range() {
        let spec = GridSpec::new(7.0, 50.0).unwrap();
        assert_eq!(spec.latitudes().len(), 26);
        assert_eq!(*spec.latitudes().values.last().unwrap(), 85.0);
        assert_eq!(spec.longitudes().len(), 8);
    }
}
