//! Top-of-atmosphere (TOA) solar irradiance.
//!
//! A closed-form approximation that ignores eccentricity of the Earth's orbit,
//! the equation of time and TSI variability:
//!
//! ```text
//! δ  = -23.45° · cos(360/365 · (day_of_year + 10))
//! h  = 15 · (utc_hours + longitude/15 - 12)
//! cos θz = sin φ sin δ + cos φ cos δ cos h
//! I  = max(TSI · cos θz, 0)
//! ```
//!
//! [`integrated_irradiance`] applies the trapezoidal rule over a short window
//! ending at a given time; [`grid_integrated_irradiance`] evaluates it on a
//! global latitude/longitude grid to produce the `toa_radiation` reference
//! field.

pub mod grid;
pub mod model;

pub use grid::{grid_integrated_irradiance, GridSpec, TOA_RADIATION};
pub use model::{
    cosine_zenith, decimal_utc_hours, declination, hour_angle, instantaneous_irradiance,
    integrated_irradiance, TSI,
};
