//! Point-wise irradiance model.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use fusion_common::{FusionError, FusionResult};
use tracing::warn;

/// Total solar irradiance (W m-2).
pub const TSI: f64 = 1361.0;

/// Solar declination in degrees for a day of year (1 = January 1st).
///
/// No leap-year handling.
pub fn declination(day_of_year: f64) -> f64 {
    -23.45 * (360.0_f64 / 365.0 * (day_of_year + 10.0)).to_radians().cos()
}

/// Hours since midnight UTC, to the second.
pub fn decimal_utc_hours<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    let utc = time.with_timezone(&Utc);
    utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0
}

/// Hour angle in degrees. Zero at local solar noon, positive in the afternoon.
pub fn hour_angle<Tz: TimeZone>(time: &DateTime<Tz>, longitude: f64) -> f64 {
    hour_angle_from_hours(decimal_utc_hours(time), longitude)
}

pub(crate) fn hour_angle_from_hours(utc_hours: f64, longitude: f64) -> f64 {
    15.0 * (utc_hours + longitude / 15.0 - 12.0)
}

/// Cosine of the solar zenith angle. All inputs in degrees.
pub fn cosine_zenith(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let phi = latitude.to_radians();
    let delta = declination.to_radians();
    let h = hour_angle.to_radians();
    phi.sin() * delta.sin() + phi.cos() * delta.cos() * h.cos()
}

/// Instantaneous TOA irradiance (W m-2), zero when the sun is below the horizon.
///
/// The day of year is the UTC ordinal day of `time`.
pub fn instantaneous_irradiance<Tz: TimeZone>(
    latitude: f64,
    longitude: f64,
    time: &DateTime<Tz>,
) -> f64 {
    SunState::at(time).irradiance(latitude, longitude)
}

/// TOA irradiance integrated over `duration_hours` ending at `end` (J m-2).
///
/// Trapezoidal rule over the two end points, intended for windows of about
/// an hour. Fractional durations are honored exactly.
pub fn integrated_irradiance<Tz: TimeZone>(
    latitude: f64,
    longitude: f64,
    end: &DateTime<Tz>,
    duration_hours: f64,
) -> FusionResult<f64> {
    let window = Window::new(end, duration_hours)?;
    Ok(window.integrate(latitude, longitude))
}

/// Sun position terms shared by every grid point at one instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SunState {
    declination: f64,
    utc_hours: f64,
}

impl SunState {
    pub(crate) fn at<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        let utc = time.with_timezone(&Utc);
        Self {
            declination: declination(utc.ordinal() as f64),
            utc_hours: decimal_utc_hours(&utc),
        }
    }

    pub(crate) fn irradiance(&self, latitude: f64, longitude: f64) -> f64 {
        let h = hour_angle_from_hours(self.utc_hours, longitude);
        (TSI * cosine_zenith(latitude, self.declination, h)).max(0.0)
    }
}

/// A validated integration window.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    start: SunState,
    end: SunState,
    seconds: f64,
}

impl Window {
    pub(crate) fn new<Tz: TimeZone>(end: &DateTime<Tz>, duration_hours: f64) -> FusionResult<Self> {
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            return Err(FusionError::invalid_input(format!(
                "integration duration must be positive and finite, got {} hours",
                duration_hours
            )));
        }
        if duration_hours > 1.0 {
            warn!(
                duration_hours,
                "Trapezoidal integration over more than one hour loses accuracy"
            );
        }

        let end = end.with_timezone(&Utc);
        let micros = (duration_hours * 3_600_000_000.0).round();
        if micros > i64::MAX as f64 {
            return Err(FusionError::invalid_input(format!(
                "integration duration of {} hours is out of range",
                duration_hours
            )));
        }
        let start = end
            .checked_sub_signed(Duration::microseconds(micros as i64))
            .ok_or_else(|| {
                FusionError::invalid_input(format!(
                    "integration window of {} hours starts before the representable range",
                    duration_hours
                ))
            })?;

        Ok(Self {
            start: SunState::at(&start),
            end: SunState::at(&end),
            seconds: duration_hours * 3600.0,
        })
    }

    pub(crate) fn integrate(&self, latitude: f64, longitude: f64) -> f64 {
        let a = self.start.irradiance(latitude, longitude);
        let b = self.end.irradiance(latitude, longitude);
        self.seconds * (a + b) / 2.0
    }
}
