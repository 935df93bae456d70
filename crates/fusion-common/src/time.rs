//! UTC time handling for source file names and output artifacts.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{FusionError, FusionResult};

/// Timestamp layouts found at the start of source file names, with their length.
///
/// - `2024-01-01T00-00Z` (reanalysis downloads)
/// - `2024-01-01T00:00:00Z` (forecast downloads)
/// - `2024-01-01T00-00-00Z` (our own output stems)
const FILENAME_LAYOUTS: &[(&str, usize)] = &[
    ("%Y-%m-%dT%H:%M:%SZ", 20),
    ("%Y-%m-%dT%H-%M-%SZ", 20),
    ("%Y-%m-%dT%H-%MZ", 17),
];

/// Parse an ISO 8601 / RFC 3339 timestamp that carries an explicit offset.
///
/// Timestamps without a zone designator are rejected instead of being
/// interpreted in some implicit local zone.
pub fn parse_utc_timestamp(s: &str) -> FusionResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
    {
        return Err(FusionError::invalid_input(format!(
            "timestamp '{}' has no time zone; use an explicit offset such as 'Z'",
            s
        )));
    }

    Err(FusionError::invalid_input(format!(
        "invalid timestamp '{}'",
        s
    )))
}

/// File stem for an output artifact written at `now`.
///
/// ISO 8601 in UTC with second precision, with `:` and `.` replaced so the
/// name is safe on every filesystem: `2025-07-14T11-38-45Z`.
pub fn output_file_stem(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
        .replace([':', '.'], "-")
}

/// Extract the leading timestamp of a source file name, if it has one.
pub fn parse_filename_timestamp(filename: &str) -> Option<DateTime<Utc>> {
    FILENAME_LAYOUTS.iter().find_map(|(layout, len)| {
        let prefix = filename.get(..*len)?;
        NaiveDateTime::parse_from_str(prefix, layout)
            .ok()
            .map(|ndt| Utc.from_utc_datetime(&ndt))
    })
}
