//! Distance and duration presentation for resolved legs.

use serde::{Deserialize, Serialize};

use crate::resolver::RouteLeg;

/// Human-readable totals for a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LegSummary {
    /// e.g. "12.3 km"
    pub distance: String,
    /// e.g. "2h 5m"
    pub duration: String,
}

/// Format meters as kilometers with one decimal place.
///
/// ```
/// use route_geometry::format_distance;
/// assert_eq!(format_distance(12_345.0), "12.3 km");
/// ```
pub fn format_distance(meters: f64) -> String {
    let km = if meters.is_finite() && meters > 0.0 {
        meters / 1000.0
    } else {
        0.0
    };
    format!("{:.1} km", km)
}

/// Format seconds as `"Hh Mm"`, or `"Mm"` under an hour.
///
/// Seconds are floored to whole minutes first.
///
/// ```
/// use route_geometry::format_duration;
/// assert_eq!(format_duration(125.0 * 60.0), "2h 5m");
/// assert_eq!(format_duration(59.0), "0m");
/// ```
pub fn format_duration(seconds: f64) -> String {
    format_duration_minutes(seconds / 60.0)
}

/// Format minutes as `"Hh Mm"`, or `"Mm"` under an hour.
pub fn format_duration_minutes(minutes: f64) -> String {
    let total = if minutes.is_finite() && minutes > 0.0 {
        minutes.floor() as u64
    } else {
        0
    };
    let hours = total / 60;
    let mins = total % 60;

    if hours >= 1 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

impl RouteLeg {
    /// Formatted distance and duration of this leg.
    pub fn summary(&self) -> LegSummary {
        LegSummary {
            distance: format_distance(self.distance_meters),
            duration: format_duration(self.duration_seconds),
        }
    }
}
