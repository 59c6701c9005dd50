//! Small formatting helpers shared by the positions client and the report.
//!
//! Averages are shown to one decimal place through `rust_decimal` so the
//! report rounds the same way regardless of binary float noise.

use rust_decimal::Decimal;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert an f64 to Decimal, rounded to 1 decimal place.
///
/// Returns `Decimal::ZERO` for non-finite inputs (NaN, ±Inf).
pub(crate) fn f64_to_decimal_1dp(v: f64) -> Decimal {
    if !v.is_finite() {
        tracing::warn!(
            "f64_to_decimal_1dp received non-finite value {}, defaulting to 0",
            v
        );
        return Decimal::ZERO;
    }
    Decimal::from_str_exact(&format!("{:.1}", v)).unwrap_or_default()
}

/// Time-of-day parameter for the positions API, e.g. `21:00:00`.
pub(crate) fn format_api_time(hour: u8) -> String {
    format!("{:02}:00:00", hour)
}

/// 12-hour clock label for an hour of day, e.g. `9:00 PM`.
pub(crate) fn format_hour_display(hour: u8) -> String {
    let display_hour = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    let period = if hour >= 12 { "PM" } else { "AM" };
    format!("{}:00 {}", display_hour, period)
}

/// 16-point compass direction for an azimuth in degrees (0 = north).
pub(crate) fn compass_direction(azimuth_deg: f64) -> &'static str {
    let index = (azimuth_deg / 22.5).round().rem_euclid(16.0) as usize;
    COMPASS_POINTS[index % 16]
}

pub(crate) fn format_magnitude(magnitude: Option<f64>) -> String {
    match magnitude {
        Some(m) => format!("{:.2}", m),
        None => "N/A".to_string(),
    }
}
