//! Weather suitability assessment.
//!
//! Reduces the forecast time series to a single verdict for the configured
//! evening window. Rules are applied in a fixed order; each may downgrade the
//! quality but never upgrade it, and precipitation overrides everything.

use std::fmt;

use crate::models::ForecastSample;

/// Overall verdict on the sky for the evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Unsuitable,
}

impl fmt::Display for WeatherQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeatherQuality::Excellent => "excellent",
            WeatherQuality::Good => "good",
            WeatherQuality::Fair => "fair",
            WeatherQuality::Poor => "poor",
            WeatherQuality::Unsuitable => "unsuitable",
        };
        f.write_str(s)
    }
}

/// Mean conditions over the evening window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherAverages {
    pub cloud_cover: f64,
    pub seeing: f64,
    pub transparency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherVerdict {
    pub quality: WeatherQuality,
    pub worth_observing: bool,
    pub averages: WeatherAverages,
    pub has_precipitation: bool,
    /// Human-readable reasons, in rule order.
    pub reasons: Vec<String>,
    /// Cumulative penalty points; informational only.
    pub penalty_score: u32,
    /// Number of forecast samples inside the window.
    pub sample_count: usize,
}

/// Whether `hour` lies in the inclusive window `[start, end]`, wrapping past
/// midnight when `end` is not after `start`.
pub fn hour_in_window(hour: u8, start_hour: u8, end_hour: u8) -> bool {
    if end_hour > start_hour {
        hour >= start_hour && hour <= end_hour
    } else {
        hour >= start_hour || hour <= end_hour
    }
}

/// Keep the samples that fall inside the evening window.
pub fn select_window(
    samples: &[ForecastSample],
    start_hour: u8,
    end_hour: u8,
) -> Vec<&ForecastSample> {
    samples
        .iter()
        .filter(|s| hour_in_window(s.hour_of_day, start_hour, end_hour))
        .collect()
}

fn mean(samples: &[&ForecastSample], field: impl Fn(&ForecastSample) -> f64) -> f64 {
    samples.iter().map(|s| field(*s)).sum::<f64>() / samples.len() as f64
}

/// Assess the forecast for the evening window.
///
/// Returns `None` when no sample falls in the window.
pub fn assess(samples: &[ForecastSample], start_hour: u8, end_hour: u8) -> Option<WeatherVerdict> {
    let window = select_window(samples, start_hour, end_hour);
    if window.is_empty() {
        return None;
    }

    let averages = WeatherAverages {
        cloud_cover: mean(&window, |s| s.cloud_cover),
        seeing: mean(&window, |s| s.seeing),
        transparency: mean(&window, |s| s.transparency),
    };
    let has_precipitation = window.iter().any(|s| s.precipitation.is_wet());

    let mut quality = WeatherQuality::Excellent;
    let mut penalty_score = 0;
    let mut reasons = Vec::new();

    // Cloud cover, 1 = clear
    if averages.cloud_cover >= 7.0 {
        penalty_score += 3;
        reasons.push("heavy cloud cover");
        quality = WeatherQuality::Poor;
    } else if averages.cloud_cover >= 5.0 {
        penalty_score += 2;
        reasons.push("moderate cloud cover");
        if quality == WeatherQuality::Excellent {
            quality = WeatherQuality::Fair;
        }
    } else if averages.cloud_cover >= 3.0 {
        penalty_score += 1;
        reasons.push("some clouds");
        if quality == WeatherQuality::Excellent {
            quality = WeatherQuality::Good;
        }
    } else {
        reasons.push("clear skies");
    }

    // Seeing, higher is steadier
    if averages.seeing <= 3.0 {
        penalty_score += 2;
        reasons.push("poor atmospheric stability");
        if matches!(quality, WeatherQuality::Excellent | WeatherQuality::Good) {
            quality = WeatherQuality::Fair;
        }
    } else if averages.seeing <= 5.0 {
        reasons.push("average atmospheric stability");
    } else {
        reasons.push("excellent atmospheric stability");
    }

    if averages.transparency <= 3.0 {
        penalty_score += 1;
        reasons.push("reduced transparency");
    } else if averages.transparency >= 6.0 {
        reasons.push("excellent transparency");
    }

    if has_precipitation {
        penalty_score += 4;
        reasons.push("precipitation expected");
        quality = WeatherQuality::Unsuitable;
    }

    let worth_observing = !matches!(quality, WeatherQuality::Unsuitable | WeatherQuality::Poor)
        && averages.cloud_cover < 6.0;

    Some(WeatherVerdict {
        quality,
        worth_observing,
        averages,
        has_precipitation,
        reasons: reasons.into_iter().map(String::from).collect(),
        penalty_score,
        sample_count: window.len(),
    })
}
