//! Night plan orchestration.
//!
//! Runs the whole pipeline strictly one request at a time: the weather
//! forecast first, then one positions request per observation hour. Upstream
//! failures never abort the run. A failed weather fetch leaves the verdict
//! empty and a failed hour is skipped.

use chrono::{Days, NaiveDate};

use crate::config::AppConfig;
use crate::services::astronomy::{AstronomyClient, Observer};
use crate::services::night::{observation_hours, NightAggregator, NightlyBodyRecord};
use crate::services::seventimer::SevenTimerClient;
use crate::services::weather::{self, WeatherVerdict};

/// Everything the report needs about one night.
#[derive(Debug, Clone)]
pub struct NightPlan {
    /// Calendar date the evening starts on.
    pub date: NaiveDate,
    /// `None` when the forecast was unavailable or had no samples in the window.
    pub verdict: Option<WeatherVerdict>,
    /// Why the forecast could not be fetched, if it could not.
    pub weather_error: Option<String>,
    /// Ranked and filtered per the configured output mode.
    pub targets: Vec<NightlyBodyRecord>,
    pub hours_checked: Vec<u8>,
    pub failed_hours: Vec<u8>,
}

/// Calendar date to request positions for: hours before the start hour
/// belong to the morning after.
pub fn date_for_hour(evening_date: NaiveDate, start_hour: u8, hour: u8) -> NaiveDate {
    if hour < start_hour {
        evening_date
            .checked_add_days(Days::new(1))
            .unwrap_or(evening_date)
    } else {
        evening_date
    }
}

/// Assess the weather and collect every body's positions for the evening
/// starting on `date`.
pub async fn run_night_plan(
    config: &AppConfig,
    weather_client: &SevenTimerClient,
    astronomy_client: &AstronomyClient,
    date: NaiveDate,
) -> NightPlan {
    tracing::info!("Checking weather conditions");
    let (verdict, weather_error) = match weather_client
        .fetch_forecast(config.latitude, config.longitude)
        .await
    {
        Ok(samples) => {
            let verdict = weather::assess(
                &samples,
                config.evening_start_hour,
                config.evening_end_hour,
            );
            match &verdict {
                Some(v) => tracing::info!(
                    "Weather verdict: {} (worth observing: {}, penalty {}, {} samples)",
                    v.quality,
                    v.worth_observing,
                    v.penalty_score,
                    v.sample_count
                ),
                None => tracing::warn!("No forecast samples fall inside the evening window"),
            }
            (verdict, None)
        }
        Err(e) => {
            tracing::warn!("Could not fetch weather data: {}", e);
            (None, Some(e.to_string()))
        }
    };

    let observer = Observer {
        latitude: config.latitude,
        longitude: config.longitude,
        elevation: config.elevation,
    };
    let hours = observation_hours(config.evening_start_hour, config.evening_end_hour);
    let mut aggregator = NightAggregator::new(config.telescope());
    let mut failed_hours = Vec::new();

    tracing::info!(
        "Analyzing celestial positions for {} hours starting {}",
        hours.len(),
        date
    );
    for &hour in &hours {
        let hour_date = date_for_hour(date, config.evening_start_hour, hour);
        match astronomy_client
            .fetch_positions(&observer, hour_date, hour)
            .await
        {
            Ok(samples) => {
                tracing::debug!("Hour {:02}: {} bodies", hour, samples.len());
                aggregator.record_all(&samples);
            }
            Err(e) => {
                tracing::error!("Error fetching data for {:02}:00: {}", hour, e);
                failed_hours.push(hour);
            }
        }
    }

    let targets = aggregator.summarize(config.output_mode);
    tracing::info!(
        "{} of {} bodies reported",
        targets.len(),
        aggregator.body_count()
    );

    NightPlan {
        date,
        verdict,
        weather_error,
        targets,
        hours_checked: hours,
        failed_hours,
    }
}
