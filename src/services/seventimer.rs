//! 7Timer! ASTRO forecast client.
//!
//! Fetches the 3-hourly astronomical forecast (cloud cover, seeing,
//! transparency, precipitation type) for the observer's location.
//! See: https://www.7timer.info/doc.php

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{ForecastSample, PrecipitationKind};

const ASTRO_PATH: &str = "/bin/astro.php";

/// Client for the 7Timer! ASTRO product.
#[derive(Debug, Clone)]
pub struct SevenTimerClient {
    client: reqwest::Client,
    base_url: String,
}

// --- 7Timer! JSON response types ---

#[derive(Debug, Deserialize)]
struct AstroResponse {
    dataseries: Vec<AstroPoint>,
}

#[derive(Debug, Deserialize)]
struct AstroPoint {
    /// Hours since forecast init.
    timepoint: u32,
    cloudcover: f64,
    seeing: f64,
    transparency: f64,
    #[serde(default)]
    prec_type: Option<String>,
}

impl SevenTimerClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the forecast time series for a location.
    pub async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastSample>, AppError> {
        let url = format!(
            "{}{}?lon={}&lat={}&ac=0&lang=en&unit=imperial&output=json&tzshift=0",
            self.base_url, ASTRO_PATH, longitude, latitude
        );
        tracing::debug!("Fetching weather forecast from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::UpstreamRequest(format!("Weather request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamRequest(format!(
                "Weather API request failed with status {}",
                response.status()
            )));
        }

        // 7Timer! does not always send a JSON content type, so parse the text.
        let body = response.text().await.map_err(|e| {
            AppError::UpstreamRequest(format!("Weather response could not be read: {}", e))
        })?;
        parse_forecast(&body)
    }
}

/// Parse a 7Timer! ASTRO JSON document into forecast samples.
pub fn parse_forecast(body: &str) -> Result<Vec<ForecastSample>, AppError> {
    let response: AstroResponse = serde_json::from_str(body).map_err(|e| {
        AppError::MalformedResponse(format!("Weather response structure error: {}", e))
    })?;

    Ok(response
        .dataseries
        .into_iter()
        .map(|p| ForecastSample {
            hour_of_day: (p.timepoint % 24) as u8,
            cloud_cover: p.cloudcover,
            seeing: p.seeing,
            transparency: p.transparency,
            precipitation: p
                .prec_type
                .as_deref()
                .map(PrecipitationKind::from_code)
                .unwrap_or(PrecipitationKind::None),
        })
        .collect())
}
