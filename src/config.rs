use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;
use crate::services::night::OutputMode;
use crate::services::visibility::{TelescopeLevel, TelescopeProfile};

const DEFAULT_WEATHER_API_URL: &str = "https://www.7timer.info";
const DEFAULT_ASTRONOMY_API_URL: &str = "https://api.astronomyapi.com";
const DEFAULT_EVENING_START_HOUR: u8 = 21;
const DEFAULT_EVENING_END_HOUR: u8 = 2;

/// Application configuration, parsed from environment variables.
///
/// Built once at startup and passed by reference; nothing reads the
/// environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_id: String,
    pub app_secret: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Observer elevation in metres.
    pub elevation: f64,
    pub telescope_level: TelescopeLevel,
    pub evening_start_hour: u8,
    pub evening_end_hour: u8,
    pub output_mode: OutputMode,
    pub weather_api_url: String,
    pub astronomy_api_url: String,
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. Variables already set in the environment win. A
/// missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (app_id, app_secret) = match (
            get("ASTRONOMY_API_APP_ID"),
            get("ASTRONOMY_API_APP_SECRET"),
        ) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(AppError::Configuration(
                    "ASTRONOMY_API_APP_ID and ASTRONOMY_API_APP_SECRET must be set".to_string(),
                ))
            }
        };

        let latitude = parse_coordinate("LATITUDE", get("LATITUDE"))?;
        let longitude = parse_coordinate("LONGITUDE", get("LONGITUDE"))?;
        let elevation = parse_coordinate("ELEVATION", get("ELEVATION"))?;

        let telescope_level = match get("TELESCOPE_LEVEL") {
            Some(v) => TelescopeLevel::from_str(&v)?,
            None => TelescopeLevel::Entry,
        };
        let output_mode = match get("REPORT_MODE") {
            Some(v) => OutputMode::from_str(&v)?,
            None => OutputMode::Verbose,
        };

        Ok(Self {
            app_id,
            app_secret,
            latitude,
            longitude,
            elevation,
            telescope_level,
            evening_start_hour: parse_hour(
                "EVENING_START_HOUR",
                get("EVENING_START_HOUR"),
                DEFAULT_EVENING_START_HOUR,
            )?,
            evening_end_hour: parse_hour(
                "EVENING_END_HOUR",
                get("EVENING_END_HOUR"),
                DEFAULT_EVENING_END_HOUR,
            )?,
            output_mode,
            weather_api_url: get("WEATHER_API_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string()),
            astronomy_api_url: get("ASTRONOMY_API_URL")
                .unwrap_or_else(|| DEFAULT_ASTRONOMY_API_URL.to_string()),
        })
    }

    pub fn telescope(&self) -> TelescopeProfile {
        self.telescope_level.profile()
    }
}

fn parse_coordinate(key: &str, value: Option<String>) -> Result<f64, AppError> {
    let raw = value.ok_or_else(|| AppError::Configuration(format!("{} must be set", key)))?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::Configuration(format!(
            "{} must be a number, got '{}'",
            key, raw
        ))),
    }
}

fn parse_hour(key: &str, value: Option<String>, default: u8) -> Result<u8, AppError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.parse::<u8>() {
        Ok(h) if h <= 23 => Ok(h),
        _ => Err(AppError::Configuration(format!(
            "{} must be an hour between 0 and 23, got '{}'",
            key, raw
        ))),
    }
}
