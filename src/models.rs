//! Domain records shared between the upstream clients and the scoring services.
//!
//! Both upstream clients decode their JSON into private response structs and
//! map into these types, so the scoring code never sees wire formats.

use std::fmt;

/// Precipitation reported for a forecast sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationKind {
    None,
    Rain,
    Snow,
    /// Freezing rain, ice pellets or anything else the provider reports.
    Other,
}

impl PrecipitationKind {
    /// Map the provider's `prec_type` string.
    pub fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "none" => PrecipitationKind::None,
            "rain" => PrecipitationKind::Rain,
            "snow" => PrecipitationKind::Snow,
            _ => PrecipitationKind::Other,
        }
    }

    /// Whether this kind rules out observing outright.
    pub fn is_wet(self) -> bool {
        matches!(self, PrecipitationKind::Rain | PrecipitationKind::Snow)
    }
}

/// One forecast point of the atmospheric time series.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Hour of day, 0–23.
    pub hour_of_day: u8,
    /// 1 (clear) to 9 (overcast)
    pub cloud_cover: f64,
    /// 1 to 8, higher is steadier air
    pub seeing: f64,
    /// 1 to 8, higher is clearer sky
    pub transparency: f64,
    pub precipitation: PrecipitationKind,
}

/// Distance of a body from Earth, as reported upstream (unparsed strings).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceFromEarth {
    pub au: Option<String>,
    pub km: Option<String>,
}

impl fmt::Display for DistanceFromEarth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.au, &self.km) {
            (Some(au), _) => write!(f, "{} AU", au),
            (None, Some(km)) => write!(f, "{} km", km),
            (None, None) => write!(f, "unknown"),
        }
    }
}

/// Horizontal position of one body at one sampled hour.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPositionSample {
    pub body_name: String,
    /// Hour of day the position was computed for, 0–23.
    pub hour: u8,
    /// Degrees above the horizon; negative means below.
    pub altitude_deg: f64,
    /// Compass bearing in degrees, 0 = north.
    pub azimuth_deg: f64,
    /// Apparent magnitude, absent for bodies the provider has no value for.
    pub magnitude: Option<f64>,
    pub constellation: String,
    pub distance_from_earth: DistanceFromEarth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precipitation_from_code() {
        assert_eq!(PrecipitationKind::from_code("none"), PrecipitationKind::None);
        assert_eq!(PrecipitationKind::from_code("rain"), PrecipitationKind::Rain);
        assert_eq!(PrecipitationKind::from_code("Snow"), PrecipitationKind::Snow);
        assert_eq!(PrecipitationKind::from_code("frzr"), PrecipitationKind::Other);
        assert_eq!(PrecipitationKind::from_code("icep"), PrecipitationKind::Other);
    }

    #[test]
    fn test_only_rain_and_snow_are_wet() {
        assert!(PrecipitationKind::Rain.is_wet());
        assert!(PrecipitationKind::Snow.is_wet());
        assert!(!PrecipitationKind::None.is_wet());
        assert!(!PrecipitationKind::Other.is_wet());
    }

    #[test]
    fn test_distance_display() {
        let d = DistanceFromEarth {
            au: Some("4.21".to_string()),
            km: Some("629800000".to_string()),
        };
        assert_eq!(d.to_string(), "4.21 AU");

        let d = DistanceFromEarth {
            au: None,
            km: Some("384400".to_string()),
        };
        assert_eq!(d.to_string(), "384400 km");
        assert_eq!(DistanceFromEarth::default().to_string(), "unknown");
    }
}
