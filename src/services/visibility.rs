//! Per-sample visibility rating.
//!
//! Scores one body's horizontal position against what the configured
//! telescope can resolve. Pure functions only; the night aggregator calls
//! [`rate_visibility`] once per (body, hour) sample.

use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::BodyPositionSample;

/// Bodies above this altitude are rated excellent.
const EXCELLENT_ALTITUDE_DEG: f64 = 45.0;
/// Bodies above this altitude are rated good.
const GOOD_ALTITUDE_DEG: f64 = 30.0;
/// Magnitudes above this are "relatively faint" and lose a tier.
const FAINT_MAGNITUDE: f64 = 5.0;

/// Viewing favourability, most favourable first.
///
/// The derived `Ord` follows declaration order, so `min()` over tiers picks
/// the best one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Excellent,
    Good,
    Fair,
    Poor,
    TooFaint,
    NotVisible,
}

impl Tier {
    /// Poor and too-faint bodies are reported together as "challenging".
    pub fn is_challenging(self) -> bool {
        matches!(self, Tier::Poor | Tier::TooFaint)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Fair => "fair",
            Tier::Poor => "poor",
            Tier::TooFaint => "too-faint",
            Tier::NotVisible => "not-visible",
        };
        f.write_str(s)
    }
}

/// Telescope class selected in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelescopeLevel {
    Entry,
    Intermediate,
    Advanced,
}

impl TelescopeLevel {
    pub fn profile(self) -> TelescopeProfile {
        match self {
            TelescopeLevel::Entry => TelescopeProfile {
                max_magnitude: 10.0,
                min_altitude_deg: 15.0,
                label: "Entry-level telescope (60-80mm aperture)",
            },
            TelescopeLevel::Intermediate => TelescopeProfile {
                max_magnitude: 12.0,
                min_altitude_deg: 10.0,
                label: "Intermediate telescope (100-150mm aperture)",
            },
            TelescopeLevel::Advanced => TelescopeProfile {
                max_magnitude: 14.0,
                min_altitude_deg: 5.0,
                label: "Advanced telescope (200mm+ aperture)",
            },
        }
    }
}

impl FromStr for TelescopeLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entry" => Ok(TelescopeLevel::Entry),
            "intermediate" => Ok(TelescopeLevel::Intermediate),
            "advanced" => Ok(TelescopeLevel::Advanced),
            other => Err(AppError::Configuration(format!(
                "TELESCOPE_LEVEL must be entry, intermediate or advanced, got '{}'",
                other
            ))),
        }
    }
}

/// What a telescope class can show.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeProfile {
    /// Faintest magnitude still worth pointing at.
    pub max_magnitude: f64,
    /// Below this altitude the view is too turbulent.
    pub min_altitude_deg: f64,
    pub label: &'static str,
}

/// Rating of a single position sample.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityRating {
    pub tier: Tier,
    pub explanation: String,
}

impl VisibilityRating {
    fn new(tier: Tier, explanation: &str) -> Self {
        Self {
            tier,
            explanation: explanation.to_string(),
        }
    }
}

/// Rate one sample against a telescope profile. First matching rule wins:
/// below horizon, too low, too faint, then altitude bands with a
/// brightness refinement.
pub fn rate_visibility(sample: &BodyPositionSample, profile: &TelescopeProfile) -> VisibilityRating {
    let altitude = sample.altitude_deg;

    if altitude < 0.0 {
        return VisibilityRating::new(Tier::NotVisible, "below horizon");
    }
    if altitude < profile.min_altitude_deg {
        return VisibilityRating::new(Tier::Poor, "too low on horizon");
    }
    if let Some(mag) = sample.magnitude {
        if mag > profile.max_magnitude {
            return VisibilityRating::new(Tier::TooFaint, "too faint for this telescope");
        }
    }

    let mut rating = if altitude > EXCELLENT_ALTITUDE_DEG {
        VisibilityRating::new(
            Tier::Excellent,
            "high in sky, minimal atmospheric interference",
        )
    } else if altitude > GOOD_ALTITUDE_DEG {
        VisibilityRating::new(Tier::Good, "good viewing angle")
    } else {
        VisibilityRating::new(Tier::Fair, "viewable but lower in sky")
    };

    match sample.magnitude {
        Some(mag) if mag < 0.0 => rating.explanation.push_str(", very bright"),
        Some(mag) if mag > FAINT_MAGNITUDE => {
            rating.tier = if rating.tier == Tier::Excellent {
                Tier::Good
            } else {
                Tier::Fair
            };
            rating.explanation.push_str(", relatively faint");
        }
        _ => {}
    }

    rating
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistanceFromEarth;

    fn sample(altitude_deg: f64, magnitude: Option<f64>) -> BodyPositionSample {
        BodyPositionSample {
            body_name: "Vega".to_string(),
            hour: 22,
            altitude_deg,
            azimuth_deg: 180.0,
            magnitude,
            constellation: "Lyra".to_string(),
            distance_from_earth: DistanceFromEarth::default(),
        }
    }

    fn profile(max_magnitude: f64) -> TelescopeProfile {
        TelescopeProfile {
            max_magnitude,
            min_altitude_deg: 15.0,
            label: "test",
        }
    }

    #[test]
    fn test_tier_order() {
        assert!(Tier::Excellent < Tier::Good);
        assert!(Tier::Good < Tier::Fair);
        assert!(Tier::Fair < Tier::Poor);
        assert!(Tier::Poor < Tier::TooFaint);
        assert!(Tier::TooFaint < Tier::NotVisible);
        assert!(Tier::Poor.is_challenging());
        assert!(Tier::TooFaint.is_challenging());
        assert!(!Tier::Fair.is_challenging());
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(Tier::TooFaint.to_string(), "too-faint");
        assert_eq!(Tier::NotVisible.to_string(), "not-visible");
    }

    #[test]
    fn test_below_horizon_for_every_profile() {
        for level in [
            TelescopeLevel::Entry,
            TelescopeLevel::Intermediate,
            TelescopeLevel::Advanced,
        ] {
            let r = rate_visibility(&sample(-1.0, Some(-3.0)), &level.profile());
            assert_eq!(r.tier, Tier::NotVisible);
            assert_eq!(r.explanation, "below horizon");
        }
    }

    #[test]
    fn test_too_low_on_horizon() {
        let r = rate_visibility(&sample(10.0, Some(20.0)), &profile(10.0));
        // altitude is checked before faintness
        assert_eq!(r.tier, Tier::Poor);
        assert_eq!(r.explanation, "too low on horizon");
    }

    #[test]
    fn test_too_faint() {
        let r = rate_visibility(&sample(60.0, Some(11.0)), &profile(10.0));
        assert_eq!(r.tier, Tier::TooFaint);
    }

    #[test]
    fn test_high_and_ordinary_brightness_is_excellent() {
        let r = rate_visibility(&sample(50.0, Some(1.0)), &profile(10.0));
        assert_eq!(r.tier, Tier::Excellent);
        assert_eq!(r.explanation, "high in sky, minimal atmospheric interference");
    }

    #[test]
    fn test_faint_downgrades_excellent_to_good() {
        let r = rate_visibility(&sample(50.0, Some(6.0)), &profile(10.0));
        assert_eq!(r.tier, Tier::Good);
        assert!(r.explanation.ends_with(", relatively faint"));
    }

    #[test]
    fn test_faint_downgrades_good_to_fair() {
        let r = rate_visibility(&sample(40.0, Some(6.0)), &profile(10.0));
        assert_eq!(r.tier, Tier::Fair);
        assert_eq!(r.explanation, "good viewing angle, relatively faint");
    }

    #[test]
    fn test_very_bright_keeps_tier() {
        let r = rate_visibility(&sample(35.0, Some(-2.5)), &profile(10.0));
        assert_eq!(r.tier, Tier::Good);
        assert_eq!(r.explanation, "good viewing angle, very bright");
    }

    #[test]
    fn test_exactly_45_degrees_is_good() {
        let r = rate_visibility(&sample(45.0, None), &profile(10.0));
        assert_eq!(r.tier, Tier::Good);
    }

    #[test]
    fn test_missing_magnitude_never_downgrades() {
        let r = rate_visibility(&sample(20.0, None), &profile(10.0));
        assert_eq!(r.tier, Tier::Fair);
        assert_eq!(r.explanation, "viewable but lower in sky");

        let r = rate_visibility(&sample(80.0, None), &profile(1.0));
        assert_eq!(r.tier, Tier::Excellent);
    }

    #[test]
    fn test_parse_telescope_level() {
        assert_eq!(
            "intermediate".parse::<TelescopeLevel>().unwrap(),
            TelescopeLevel::Intermediate
        );
        assert_eq!("ENTRY".parse::<TelescopeLevel>().unwrap(), TelescopeLevel::Entry);
        assert!("huge".parse::<TelescopeLevel>().is_err());
    }

    #[test]
    fn test_profiles() {
        let entry = TelescopeLevel::Entry.profile();
        assert_eq!(entry.max_magnitude, 10.0);
        assert_eq!(entry.min_altitude_deg, 15.0);
        assert_eq!(TelescopeLevel::Intermediate.profile().min_altitude_deg, 10.0);
        assert_eq!(TelescopeLevel::Advanced.profile().max_magnitude, 14.0);
    }
}
