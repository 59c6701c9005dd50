//! Nightly aggregation of hourly position samples.
//!
//! Every sample is rated as it arrives and appended to its body's hourly
//! history. [`NightAggregator::finalize`] then folds each history into a
//! single [`NightlyBodyRecord`]; it only reads the histories, so calling it
//! again gives the same records.
//!
//! Bodies are kept in first-seen order and every tie (equal peak altitude,
//! equal best tier, equal ranking key) resolves to the earliest entry.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{BodyPositionSample, DistanceFromEarth};
use crate::services::visibility::{rate_visibility, TelescopeProfile, Tier};

/// Upper bound on sampled hours per night, whatever the configured window.
pub const MAX_OBSERVATION_HOURS: usize = 12;

/// Magnitude assumed for ranking when the provider has none.
const UNKNOWN_MAGNITUDE_SCORE: f64 = 15.0;
/// Largest score reduction granted for altitude.
const MAX_ALTITUDE_BONUS: f64 = 5.0;

/// Which records make it into the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Everything, including challenging and never-visible bodies.
    Verbose,
    /// Only bodies whose best tier is fair or better.
    Terse,
}

impl FromStr for OutputMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(OutputMode::Verbose),
            "terse" => Ok(OutputMode::Terse),
            other => Err(AppError::Configuration(format!(
                "REPORT_MODE must be verbose or terse, got '{}'",
                other
            ))),
        }
    }
}

/// One rated hour of a body's history.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyEntry {
    pub hour: u8,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub tier: Tier,
    pub explanation: String,
}

/// Where and when a body stood highest during the night.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPosition {
    pub hour: u8,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

/// Nightly summary for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct NightlyBodyRecord {
    pub body_name: String,
    pub best_tier: Tier,
    pub best_explanation: String,
    pub magnitude: Option<f64>,
    pub constellation: String,
    pub distance_from_earth: DistanceFromEarth,
    /// `None` when the body never rose above the horizon.
    pub peak: Option<PeakPosition>,
    pub visible_hour_count: usize,
    pub total_hour_count: usize,
}

/// Accumulated samples for one body. Representative fields come from the
/// first sample seen.
#[derive(Debug, Clone)]
struct BodyHistory {
    body_name: String,
    magnitude: Option<f64>,
    constellation: String,
    distance_from_earth: DistanceFromEarth,
    hourly: Vec<HourlyEntry>,
}

/// Hours to sample: from `start_hour`, one step at a time (wrapping 23 → 0),
/// up to and including `end_hour`, never more than [`MAX_OBSERVATION_HOURS`].
pub fn observation_hours(start_hour: u8, end_hour: u8) -> Vec<u8> {
    let stop = (end_hour + 1) % 24;
    let mut hours = Vec::new();
    let mut current = start_hour;
    loop {
        hours.push(current);
        current = (current + 1) % 24;
        if current == stop || hours.len() >= MAX_OBSERVATION_HOURS {
            break;
        }
    }
    hours
}

/// Ranking score within a tier; lower is an easier, more rewarding target.
pub fn viewability_score(record: &NightlyBodyRecord) -> f64 {
    let mut score = record.magnitude.unwrap_or(UNKNOWN_MAGNITUDE_SCORE);

    if let Some(peak) = record.peak {
        score -= (peak.altitude_deg / 10.0).min(MAX_ALTITUDE_BONUS);
    }

    score
        - match record.body_name.to_lowercase().as_str() {
            "moon" => 15.0,
            "saturn" => 3.0,
            "jupiter" => 2.0,
            "mars" => 1.0,
            _ => 0.0,
        }
}

/// Sort by best tier, then by viewability score. The sort is stable, so
/// equal keys keep first-seen order.
pub fn rank_records(records: &mut [NightlyBodyRecord]) {
    records.sort_by(|a, b| {
        a.best_tier.cmp(&b.best_tier).then_with(|| {
            viewability_score(a)
                .partial_cmp(&viewability_score(b))
                .unwrap_or(Ordering::Equal)
        })
    });
}

/// Drop records the output mode does not report.
pub fn filter_for_mode(records: Vec<NightlyBodyRecord>, mode: OutputMode) -> Vec<NightlyBodyRecord> {
    match mode {
        OutputMode::Verbose => records,
        OutputMode::Terse => records
            .into_iter()
            .filter(|r| r.best_tier <= Tier::Fair)
            .collect(),
    }
}

/// Per-body accumulation table for one night.
#[derive(Debug, Clone)]
pub struct NightAggregator {
    profile: TelescopeProfile,
    bodies: Vec<BodyHistory>,
    index: HashMap<String, usize>,
}

impl NightAggregator {
    pub fn new(profile: TelescopeProfile) -> Self {
        Self {
            profile,
            bodies: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rate a sample and append it to its body's history.
    pub fn record(&mut self, sample: &BodyPositionSample) {
        let rating = rate_visibility(sample, &self.profile);

        let idx = match self.index.get(&sample.body_name) {
            Some(&idx) => idx,
            None => {
                self.bodies.push(BodyHistory {
                    body_name: sample.body_name.clone(),
                    magnitude: sample.magnitude,
                    constellation: sample.constellation.clone(),
                    distance_from_earth: sample.distance_from_earth.clone(),
                    hourly: Vec::new(),
                });
                self.index
                    .insert(sample.body_name.clone(), self.bodies.len() - 1);
                self.bodies.len() - 1
            }
        };

        self.bodies[idx].hourly.push(HourlyEntry {
            hour: sample.hour,
            altitude_deg: sample.altitude_deg,
            azimuth_deg: sample.azimuth_deg,
            tier: rating.tier,
            explanation: rating.explanation,
        });
    }

    pub fn record_all<'a, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = &'a BodyPositionSample>,
    {
        for sample in samples {
            self.record(sample);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Fold every body's history into a nightly record, in first-seen order.
    pub fn finalize(&self) -> Vec<NightlyBodyRecord> {
        self.bodies.iter().map(finalize_body).collect()
    }

    /// Finalize, apply the output mode and rank for display.
    pub fn summarize(&self, mode: OutputMode) -> Vec<NightlyBodyRecord> {
        let mut records = filter_for_mode(self.finalize(), mode);
        rank_records(&mut records);
        records
    }
}

fn finalize_body(body: &BodyHistory) -> NightlyBodyRecord {
    let visible: Vec<&HourlyEntry> = body
        .hourly
        .iter()
        .filter(|h| h.altitude_deg > 0.0)
        .collect();

    let mut record = NightlyBodyRecord {
        body_name: body.body_name.clone(),
        best_tier: Tier::NotVisible,
        best_explanation: "below horizon all evening".to_string(),
        magnitude: body.magnitude,
        constellation: body.constellation.clone(),
        distance_from_earth: body.distance_from_earth.clone(),
        peak: None,
        visible_hour_count: visible.len(),
        total_hour_count: body.hourly.len(),
    };

    let Some((&first, rest)) = visible.split_first() else {
        return record;
    };

    // Strict comparisons keep the earliest entry on ties.
    let mut peak = first;
    let mut best = first;
    for &entry in rest {
        if entry.altitude_deg > peak.altitude_deg {
            peak = entry;
        }
        if entry.tier < best.tier {
            best = entry;
        }
    }

    record.best_tier = best.tier;
    record.best_explanation = best.explanation.clone();
    record.peak = Some(PeakPosition {
        hour: peak.hour,
        altitude_deg: peak.altitude_deg,
        azimuth_deg: peak.azimuth_deg,
    });
    record
}
