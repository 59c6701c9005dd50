//! Console report rendering.
//!
//! Turns a [`NightPlan`] into the text printed on stdout. Nothing here
//! decides anything; tiers, ranking and filtering are already applied.

use std::fmt::{self, Write};

use crate::config::AppConfig;
use crate::helpers::{compass_direction, f64_to_decimal_1dp, format_hour_display, format_magnitude};
use crate::services::night::{NightlyBodyRecord, OutputMode};
use crate::services::planner::NightPlan;
use crate::services::visibility::Tier;
use crate::services::weather::WeatherVerdict;

const RULE_WIDTH: usize = 70;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Render the full report.
pub fn render_report(config: &AppConfig, plan: &NightPlan) -> String {
    let mut out = String::new();
    if let Err(e) = write_report(&mut out, config, plan) {
        tracing::error!("Report rendering stopped early: {}", e);
    }
    out
}

/// Write the full report into any formatter sink.
fn write_report<W: Write>(out: &mut W, config: &AppConfig, plan: &NightPlan) -> fmt::Result {
    let telescope = config.telescope();

    writeln!(out, "{}", heavy_rule())?;
    writeln!(out, "TELESCOPE VIEWING TARGETS")?;
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out, "Date: {}", plan.date.format("%Y-%m-%d"))?;
    writeln!(
        out,
        "Location: {}, {} ({}m elevation)",
        config.latitude, config.longitude, config.elevation
    )?;
    writeln!(out, "Telescope: {}", telescope.label)?;
    writeln!(
        out,
        "Time Range: {}:00 - {}:00",
        config.evening_start_hour, config.evening_end_hour
    )?;
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out)?;

    write_weather(out, plan)?;

    if !plan.failed_hours.is_empty() {
        let hours: Vec<String> = plan
            .failed_hours
            .iter()
            .map(|h| format!("{:02}:00", h))
            .collect();
        writeln!(
            out,
            "Note: no position data for {} ({} of {} hours checked)",
            hours.join(", "),
            hours.len(),
            plan.hours_checked.len()
        )?;
        writeln!(out)?;
    }

    write_targets(out, &plan.targets, config.output_mode)?;

    writeln!(out, "{}", heavy_rule())?;
    match &plan.verdict {
        Some(v) if !v.worth_observing => {
            writeln!(out, "TIP: Check back later - weather conditions may improve!")?
        }
        _ => writeln!(
            out,
            "TIP: Start with the highest-rated targets when you first go outside!"
        )?,
    }
    writeln!(out, "{}", heavy_rule())
}

fn write_weather<W: Write>(out: &mut W, plan: &NightPlan) -> fmt::Result {
    match (&plan.verdict, &plan.weather_error) {
        (Some(verdict), _) => write_verdict(out, verdict),
        (None, Some(err)) => {
            writeln!(out, "Warning: Could not fetch weather data: {}", err)?;
            writeln!(out, "Continuing with celestial object analysis...")?;
            writeln!(out)
        }
        (None, None) => {
            writeln!(
                out,
                "Warning: The forecast has no data for tonight's observation window."
            )?;
            writeln!(out, "Continuing with celestial object analysis...")?;
            writeln!(out)
        }
    }
}

fn write_verdict<W: Write>(out: &mut W, verdict: &WeatherVerdict) -> fmt::Result {
    writeln!(out, "WEATHER CONDITIONS FOR TONIGHT:")?;
    writeln!(out, "{}", light_rule())?;
    writeln!(
        out,
        "Overall Quality: {}",
        verdict.quality.to_string().to_uppercase()
    )?;
    writeln!(
        out,
        "Cloud Cover: {}/9 (1=clear, 9=overcast)",
        verdict.averages.cloud_cover.round()
    )?;
    writeln!(
        out,
        "Atmospheric Seeing: {}/8 (higher is better)",
        f64_to_decimal_1dp(verdict.averages.seeing)
    )?;
    writeln!(
        out,
        "Transparency: {}/8 (higher is better)",
        f64_to_decimal_1dp(verdict.averages.transparency)
    )?;
    if verdict.has_precipitation {
        writeln!(out, "Precipitation: Expected")?;
    }
    writeln!(out, "Conditions: {}", verdict.reasons.join(", "))?;
    writeln!(out)?;

    if verdict.worth_observing {
        writeln!(out, "VIEWING RECOMMENDATION: GO OUTSIDE!")?;
        writeln!(
            out,
            "Weather conditions are favorable for telescope viewing tonight."
        )?;
    } else {
        writeln!(out, "VIEWING RECOMMENDATION: NOT RECOMMENDED")?;
        writeln!(
            out,
            "Tonight's weather conditions are not suitable for telescope viewing."
        )?;
        writeln!(
            out,
            "However, here's what would be visible in the sky if conditions improve:"
        )?;
    }
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out)
}

fn write_targets<W: Write>(
    out: &mut W,
    targets: &[NightlyBodyRecord],
    mode: OutputMode,
) -> fmt::Result {
    let excellent = in_tier(targets, Tier::Excellent);
    if !excellent.is_empty() {
        writeln!(out, "EXCELLENT TARGETS:")?;
        writeln!(out, "{}", light_rule())?;
        for t in excellent {
            write_detailed(out, t, true)?;
            writeln!(out, "  Constellation: {}", t.constellation)?;
            writeln!(out, "  Distance: {}", t.distance_from_earth)?;
            writeln!(
                out,
                "  Visible: {}/{} hours checked",
                t.visible_hour_count, t.total_hour_count
            )?;
            writeln!(out, "  Why it's great: {}", t.best_explanation)?;
        }
        writeln!(out)?;
    }

    let good = in_tier(targets, Tier::Good);
    if !good.is_empty() {
        writeln!(out, "GOOD TARGETS:")?;
        writeln!(out, "{}", light_rule())?;
        for t in good {
            write_detailed(out, t, true)?;
            writeln!(
                out,
                "  Visible: {}/{} hours checked",
                t.visible_hour_count, t.total_hour_count
            )?;
            writeln!(out, "  Note: {}", t.best_explanation)?;
        }
        writeln!(out)?;
    }

    let fair = in_tier(targets, Tier::Fair);
    if !fair.is_empty() {
        writeln!(out, "FAIR TARGETS:")?;
        writeln!(out, "{}", light_rule())?;
        for t in fair {
            write_detailed(out, t, false)?;
            writeln!(out, "  Note: {}", t.best_explanation)?;
        }
        writeln!(out)?;
    }

    if mode == OutputMode::Terse {
        return Ok(());
    }

    let challenging: Vec<&NightlyBodyRecord> = targets
        .iter()
        .filter(|t| t.best_tier.is_challenging())
        .collect();
    if !challenging.is_empty() {
        writeln!(out, "CHALLENGING (not recommended for your telescope):")?;
        writeln!(out, "{}", light_rule())?;
        for t in challenging {
            writeln!(out, "  {}: {}", t.body_name, t.best_explanation)?;
        }
        writeln!(out)?;
    }

    let not_visible: Vec<&str> = in_tier(targets, Tier::NotVisible)
        .into_iter()
        .map(|t| t.body_name.as_str())
        .collect();
    if !not_visible.is_empty() {
        writeln!(out, "NOT VISIBLE TONIGHT:")?;
        writeln!(out, "{}", light_rule())?;
        writeln!(out, "  {}", not_visible.join(", "))?;
        writeln!(out)?;
    }
    Ok(())
}

fn in_tier(targets: &[NightlyBodyRecord], tier: Tier) -> Vec<&NightlyBodyRecord> {
    targets.iter().filter(|t| t.best_tier == tier).collect()
}

/// Name, peak time and position lines shared by the detailed sections.
fn write_detailed<W: Write>(
    out: &mut W,
    t: &NightlyBodyRecord,
    with_direction: bool,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", t.body_name)?;
    if let Some(peak) = t.peak {
        writeln!(
            out,
            "  Best viewing: {} ({:.1}° altitude)",
            format_hour_display(peak.hour),
            peak.altitude_deg
        )?;
        if with_direction {
            writeln!(
                out,
                "  Direction: {} ({:.1}°)",
                compass_direction(peak.azimuth_deg),
                peak.azimuth_deg
            )?;
        }
    }
    writeln!(out, "  Magnitude: {}", format_magnitude(t.magnitude))
}
