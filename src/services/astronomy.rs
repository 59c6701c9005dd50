//! Astronomy API body-positions client.
//!
//! One authenticated request per sampled hour returns the horizontal
//! position, magnitude and constellation of every solar-system body.
//! See: https://docs.astronomyapi.com/endpoints/bodies/positions

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::helpers::format_api_time;
use crate::models::{BodyPositionSample, DistanceFromEarth};

const POSITIONS_PATH: &str = "/api/v2/bodies/positions";

/// Body ids never worth reporting: the Sun is dangerous to point at and the
/// Earth is where we stand.
const EXCLUDED_BODY_IDS: [&str; 2] = ["sun", "earth"];

/// Client for the Astronomy API positions endpoint.
#[derive(Debug, Clone)]
pub struct AstronomyClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

/// Observer location sent with every positions request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

// --- Astronomy API JSON response types ---

#[derive(Debug, Deserialize)]
struct PositionsResponse {
    data: PositionsData,
}

#[derive(Debug, Deserialize)]
struct PositionsData {
    table: PositionsTable,
}

#[derive(Debug, Deserialize)]
struct PositionsTable {
    rows: Vec<PositionsRow>,
}

#[derive(Debug, Deserialize)]
struct PositionsRow {
    cells: Vec<BodyCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyCell {
    id: String,
    name: String,
    #[serde(default)]
    distance: Option<CellDistance>,
    position: CellPosition,
    #[serde(default)]
    extra_info: Option<CellExtraInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellDistance {
    from_earth: Option<CellFromEarth>,
}

#[derive(Debug, Deserialize)]
struct CellFromEarth {
    au: Option<String>,
    km: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CellPosition {
    horizontal: CellHorizontal,
    constellation: CellConstellation,
}

#[derive(Debug, Deserialize)]
struct CellHorizontal {
    altitude: CellAngle,
    azimuth: CellAngle,
}

#[derive(Debug, Deserialize)]
struct CellAngle {
    degrees: String,
}

#[derive(Debug, Deserialize)]
struct CellConstellation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CellExtraInfo {
    magnitude: Option<f64>,
}

impl AstronomyClient {
    pub fn new(base_url: &str, app_id: &str, app_secret: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
        })
    }

    /// Fetch the positions of all reportable bodies at `hour` on `date`.
    pub async fn fetch_positions(
        &self,
        observer: &Observer,
        date: NaiveDate,
        hour: u8,
    ) -> Result<Vec<BodyPositionSample>, AppError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let url = format!(
            "{}{}?latitude={}&longitude={}&elevation={}&from_date={}&to_date={}&time={}",
            self.base_url,
            POSITIONS_PATH,
            observer.latitude,
            observer.longitude,
            observer.elevation,
            date_str,
            date_str,
            format_api_time(hour)
        );
        tracing::debug!("Fetching body positions from {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .send()
            .await
            .map_err(|e| AppError::UpstreamRequest(format!("Positions request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamRequest(format!(
                "API request failed with status {}: {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::UpstreamRequest(format!("Positions response could not be read: {}", e))
        })?;
        parse_positions(&body, hour)
    }
}

fn parse_degrees(body: &str, field: &str, raw: &str) -> Result<f64, AppError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::MalformedResponse(format!(
            "{} {} is not a number: '{}'",
            body, field, raw
        ))),
    }
}

/// Parse a positions JSON document, dropping excluded bodies.
pub fn parse_positions(body: &str, hour: u8) -> Result<Vec<BodyPositionSample>, AppError> {
    let response: PositionsResponse = serde_json::from_str(body).map_err(|e| {
        AppError::MalformedResponse(format!("Positions response structure error: {}", e))
    })?;

    let mut samples = Vec::with_capacity(response.data.table.rows.len());
    for row in response.data.table.rows {
        let Some(cell) = row.cells.into_iter().next() else {
            continue;
        };
        if EXCLUDED_BODY_IDS.contains(&cell.id.to_lowercase().as_str()) {
            continue;
        }

        let horizontal = &cell.position.horizontal;
        let altitude_deg = parse_degrees(&cell.name, "altitude", &horizontal.altitude.degrees)?;
        let azimuth_deg = parse_degrees(&cell.name, "azimuth", &horizontal.azimuth.degrees)?;
        let distance_from_earth = cell
            .distance
            .and_then(|d| d.from_earth)
            .map(|d| DistanceFromEarth { au: d.au, km: d.km })
            .unwrap_or_default();

        samples.push(BodyPositionSample {
            body_name: cell.name,
            hour,
            altitude_deg,
            azimuth_deg,
            magnitude: cell.extra_info.and_then(|e| e.magnitude),
            constellation: cell.position.constellation.name,
            distance_from_earth,
        });
    }

    Ok(samples)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Build one table row in the shape the positions endpoint returns.
    pub(crate) fn body_row(
        id: &str,
        name: &str,
        altitude: f64,
        azimuth: f64,
        magnitude: Option<f64>,
    ) -> serde_json::Value {
        serde_json::json!({
            "entry": { "id": id, "name": name },
            "cells": [{
                "date": "2026-10-19T21:00:00.000+00:00",
                "id": id,
                "name": name,
                "distance": {
                    "fromEarth": { "au": "4.21", "km": "629800000" }
                },
                "position": {
                    "horizontal": {
                        "altitude": { "degrees": format!("{:.2}", altitude), "string": "" },
                        "azimuth": { "degrees": format!("{:.2}", azimuth), "string": "" }
                    },
                    "equatorial": {
                        "rightAscension": { "hours": "4.5", "string": "" },
                        "declination": { "degrees": "21.3", "string": "" }
                    },
                    "constellation": { "id": "tau", "short": "Tau", "name": "Taurus" }
                },
                "extraInfo": {
                    "elongation": 120.5,
                    "magnitude": magnitude
                }
            }]
        })
    }

    pub(crate) fn positions_json(rows: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "dates": { "from": "2026-10-19T21:00:00.000+00:00", "to": "2026-10-19T21:00:00.000+00:00" },
                "observer": { "location": { "longitude": 8.54, "latitude": 47.37, "elevation": 408 } },
                "table": {
                    "header": ["2026-10-19T21:00:00.000+00:00"],
                    "rows": rows
                }
            }
        })
    }

    fn observer() -> Observer {
        Observer {
            latitude: 47.37,
            longitude: 8.54,
            elevation: 408.0,
        }
    }

    #[test]
    fn test_parse_positions_skips_sun_and_earth() {
        let json = positions_json(vec![
            body_row("sun", "Sun", -30.0, 300.0, Some(-26.7)),
            body_row("earth", "Earth", 0.0, 0.0, None),
            body_row("jupiter", "Jupiter", 35.5, 120.25, Some(-2.5)),
            body_row("pluto", "Pluto", 12.0, 200.0, None),
        ]);

        let samples = parse_positions(&json.to_string(), 22).unwrap();
        assert_eq!(samples.len(), 2);

        let jupiter = &samples[0];
        assert_eq!(jupiter.body_name, "Jupiter");
        assert_eq!(jupiter.hour, 22);
        assert_eq!(jupiter.altitude_deg, 35.5);
        assert_eq!(jupiter.azimuth_deg, 120.25);
        assert_eq!(jupiter.magnitude, Some(-2.5));
        assert_eq!(jupiter.constellation, "Taurus");
        assert_eq!(jupiter.distance_from_earth.au.as_deref(), Some("4.21"));

        assert_eq!(samples[1].magnitude, None);
    }

    #[test]
    fn test_parse_positions_bad_degrees() {
        let mut json = positions_json(vec![body_row("mars", "Mars", 10.0, 10.0, Some(1.0))]);
        json["data"]["table"]["rows"][0]["cells"][0]["position"]["horizontal"]["altitude"]
            ["degrees"] = serde_json::json!("high");
        let err = parse_positions(&json.to_string(), 21).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
        assert!(err.to_string().contains("Mars"));
    }

    #[test]
    fn test_parse_positions_rejects_non_finite_degrees() {
        for (field, raw) in [("altitude", "NaN"), ("azimuth", "inf"), ("altitude", "-infinity")] {
            let mut json = positions_json(vec![body_row("saturn", "Saturn", 20.0, 180.0, Some(0.6))]);
            json["data"]["table"]["rows"][0]["cells"][0]["position"]["horizontal"][field]
                ["degrees"] = serde_json::json!(raw);
            let err = parse_positions(&json.to_string(), 21).unwrap_err();
            assert!(matches!(err, AppError::MalformedResponse(_)), "{} = {}", field, raw);
            assert!(err.to_string().contains("Saturn"));
        }
    }

    #[test]
    fn test_parse_positions_wrong_shape() {
        let err = parse_positions(r#"{"data":{}}"#, 21).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_positions_sends_credentials_and_time() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/bodies/positions"))
            // base64("app:secret")
            .and(header("authorization", "Basic YXBwOnNlY3JldA=="))
            .and(query_param("from_date", "2026-10-19"))
            .and(query_param("to_date", "2026-10-19"))
            .and(query_param("time", "09:00:00"))
            .and(query_param("elevation", "408"))
            .respond_with(ResponseTemplate::new(200).set_body_json(positions_json(vec![
                body_row("moon", "Moon", 40.0, 150.0, Some(-11.2)),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = AstronomyClient::new(&server.uri(), "app", "secret").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let samples = client.fetch_positions(&observer(), date, 9).await.unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].body_name, "Moon");
        assert_eq!(samples[0].hour, 9);
    }

    #[tokio::test]
    async fn test_fetch_positions_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .mount(&server)
            .await;

        let client = AstronomyClient::new(&server.uri(), "app", "wrong").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let err = client
            .fetch_positions(&observer(), date, 21)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UpstreamRequest(_)));
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid credentials"));
    }
}
