use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::AnalysisError;
use crate::models::analysis::DailySample;

/// Fill value the POWER archive substitutes for days without an observation.
/// Normalized to zero at ingestion: a missing day counts as zero
/// contribution, it is never interpolated or dropped.
pub const MISSING_SENTINEL: f64 = -999.0;

const WIRE_DATE_FORMAT: &str = "%Y%m%d";

// ─── Date-range contract ─────────────────────────────────────────────────────

/// Inclusive calendar range, carried as `NaiveDate` internally and formatted
/// `YYYYMMDD` only at the archive wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parses a `YYYYMMDD` pair, enforcing well-formed 8-digit calendar
    /// dates and `start <= end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, AnalysisError> {
        let start = parse_date_key(start)?;
        let end = parse_date_key(end)?;
        if start > end {
            return Err(AnalysisError::InvalidDateRange(format!(
                "start {} is after end {}",
                start.format(WIRE_DATE_FORMAT),
                end.format(WIRE_DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Trailing window ending today (UTC), both ends inclusive — the default
    /// the UI preloads.
    pub fn last_days(days: u32) -> Self {
        let end = Utc::now().date_naive();
        let start = end - chrono::Days::new(u64::from(days));
        Self { start, end }
    }

    fn wire(&self) -> (String, String) {
        (
            self.start.format(WIRE_DATE_FORMAT).to_string(),
            self.end.format(WIRE_DATE_FORMAT).to_string(),
        )
    }
}

fn parse_date_key(key: &str) -> Result<NaiveDate, AnalysisError> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AnalysisError::InvalidDateRange(format!(
            "expected YYYYMMDD, got {:?}",
            key
        )));
    }
    NaiveDate::parse_from_str(key, WIRE_DATE_FORMAT).map_err(|_| {
        AnalysisError::InvalidDateRange(format!("{} is not a calendar date", key))
    })
}

// ─── NASA POWER wire types ───────────────────────────────────────────────────

// Parameter maps arrive as date-keyed JSON objects. Collecting them into
// BTreeMaps makes the series ascending by construction — YYYYMMDD keys sort
// lexicographically in date order — instead of trusting upstream key order.

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
struct PowerParameters {
    /// All Sky Surface Shortwave Downward Irradiance (kWh/m²/day)
    #[serde(rename = "ALLSKY_SFC_SW_DWN", default)]
    radiation: BTreeMap<String, f64>,
    /// Temperature at 2 Meters (°C)
    #[serde(rename = "T2M", default)]
    temperature: BTreeMap<String, f64>,
    /// Cloud Amount (%)
    #[serde(rename = "CLOUD_AMT", default)]
    cloud_amount: BTreeMap<String, f64>,
}

// ─── History fetcher ─────────────────────────────────────────────────────────

/// Client for the NASA POWER daily-point archive.
#[derive(Clone)]
pub struct SolarHistory {
    client: Client,
    base_url: String,
}

impl SolarHistory {
    pub fn new(base_url: &str) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("helios-ai/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Fetches the daily irradiance series for the inclusive range, already
    /// sentinel-normalized and date-ascending. Zero samples is an error here,
    /// at the acquisition boundary — the estimator is never invoked on an
    /// empty series.
    pub async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        range: DateRange,
    ) -> Result<Vec<DailySample>, AnalysisError> {
        let (start, end) = range.wire();
        let url = format!("{}/api/temporal/daily/point", self.base_url);
        let latitude_param = latitude.to_string();
        let longitude_param = longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("parameters", "ALLSKY_SFC_SW_DWN,T2M,CLOUD_AMT"),
                ("community", "RE"),
                ("longitude", longitude_param.as_str()),
                ("latitude", latitude_param.as_str()),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("format", "JSON"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Upstream(format!(
                "POWER archive answered {}",
                status
            )));
        }

        let decoded: PowerResponse = response.json().await?;
        let samples = build_series(decoded.properties.parameter)?;
        println!(
            "[NASA] {} daily samples for ({:.4}, {:.4}) {}..{}",
            samples.len(),
            latitude,
            longitude,
            start,
            end
        );
        Ok(samples)
    }
}

fn normalize(value: f64) -> f64 {
    if value == MISSING_SENTINEL { 0.0 } else { value }
}

/// Joins the per-parameter maps on their date keys into one ascending series.
/// Radiation is the driving parameter: days the archive did not report at
/// all are absent, days it reported as missing carry the sentinel and
/// normalize to zero.
fn build_series(parameters: PowerParameters) -> Result<Vec<DailySample>, AnalysisError> {
    if parameters.radiation.is_empty() {
        return Err(AnalysisError::EmptyHistoryData);
    }

    let mut samples = Vec::with_capacity(parameters.radiation.len());
    for (key, radiation) in &parameters.radiation {
        let date = parse_date_key(key).map_err(|_| {
            AnalysisError::Upstream(format!("archive returned malformed date key {:?}", key))
        })?;
        let temperature = parameters.temperature.get(key).copied().unwrap_or(MISSING_SENTINEL);
        let cloud = parameters.cloud_amount.get(key).copied().unwrap_or(MISSING_SENTINEL);
        samples.push(DailySample {
            date,
            radiation: normalize(*radiation),
            temperature_c: normalize(temperature),
            cloud_cover_percent: normalize(cloud),
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters(entries: &[(&str, f64)]) -> PowerParameters {
        PowerParameters {
            radiation: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            temperature: entries.iter().map(|(k, _)| (k.to_string(), 15.0)).collect(),
            cloud_amount: entries.iter().map(|(k, _)| (k.to_string(), 50.0)).collect(),
        }
    }

    #[test]
    fn parses_wire_dates_strictly() {
        assert!(parse_date_key("20240229").is_ok());
        assert!(parse_date_key("20230229").is_err()); // not a leap year
        assert!(parse_date_key("2024-01-01").is_err());
        assert!(parse_date_key("202401").is_err());
        assert!(parse_date_key("2024010a").is_err());
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(DateRange::parse("20240110", "20240101").is_err());
        let range = DateRange::parse("20240101", "20240101").unwrap();
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn default_range_spans_the_requested_days() {
        let range = DateRange::last_days(30);
        assert_eq!(range.end - range.start, chrono::TimeDelta::days(30));
    }

    #[test]
    fn series_is_ascending_regardless_of_response_order() {
        // Insertion order scrambled on purpose; BTreeMap ingestion sorts it.
        let built = build_series(parameters(&[
            ("20240103", 4.0),
            ("20240101", 2.0),
            ("20240102", 3.0),
        ]))
        .unwrap();
        let dates: Vec<String> = built.iter().map(|s| s.date.to_string()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn sentinel_days_normalize_to_zero() {
        let built = build_series(parameters(&[
            ("20240101", 5.5),
            ("20240102", MISSING_SENTINEL),
        ]))
        .unwrap();
        assert_eq!(built[0].radiation, 5.5);
        assert_eq!(built[1].radiation, 0.0);
    }

    #[test]
    fn sentinel_and_zero_series_are_equivalent() {
        let with_sentinel = build_series(parameters(&[
            ("20240101", 3.0),
            ("20240102", MISSING_SENTINEL),
            ("20240103", 6.0),
        ]))
        .unwrap();
        let with_zero = build_series(parameters(&[
            ("20240101", 3.0),
            ("20240102", 0.0),
            ("20240103", 6.0),
        ]))
        .unwrap();
        let a: Vec<f64> = with_sentinel.iter().map(|s| s.radiation).collect();
        let b: Vec<f64> = with_zero.iter().map(|s| s.radiation).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_archive_answer_is_an_error() {
        let err = build_series(parameters(&[])).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyHistoryData));
    }

    #[test]
    fn missing_aux_parameters_count_as_missing_observations() {
        let built = build_series(PowerParameters {
            radiation: [("20240101".to_string(), 4.5)].into_iter().collect(),
            temperature: BTreeMap::new(),
            cloud_amount: BTreeMap::new(),
        })
        .unwrap();
        assert_eq!(built[0].temperature_c, 0.0);
        assert_eq!(built[0].cloud_cover_percent, 0.0);
    }
}
