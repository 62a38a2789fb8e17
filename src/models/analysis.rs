use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Resolved location ───────────────────────────────────────────────────────

/// A geocoded or map-picked installation site. Immutable once captured for
/// a given analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationData {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationData {
    /// Placeholder name used when the user picks a raw map point without
    /// searching for a city first.
    pub const UNNAMED: &'static str = "Selected Location";

    pub fn validate(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

// ─── Daily series ────────────────────────────────────────────────────────────

/// One day of archive observations for the site. `radiation` is mean daily
/// solar irradiance (kWh/m²/day); `temperature_c` and `cloud_cover_percent`
/// are co-observed context for the AI narration, not sizing inputs.
///
/// Values are sentinel-normalized at ingestion: a missing observation counts
/// as zero, it is never interpolated or dropped.
/// Dates serialize as `YYYY-MM-DD` for charting; computation never depends
/// on the string form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailySample {
    pub date: NaiveDate,
    pub radiation: f64,
    pub temperature_c: f64,
    pub cloud_cover_percent: f64,
}

// ─── User requirement ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRequirement {
    /// Target daily energy production, kWh. Must be positive.
    pub daily_energy_need_kwh: f64,
    /// Sun-tracking mount: modeled as a flat +25% yield multiplier, not a
    /// per-hour simulation.
    #[serde(default)]
    pub use_rotating_mount: bool,
}

// ─── Analysis result ─────────────────────────────────────────────────────────

/// The single durable output of an analysis run. Created once per
/// "Run Analysis", replaced on the next run, never persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResult {
    pub location: LocationData,
    pub requirement: UserRequirement,

    /// Aggregate irradiance statistics over the whole range, kWh/m²/day.
    /// Always `min <= average <= max`.
    pub average_radiation: f64,
    pub max_radiation: f64,
    pub min_radiation: f64,

    /// Informational means over the same range; feed AI prompts only and
    /// do not enter the sizing formula.
    pub average_temperature_c: f64,
    pub average_cloud_cover_percent: f64,

    /// Achievable daily output of the sized array, kWh. Capacity rounds up,
    /// so this is always >= the declared need.
    pub total_energy_potential_kwh: f64,
    pub panels_required: u32,

    /// Date-ascending daily series, as normalized at ingestion. Non-empty.
    pub daily_series: Vec<DailySample>,

    /// Fixed-tilt angle for an equator-facing panel, degrees from horizontal.
    /// Latitude-equals-tilt heuristic; ignores season, azimuth and horizon.
    pub optimal_tilt_degrees: f64,

    /// Best-effort enrichment; `None` when the weather service was
    /// unavailable at analysis time.
    pub current_weather: Option<CurrentWeather>,
}

// ─── Current weather ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub precipitation_mm: f64,
    pub cloud_cover_percent: f64,
    /// WMO weather interpretation code.
    pub condition_code: u16,
    pub condition_label: String,
    pub is_day: bool,
}

// ─── API request/response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeocodeRequest {
    /// Free-text place name, e.g. "San Francisco, CA".
    pub query: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Display name for the site; defaults to a placeholder for map picks.
    #[serde(default)]
    pub location_name: Option<String>,
    /// Inclusive range start, `YYYYMMDD`. Both dates default to the
    /// configured trailing window when omitted together.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive range end, `YYYYMMDD`.
    #[serde(default)]
    pub end_date: Option<String>,
    pub daily_energy_need_kwh: f64,
    #[serde(default)]
    pub use_rotating_mount: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// One prior conversation turn, `role` is `user` or `model`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssistantReply {
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SpeechRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpeechResponse {
    /// Base64-encoded audio payload, playable as `data:audio/mp3;base64,...`.
    pub audio_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_dates_serialize_in_display_form() {
        let sample = DailySample {
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            radiation: 4.2,
            temperature_c: 11.0,
            cloud_cover_percent: 40.0,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["date"], "2024-03-07");
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        let mut loc = LocationData {
            name: LocationData::UNNAMED.to_string(),
            latitude: 90.0,
            longitude: -180.0,
        };
        assert!(loc.validate());
        loc.latitude = 90.0001;
        assert!(!loc.validate());
    }
}
