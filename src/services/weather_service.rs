use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::errors::AnalysisError;
use crate::models::analysis::CurrentWeather;

// ─── Open-Meteo wire types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    current: Option<CurrentData>,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    temperature_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    precipitation: Option<f64>,
    cloud_cover: Option<f64>,
    weather_code: Option<u16>,
    is_day: Option<u8>,
}

// ─── Current conditions fetcher ──────────────────────────────────────────────

/// Live conditions from Open-Meteo. Optional enrichment for the results
/// view and the AI prompts; the sizing calculation never depends on it.
#[derive(Clone)]
pub struct WeatherService {
    client: Client,
    base_url: String,
}

impl WeatherService {
    pub fn new(base_url: &str) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather, AnalysisError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,precipitation,rain,showers,snowfall,weather_code,cloud_cover,wind_speed_10m,is_day&timezone=auto",
            self.base_url, latitude, longitude
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Upstream(format!("weather service answered {}", status)));
        }

        let decoded: CurrentWeatherResponse = response.json().await?;
        let Some(current) = decoded.current else {
            return Err(AnalysisError::Upstream("weather response had no current block".to_string()));
        };

        let condition_code = current.weather_code.unwrap_or(0);
        Ok(CurrentWeather {
            temperature_c: current.temperature_2m.unwrap_or(0.0),
            wind_speed_kmh: current.wind_speed_10m.unwrap_or(0.0),
            precipitation_mm: current.precipitation.unwrap_or(0.0),
            cloud_cover_percent: current.cloud_cover.unwrap_or(0.0),
            condition_code,
            condition_label: describe_weather_code(condition_code).to_string(),
            is_day: current.is_day.unwrap_or(1) == 1,
        })
    }
}

/// WMO weather interpretation codes (WW) as used by Open-Meteo.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 | 53 | 55 => "Drizzle",
        61 | 63 | 65 => "Rain",
        71 | 73 | 75 => "Snow",
        95 | 96 | 99 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_current_block() {
        let json = r#"{
            "current": {
                "time": "2025-12-28T10:40",
                "temperature_2m": 8.3,
                "wind_speed_10m": 14.2,
                "precipitation": 0.0,
                "cloud_cover": 75.0,
                "weather_code": 3,
                "is_day": 1
            }
        }"#;
        let decoded: CurrentWeatherResponse = serde_json::from_str(json).unwrap();
        let current = decoded.current.unwrap();
        assert_eq!(current.weather_code, Some(3));
        assert_eq!(current.cloud_cover, Some(75.0));
    }

    #[test]
    fn missing_current_block_decodes_to_none() {
        let decoded: CurrentWeatherResponse = serde_json::from_str("{}").unwrap();
        assert!(decoded.current.is_none());
    }

    #[test]
    fn weather_codes_map_to_labels() {
        assert_eq!(describe_weather_code(0), "Clear Sky");
        assert_eq!(describe_weather_code(48), "Foggy");
        assert_eq!(describe_weather_code(63), "Rain");
        assert_eq!(describe_weather_code(75), "Snow");
        assert_eq!(describe_weather_code(99), "Thunderstorm");
        assert_eq!(describe_weather_code(42), "Unknown");
    }
}
