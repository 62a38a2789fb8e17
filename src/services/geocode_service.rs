use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::errors::AnalysisError;
use crate::models::analysis::LocationData;

// ─── Nominatim wire types ────────────────────────────────────────────────────

/// One search hit. Nominatim serialises coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

// ─── Geocoder ────────────────────────────────────────────────────────────────

/// Free-text place lookup via the OpenStreetMap Nominatim search API.
/// The usage policy requires an identifying User-Agent.
#[derive(Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(base_url: &str) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("helios-ai/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Resolves a place name to its best match. `LocationNotFound` is
    /// recoverable: the UI falls back to a map pick, which re-enters the
    /// workflow as raw coordinates.
    pub async fn search(&self, query: &str) -> Result<LocationData, AnalysisError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Upstream(format!("geocoder answered {}", status)));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            println!("[GEOCODE] no match for {:?}", query);
            return Err(AnalysisError::LocationNotFound);
        };

        let latitude: f64 = place.lat.parse().map_err(|_| {
            AnalysisError::Upstream(format!("geocoder returned non-numeric lat {:?}", place.lat))
        })?;
        let longitude: f64 = place.lon.parse().map_err(|_| {
            AnalysisError::Upstream(format!("geocoder returned non-numeric lon {:?}", place.lon))
        })?;

        println!("[GEOCODE] {:?} -> ({:.5}, {:.5})", query, latitude, longitude);
        Ok(LocationData { name: place.display_name, latitude, longitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_coordinates_parse_from_strings() {
        let json = r#"[{"display_name": "San Francisco, California, USA",
                        "lat": "37.7792588", "lon": "-122.4193286"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(json).unwrap();
        assert_eq!(places.len(), 1);
        assert!((places[0].lat.parse::<f64>().unwrap() - 37.7792588).abs() < 1e-9);
        assert!((places[0].lon.parse::<f64>().unwrap() + 122.4193286).abs() < 1e-9);
    }

    #[test]
    fn empty_result_list_deserializes() {
        let places: Vec<NominatimPlace> = serde_json::from_str("[]").unwrap();
        assert!(places.is_empty());
    }
}
