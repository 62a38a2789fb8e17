use serde::Deserialize;

fn default_range_days() -> u32 { 30 }
fn default_power_base_url() -> String {
    "https://power.larc.nasa.gov".to_string()
}
fn default_nominatim_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}
fn default_open_meteo_base_url() -> String {
    "https://api.open-meteo.com".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Trailing history window applied when a request omits both dates,
    /// mirroring the UI default of [today - N days, today].
    #[serde(default = "default_range_days")]
    pub default_range_days: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { default_range_days: default_range_days() }
    }
}

/// Base URLs of the external collaborators. Overridable per deployment,
/// which is also how tests point the services at a stub server.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_power_base_url")]
    pub power_base_url: String,
    #[serde(default = "default_nominatim_base_url")]
    pub nominatim_base_url: String,
    #[serde(default = "default_open_meteo_base_url")]
    pub open_meteo_base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            power_base_url: default_power_base_url(),
            nominatim_base_url: default_nominatim_base_url(),
            open_meteo_base_url: default_open_meteo_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Falls back to the GEMINI_API_KEY environment variable when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: default_gemini_base_url() }
    }
}

impl GeminiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = serde_json::from_str(r#"{ "server": { "port": 8080 } }"#).unwrap();
        assert_eq!(config.analysis.default_range_days, 30);
        assert_eq!(config.upstream.power_base_url, "https://power.larc.nasa.gov");
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": { "port": 9000 },
                "analysis": { "default_range_days": 90 },
                "upstream": { "power_base_url": "http://localhost:1234" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.analysis.default_range_days, 90);
        assert_eq!(config.upstream.power_base_url, "http://localhost:1234");
        assert_eq!(config.upstream.nominatim_base_url, "https://nominatim.openstreetmap.org");
    }
}
