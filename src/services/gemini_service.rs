use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::errors::AnalysisError;
use crate::models::analysis::{AnalysisResult, ChatTurn};

const FLASH_MODEL: &str = "gemini-2.5-flash";
const DEEP_MODEL: &str = "gemini-3-pro-preview";
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEEP_THINKING_BUDGET: u32 = 32768;
const TTS_VOICE: &str = "Kore";

/// TTS input is capped for responsiveness; reports can run long.
const SPEECH_CHAR_LIMIT: usize = 500;

// ─── Report variants ─────────────────────────────────────────────────────────

/// The three report flavours the consultant panel offers. A closed set:
/// each variant owns its model choice and request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Concise feasibility overview.
    Basic,
    /// Engineering deep-dive on a thinking model.
    Deep,
    /// Nearby installer search via Maps grounding.
    Installers,
}

impl ReportKind {
    fn model(&self) -> &'static str {
        match self {
            ReportKind::Deep => DEEP_MODEL,
            ReportKind::Basic | ReportKind::Installers => FLASH_MODEL,
        }
    }

    fn request_body(&self, analysis: &AnalysisResult) -> Value {
        let location = &analysis.location;
        match self {
            ReportKind::Basic => {
                let prompt = format!(
                    "Act as a senior Solar Energy Consultant. Analyze the following solar data \
                     for a location at Lat: {}, Lon: {}.\n\n\
                     Data Summary:\n\
                     - Average Daily Solar Radiation: {:.2} kWh/m²/day\n\
                     - Average Temperature: {:.1}°C\n\
                     - Average Cloud Cover: {:.1}%\n\
                     - User Required Energy: {} kWh/day\n\
                     - Estimated Panels Required: {}\n\
                     - Optimal Tilt: {:.2} degrees\n\n\
                     Please provide a concise but professional report covering:\n\
                     1. **Feasibility Assessment**: Is this location viable considering radiation AND weather (cloud/temp)?\n\
                     2. **Optimization Strategy**: How should they position panels?\n\
                     3. **Environmental Factors**: How might the temperature ({:.1}°C) affect panel efficiency? \
                     (Note: standard panels lose efficiency in high heat).\n\n\
                     Format the output in clean Markdown.",
                    location.latitude,
                    location.longitude,
                    analysis.average_radiation,
                    analysis.average_temperature_c,
                    analysis.average_cloud_cover_percent,
                    analysis.requirement.daily_energy_need_kwh,
                    analysis.panels_required,
                    analysis.optimal_tilt_degrees,
                    analysis.average_temperature_c,
                );
                json!({ "contents": [{ "role": "user", "parts": [{ "text": prompt }] }] })
            }
            ReportKind::Deep => {
                let prompt = format!(
                    "Conduct a rigorous, deep-dive engineering analysis for a proposed solar \
                     installation at Lat: {}, Lon: {}.\n\n\
                     Technical Context:\n\
                     - Avg Radiation: {:.3} kWh/m²/day.\n\
                     - Avg Temperature: {:.1}°C.\n\
                     - Avg Cloud Cover: {:.1}%.\n\
                     - Optimal Tilt: {:.1}°.\n\n\
                     Task:\n\
                     Provide a detailed engineering breakdown including:\n\
                     1. **Temperature Coefficient Analysis**: Calculate theoretical efficiency loss \
                     based on avg temp vs standard test conditions (25°C).\n\
                     2. **Cloud Intermittency**: How the cloud cover percentage impacts inverter \
                     clipping and battery sizing.\n\
                     3. **System Recommendation**: Specific recommendations on panel type \
                     (e.g. Monocrystalline vs Polycrystalline) based on the heat and light conditions.\n\n\
                     Think step-by-step about the physics and meteorology involved.",
                    location.latitude,
                    location.longitude,
                    analysis.average_radiation,
                    analysis.average_temperature_c,
                    analysis.average_cloud_cover_percent,
                    analysis.optimal_tilt_degrees,
                );
                json!({
                    "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                    "generationConfig": {
                        "thinkingConfig": { "thinkingBudget": DEEP_THINKING_BUDGET }
                    }
                })
            }
            ReportKind::Installers => {
                json!({
                    "contents": [{ "role": "user", "parts": [{ "text": format!(
                        "Find the top rated solar panel installers and solar equipment \
                         suppliers near Lat: {}, Lon: {}.",
                        location.latitude, location.longitude
                    )}]}],
                    "tools": [{ "googleMaps": {} }],
                    "toolConfig": {
                        "googleMaps": { "capabilities": ["places"] }
                    }
                })
            }
        }
    }
}

// ─── Generate-content wire types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() { None } else { Some(text) }
    }

    fn first_audio(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .map(|d| d.data)
    }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Generative Language API client. Constructed once at startup and injected
/// into whatever needs it — never a process-wide singleton — so tests and
/// self-hosted deployments can substitute the endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { client, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, model: &str, body: Value) -> Result<GenerateContentResponse, AnalysisError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(AnalysisError::MissingApiKey);
        };
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            eprintln!("[GEMINI] {} answered {}", model, status);
            return Err(AnalysisError::Upstream(format!("model endpoint answered {}", status)));
        }
        Ok(response.json().await?)
    }

    /// Renders one of the consultant reports from the analysis numbers.
    pub async fn generate_report(
        &self,
        kind: ReportKind,
        analysis: &AnalysisResult,
    ) -> Result<String, AnalysisError> {
        let response = self.generate(kind.model(), kind.request_body(analysis)).await?;
        response
            .first_text()
            .ok_or_else(|| AnalysisError::Upstream("model returned no report text".to_string()))
    }

    /// Search-grounded Q&A over the analysis context.
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatTurn],
        analysis: &AnalysisResult,
    ) -> Result<String, AnalysisError> {
        let location = &analysis.location;
        let system_context = format!(
            "You are Helios, a helpful Solar Energy Assistant.\n\
             Context: user is at Lat {}, Lon {}.\n\
             Avg Radiation: {:.2}.\n\
             Avg Temp: {:.1}C.\n\
             Avg Cloud: {:.1}%.\n\
             Panels needed: {}.\n\
             Keep answers short, helpful, and scientific.",
            location.latitude,
            location.longitude,
            analysis.average_radiation,
            analysis.average_temperature_c,
            analysis.average_cloud_cover_percent,
            analysis.panels_required,
        );
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": format!(
                    "{}\n\nHistoric conversation:\n{}",
                    system_context,
                    serde_json::to_string(history)?
                )}]},
                { "role": "user", "parts": [{ "text": message }] }
            ],
            "tools": [{ "googleSearch": {} }]
        });
        let response = self.generate(FLASH_MODEL, body).await?;
        response
            .first_text()
            .ok_or_else(|| AnalysisError::Upstream("model returned no chat reply".to_string()))
    }

    /// Reads a report aloud. Returns base64 audio for a
    /// `data:audio/mp3;base64,...` source.
    pub async fn synthesize_speech(&self, text: &str) -> Result<String, AnalysisError> {
        let clipped: String = text.chars().take(SPEECH_CHAR_LIMIT).collect();
        let body = json!({
            "contents": [{ "parts": [{ "text": clipped }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": TTS_VOICE }
                    }
                }
            }
        });
        let response = self.generate(TTS_MODEL, body).await?;
        response
            .first_audio()
            .ok_or_else(|| AnalysisError::Upstream("model returned no audio".to_string()))
    }

    /// One conversational turn for the live voice session.
    pub async fn voice_reply(&self, text: &str) -> Result<String, AnalysisError> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text":
                "You are Helios, an expert solar energy consultant. Help the user with \
                 energy analysis. Be concise and professional." }] },
            "contents": [{ "role": "user", "parts": [{ "text": text }] }]
        });
        let response = self.generate(FLASH_MODEL, body).await?;
        response
            .first_text()
            .ok_or_else(|| AnalysisError::Upstream("model returned no voice reply".to_string()))
    }
}
