use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::AnalysisError;
use crate::models::analysis::{AssistantReply, ChatRequest, SpeechRequest, SpeechResponse};
use crate::services::gemini_service::{GeminiClient, ReportKind};
use crate::services::voice_service;
use crate::shared_state::SharedState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportRequest {
    pub kind: ReportKind,
}

/// POST /api/assistant/report
/// Generate a consultant report
///
/// Renders one of the report variants (overview, engineering deep-dive,
/// installer search) from the numbers of the current analysis.
#[utoipa::path(
    post,
    path = "/api/assistant/report",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Markdown report", body = AssistantReply),
        (status = 404, description = "No analysis has been run yet"),
        (status = 502, description = "Model endpoint unavailable"),
        (status = 503, description = "Assistant not configured")
    )
)]
pub async fn generate_report(
    State(shared): State<SharedState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<AssistantReply>, AnalysisError> {
    let analysis = shared.state.latest_analysis().ok_or(AnalysisError::NoAnalysis)?;
    let text = shared.gemini.generate_report(request.kind, &analysis).await?;
    Ok(Json(AssistantReply { text }))
}

/// POST /api/assistant/chat
/// Ask the solar expert
///
/// Search-grounded Q&A with the current analysis as conversation context.
/// The client carries the history; nothing is stored server-side.
#[utoipa::path(
    post,
    path = "/api/assistant/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = AssistantReply),
        (status = 404, description = "No analysis has been run yet"),
        (status = 502, description = "Model endpoint unavailable"),
        (status = 503, description = "Assistant not configured")
    )
)]
pub async fn chat(
    State(shared): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AssistantReply>, AnalysisError> {
    let analysis = shared.state.latest_analysis().ok_or(AnalysisError::NoAnalysis)?;
    let text = shared
        .gemini
        .chat(&request.message, &request.history, &analysis)
        .await?;
    Ok(Json(AssistantReply { text }))
}

/// POST /api/assistant/speech
/// Read text aloud
///
/// Synthesizes the given text (reports, replies) into base64 audio.
#[utoipa::path(
    post,
    path = "/api/assistant/speech",
    request_body = SpeechRequest,
    responses(
        (status = 200, description = "Base64 audio", body = SpeechResponse),
        (status = 502, description = "Model endpoint unavailable"),
        (status = 503, description = "Assistant not configured")
    )
)]
pub async fn synthesize_speech(
    State(gemini): State<GeminiClient>,
    Json(request): Json<SpeechRequest>,
) -> Result<Json<SpeechResponse>, AnalysisError> {
    let audio_base64 = gemini.synthesize_speech(&request.text).await?;
    Ok(Json(SpeechResponse { audio_base64 }))
}

/// GET /api/voice/live — WebSocket upgrade for the live voice session.
/// One session at a time; lifecycle is the socket's own, independent of
/// the analysis workflow.
pub async fn voice_live(ws: WebSocketUpgrade, State(shared): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| voice_service::run_session(socket, shared))
}
