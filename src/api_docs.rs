use utoipa::OpenApi;

use crate::controllers::{analysis_controller, assistant_controller};
use crate::models::analysis;
use crate::services::gemini_service;

#[derive(OpenApi)]
#[openapi(
    paths(
        analysis_controller::geocode,
        analysis_controller::run_analysis,
        analysis_controller::get_analysis,
        analysis_controller::current_weather,
        assistant_controller::generate_report,
        assistant_controller::chat,
        assistant_controller::synthesize_speech
    ),
    components(
        schemas(
            analysis::LocationData,
            analysis::DailySample,
            analysis::UserRequirement,
            analysis::AnalysisResult,
            analysis::CurrentWeather,
            analysis::GeocodeRequest,
            analysis::AnalysisRequest,
            analysis::ChatRequest,
            analysis::ChatTurn,
            analysis::AssistantReply,
            analysis::SpeechRequest,
            analysis::SpeechResponse,
            gemini_service::ReportKind,
            assistant_controller::ReportRequest
        )
    ),
    tags(
        (name = "helios-ai", description = "Solar Feasibility & AI Consultant API")
    )
)]
pub struct ApiDoc;
