use axum::{routing::get, routing::post, Router};

use crate::controllers::analysis_controller::{
    // Location & site data
    geocode, current_weather,
    // Feasibility workflow
    run_analysis, get_analysis,
};
use crate::controllers::assistant_controller::{
    // AI consultant
    generate_report, chat, synthesize_speech,
    // Live voice
    voice_live,
};
use crate::shared_state::SharedState;

/// Build the `/api/*` sub-router.
/// Handlers extract the slice of `SharedState` they need via
/// `FromRef<SharedState>` — a single `.with_state(shared)` covers all.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/geocode",           post(geocode))
        .route("/analysis",          post(run_analysis).get(get_analysis))
        .route("/weather/current",   get(current_weather))
        .route("/assistant/report",  post(generate_report))
        .route("/assistant/chat",    post(chat))
        .route("/assistant/speech",  post(synthesize_speech))
        .route("/voice/live",        get(voice_live))
        .with_state(shared)
}
