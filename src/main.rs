mod api_docs;
mod config;
mod controllers;
mod errors;
mod models;
mod routes;
mod services;
mod shared_state;

use std::net::SocketAddr;

use axum::{response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::errors::AnalysisError;
use crate::routes::api_routes::api_routes;
use crate::services::gemini_service::GeminiClient;
use crate::services::geocode_service::Geocoder;
use crate::services::solar_service::SolarHistory;
use crate::services::weather_service::WeatherService;
use crate::shared_state::{AppState, SharedState};

fn build_shared(config: Config) -> Result<SharedState, AnalysisError> {
    let api_key = config.gemini.resolve_api_key();
    Ok(SharedState {
        state: AppState::new(),
        geocoder: Geocoder::new(&config.upstream.nominatim_base_url)?,
        solar: SolarHistory::new(&config.upstream.power_base_url)?,
        weather: WeatherService::new(&config.upstream.open_meteo_base_url)?,
        gemini: GeminiClient::new(api_key, &config.gemini.base_url)?,
        config,
    })
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = match Config::load("config.json") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config.json: {}", e);
            return;
        }
    };
    println!(
        "[CONFIG] default history window: last {} days",
        config.analysis.default_range_days
    );

    // 2. Build clients and shared state
    let server_port = config.server.port;
    let shared = match build_shared(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize HTTP clients: {}", e);
            return;
        }
    };
    if !shared.gemini.is_configured() {
        eprintln!("[GEMINI] no API key configured — assistant endpoints will answer 503");
    }

    // 3. Assemble the router: JSON API, interactive docs, static frontend
    let app = Router::new()
        .nest("/api", api_routes(shared))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    println!("[HTTP] API server listening on http://{}", addr);
    println!("[HTTP] Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        eprintln!("[HTTP] server error: {}", e);
    }
}
