use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::AnalysisError;
use crate::models::analysis::{
    AnalysisRequest, AnalysisResult, CurrentWeather, GeocodeRequest, LocationData,
    UserRequirement,
};
use crate::services::estimator;
use crate::services::geocode_service::Geocoder;
use crate::services::solar_service::DateRange;
use crate::services::weather_service::WeatherService;
use crate::shared_state::{AppState, SharedState};

/// POST /api/geocode
/// Resolve a free-text place name
///
/// Returns the best match for the query. A miss is recoverable: the client
/// falls back to picking a point on the map.
#[utoipa::path(
    post,
    path = "/api/geocode",
    request_body = GeocodeRequest,
    responses(
        (status = 200, description = "Best matching location", body = LocationData),
        (status = 404, description = "No location matched the query"),
        (status = 502, description = "Geocoding service unavailable")
    )
)]
pub async fn geocode(
    State(geocoder): State<Geocoder>,
    Json(request): Json<GeocodeRequest>,
) -> Result<Json<LocationData>, AnalysisError> {
    let location = geocoder.search(&request.query).await?;
    Ok(Json(location))
}

/// POST /api/analysis
/// Run a feasibility analysis
///
/// Fetches the irradiance history for the requested range, sizes a panel
/// array against the declared daily energy need, and stores the result as
/// the session's current analysis. Only one analysis runs at a time; a
/// request arriving while one is in flight is rejected with 409.
#[utoipa::path(
    post,
    path = "/api/analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Feasibility analysis for the site", body = AnalysisResult),
        (status = 409, description = "An analysis is already in flight"),
        (status = 422, description = "Invalid input, empty history, or insufficient irradiance"),
        (status = 502, description = "Irradiance archive unavailable")
    )
)]
pub async fn run_analysis(
    State(shared): State<SharedState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    if !shared.state.try_begin_analysis() {
        return Err(AnalysisError::AnalysisBusy);
    }
    let outcome = perform_analysis(&shared, request).await;
    if let Ok(result) = &outcome {
        println!(
            "[ANALYSIS] {} | avg {:.2} kWh/m²/day | {} panels | {:.1} kWh/day",
            result.location.name,
            result.average_radiation,
            result.panels_required,
            result.total_energy_potential_kwh
        );
        shared.state.store_analysis(result.clone());
    }
    shared.state.finish_analysis();
    outcome.map(Json)
}

async fn perform_analysis(
    shared: &SharedState,
    request: AnalysisRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let location = LocationData {
        name: request
            .location_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| LocationData::UNNAMED.to_string()),
        latitude: request.latitude,
        longitude: request.longitude,
    };
    if !location.validate() {
        return Err(AnalysisError::InvalidCoordinates(location.latitude, location.longitude));
    }

    let range = match (request.start_date.as_deref(), request.end_date.as_deref()) {
        (Some(start), Some(end)) => DateRange::parse(start, end)?,
        (None, None) => DateRange::last_days(shared.config.analysis.default_range_days),
        _ => {
            return Err(AnalysisError::InvalidDateRange(
                "provide both start and end dates, or neither".to_string(),
            ));
        }
    };

    let series = shared
        .solar
        .fetch_daily(location.latitude, location.longitude, range)
        .await?;

    let requirement = UserRequirement {
        daily_energy_need_kwh: request.daily_energy_need_kwh,
        use_rotating_mount: request.use_rotating_mount,
    };
    let mut result = estimator::estimate(&series, &requirement, &location)?;

    // Enrichment only: a weather outage never fails the analysis.
    match shared.weather.current(location.latitude, location.longitude).await {
        Ok(weather) => result.current_weather = Some(weather),
        Err(e) => eprintln!("[WEATHER] enrichment skipped: {}", e),
    }

    Ok(result)
}

/// GET /api/analysis
/// Get the current analysis
///
/// Returns the result of the most recent run. Results live for the session
/// only and are replaced by the next run.
#[utoipa::path(
    get,
    path = "/api/analysis",
    responses(
        (status = 200, description = "Most recent analysis result", body = AnalysisResult),
        (status = 404, description = "No analysis has been run yet")
    )
)]
pub async fn get_analysis(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    state.latest_analysis().map(Json).ok_or(AnalysisError::NoAnalysis)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
}

/// GET /api/weather/current
/// Get live conditions for a site
///
/// Optional enrichment for the results view; independent of any stored
/// analysis.
#[utoipa::path(
    get,
    path = "/api/weather/current",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Current conditions", body = CurrentWeather),
        (status = 502, description = "Weather service unavailable")
    )
)]
pub async fn current_weather(
    State(weather): State<WeatherService>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<CurrentWeather>, AnalysisError> {
    let conditions = weather.current(query.latitude, query.longitude).await?;
    Ok(Json(conditions))
}
