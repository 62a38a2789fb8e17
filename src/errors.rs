use std::fmt;
use std::fmt::Formatter;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Failure conditions of the analysis workflow and its collaborators.
///
/// `EmptyHistoryData` and `InsufficientData` are deliberately separate:
/// the first means the upstream archive returned zero samples for the
/// requested range, the second means samples existed but were all
/// missing/zero (e.g. permanent polar night), so panel sizing is undefined.
#[derive(Debug)]
pub enum AnalysisError {
    /// Geocode query matched nothing. Recoverable: pick a point on the map.
    LocationNotFound,
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    InvalidCoordinates(f64, f64),
    /// Malformed YYYYMMDD date or start > end.
    InvalidDateRange(String),
    /// Daily energy need must be a positive, finite number of kWh.
    InvalidRequirement(String),
    /// The irradiance archive answered with zero samples for the range.
    EmptyHistoryData,
    /// Normalized average irradiance is zero or negative; sizing undefined.
    InsufficientData,
    /// An analysis is already in flight; the request is rejected, not queued.
    AnalysisBusy,
    /// No analysis has been run yet in this session.
    NoAnalysis,
    /// A live voice session is already active.
    VoiceSessionActive,
    /// No Gemini API key configured; assistant features are unavailable.
    MissingApiKey,
    /// Network/transport/decode failure from a collaborator.
    Upstream(String),
}

impl AnalysisError {
    /// Stable machine-readable code, also used by the frontend to branch.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::LocationNotFound => "LOCATION_NOT_FOUND",
            AnalysisError::InvalidCoordinates(..) => "INVALID_COORDINATES",
            AnalysisError::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            AnalysisError::InvalidRequirement(_) => "INVALID_REQUIREMENT",
            AnalysisError::EmptyHistoryData => "EMPTY_HISTORY_DATA",
            AnalysisError::InsufficientData => "INSUFFICIENT_DATA",
            AnalysisError::AnalysisBusy => "ANALYSIS_BUSY",
            AnalysisError::NoAnalysis => "NO_ANALYSIS",
            AnalysisError::VoiceSessionActive => "VOICE_SESSION_ACTIVE",
            AnalysisError::MissingApiKey => "MISSING_API_KEY",
            AnalysisError::Upstream(_) => "UPSTREAM_UNAVAILABLE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AnalysisError::LocationNotFound | AnalysisError::NoAnalysis => StatusCode::NOT_FOUND,
            AnalysisError::InvalidCoordinates(..)
            | AnalysisError::InvalidDateRange(_)
            | AnalysisError::InvalidRequirement(_)
            | AnalysisError::EmptyHistoryData
            | AnalysisError::InsufficientData => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::AnalysisBusy | AnalysisError::VoiceSessionActive => StatusCode::CONFLICT,
            AnalysisError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::LocationNotFound => {
                write!(f, "No location matched the query. Try a valid City, State, or pick a point on the map.")
            }
            AnalysisError::InvalidCoordinates(lat, lon) => {
                write!(f, "Coordinates out of range: lat={}, lon={}", lat, lon)
            }
            AnalysisError::InvalidDateRange(reason) => {
                write!(f, "Invalid date range: {}", reason)
            }
            AnalysisError::InvalidRequirement(reason) => {
                write!(f, "Invalid energy requirement: {}", reason)
            }
            AnalysisError::EmptyHistoryData => {
                write!(f, "Failed to fetch solar data for this date range.")
            }
            AnalysisError::InsufficientData => {
                write!(f, "Recorded irradiance is zero across the whole range; panel sizing is not possible for this location and period.")
            }
            AnalysisError::AnalysisBusy => {
                write!(f, "An analysis is already running. Wait for it to finish.")
            }
            AnalysisError::NoAnalysis => {
                write!(f, "No analysis available. Run an analysis first.")
            }
            AnalysisError::VoiceSessionActive => {
                write!(f, "A live voice session is already active.")
            }
            AnalysisError::MissingApiKey => {
                write!(f, "AI assistant is not configured (no API key).")
            }
            AnalysisError::Upstream(detail) => {
                write!(f, "Upstream service unavailable: {}", detail)
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Upstream(e.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Upstream(e.to_string())
    }
}

/// Collaborator errors never propagate as uncaught faults: every variant
/// renders as a JSON body with a stable code and a user-facing message.
impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_and_insufficient_data_stay_distinct() {
        assert_ne!(
            AnalysisError::EmptyHistoryData.code(),
            AnalysisError::InsufficientData.code()
        );
        assert_eq!(AnalysisError::EmptyHistoryData.code(), "EMPTY_HISTORY_DATA");
        assert_eq!(AnalysisError::InsufficientData.code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn busy_maps_to_conflict() {
        assert_eq!(AnalysisError::AnalysisBusy.status(), StatusCode::CONFLICT);
    }
}
