use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use axum::extract::FromRef;

use crate::config::Config;
use crate::models::analysis::AnalysisResult;
use crate::services::gemini_service::GeminiClient;
use crate::services::geocode_service::Geocoder;
use crate::services::solar_service::SolarHistory;
use crate::services::weather_service::WeatherService;

/// Mutable session state. One analysis in flight at a time, guarded by a
/// busy flag rather than a queue; the latest result is held until the next
/// run replaces it, and nothing is persisted across restarts.
#[derive(Clone, Debug)]
pub struct AppState {
    analysis: Arc<RwLock<Option<AnalysisResult>>>,
    analysis_busy: Arc<AtomicBool>,
    voice_active: Arc<AtomicBool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            analysis: Arc::new(RwLock::new(None)),
            analysis_busy: Arc::new(AtomicBool::new(false)),
            voice_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claims the single analysis slot. A second "Run Analysis" while one is
    /// in flight gets `false` and is rejected, never queued or raced.
    pub fn try_begin_analysis(&self) -> bool {
        self.analysis_busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn finish_analysis(&self) {
        self.analysis_busy.store(false, Ordering::Release);
    }

    pub fn store_analysis(&self, result: AnalysisResult) {
        if let Ok(mut slot) = self.analysis.write() {
            *slot = Some(result);
        }
    }

    pub fn latest_analysis(&self) -> Option<AnalysisResult> {
        self.analysis.read().ok().and_then(|slot| slot.clone())
    }

    /// Claims the single live-voice slot; sessions are started and stopped
    /// by explicit user action, one at a time.
    pub fn try_begin_voice(&self) -> bool {
        self.voice_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_voice(&self) {
        self.voice_active.store(false, Ordering::Release);
    }
}

/// Everything the handlers need, injected once at startup. Handlers extract
/// the slice they want via `FromRef<SharedState>` — a single `.with_state`
/// covers all of them.
#[derive(Clone)]
pub struct SharedState {
    pub state: AppState,
    pub config: Config,
    pub geocoder: Geocoder,
    pub solar: SolarHistory,
    pub weather: WeatherService,
    pub gemini: GeminiClient,
}

impl FromRef<SharedState> for AppState {
    fn from_ref(shared: &SharedState) -> Self {
        shared.state.clone()
    }
}

impl FromRef<SharedState> for Geocoder {
    fn from_ref(shared: &SharedState) -> Self {
        shared.geocoder.clone()
    }
}

impl FromRef<SharedState> for WeatherService {
    fn from_ref(shared: &SharedState) -> Self {
        shared.weather.clone()
    }
}

impl FromRef<SharedState> for GeminiClient {
    fn from_ref(shared: &SharedState) -> Self {
        shared.gemini.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{LocationData, UserRequirement};

    fn dummy_result() -> AnalysisResult {
        AnalysisResult {
            location: LocationData {
                name: "Somewhere".to_string(),
                latitude: 10.0,
                longitude: 20.0,
            },
            requirement: UserRequirement { daily_energy_need_kwh: 5.0, use_rotating_mount: false },
            average_radiation: 5.0,
            max_radiation: 5.0,
            min_radiation: 5.0,
            average_temperature_c: 20.0,
            average_cloud_cover_percent: 10.0,
            total_energy_potential_kwh: 6.4,
            panels_required: 4,
            daily_series: Vec::new(),
            optimal_tilt_degrees: 10.0,
            current_weather: None,
        }
    }

    #[test]
    fn analysis_slot_is_single_flight() {
        let state = AppState::new();
        assert!(state.try_begin_analysis());
        assert!(!state.try_begin_analysis());
        state.finish_analysis();
        assert!(state.try_begin_analysis());
    }

    #[test]
    fn latest_analysis_is_replaced_not_accumulated() {
        let state = AppState::new();
        assert!(state.latest_analysis().is_none());

        state.store_analysis(dummy_result());
        let mut second = dummy_result();
        second.panels_required = 9;
        state.store_analysis(second);

        assert_eq!(state.latest_analysis().unwrap().panels_required, 9);
    }

    #[test]
    fn voice_slot_is_exclusive() {
        let state = AppState::new();
        assert!(state.try_begin_voice());
        assert!(!state.try_begin_voice());
        state.end_voice();
        assert!(state.try_begin_voice());
    }
}
